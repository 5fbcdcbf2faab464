//! Database connection abstraction and scope-filter application.
//!
//! Supports multiple backends:
//! - Local SQLite file: `path/to/db.sqlite` or `file:path` or `sqlite://path`
//! - In-memory: `:memory:`
//! - Remote Turso: `libsql://...` or `https://...` (requires TURSO_AUTH_TOKEN env var)
//!
//! This module is also the single place a [`ScopeFilter`] crosses into SQL:
//! [`apply_scope`] renders the filter's column equalities as ANDed, bound
//! predicates. Handlers never interpolate scope values into statements.

use std::sync::Arc;

use libsql::{Builder, Connection, Database, Value};

use crate::scope::ScopeFilter;

/// Shared database handle.
pub type Handle = Arc<Database>;

/// Connect to the database.
///
/// # URL formats
/// - Local file: `mydata.db`, `file:path/to/db.sqlite`, `sqlite://path`
/// - In-memory: `:memory:`
/// - Remote Turso: `libsql://your-db.turso.io` (requires `TURSO_AUTH_TOKEN` env var)
pub async fn connect(url: &str) -> crate::Result<Database> {
    let db = if url.starts_with("libsql://") || url.starts_with("https://") {
        // Remote Turso database
        let token = std::env::var("TURSO_AUTH_TOKEN").map_err(|_| {
            crate::Error::Internal("TURSO_AUTH_TOKEN not set for remote database".into())
        })?;
        Builder::new_remote(url.to_string(), token).build().await?
    } else if url == ":memory:" {
        // In-memory database
        Builder::new_local(":memory:").build().await?
    } else {
        // Local file - strip sqlite:// or file: prefix if present
        let path = url
            .strip_prefix("sqlite://")
            .or_else(|| url.strip_prefix("file:"))
            .unwrap_or(url);
        Builder::new_local(path).build().await?
    };

    Ok(db)
}

/// Get a connection from the database.
pub fn connection(db: &Database) -> crate::Result<Connection> {
    Ok(db.connect()?)
}

/// AND a scope filter onto a SQL statement.
///
/// Appends one `column = ?` predicate per filter pair, continuing an
/// existing `WHERE` clause if `sql` already has one, and returns the
/// statement together with the bound parameter values in predicate order.
/// An unrestricted filter returns the statement untouched.
///
/// The caller supplies a complete base statement; trailing clauses such as
/// `ORDER BY` must be appended after this.
pub fn apply_scope(sql: &str, filter: &ScopeFilter) -> (String, Vec<Value>) {
    if filter.is_unrestricted() {
        return (sql.to_string(), Vec::new());
    }

    let mut out = sql.to_string();
    let mut params = Vec::with_capacity(filter.pairs().len());
    let mut has_where = sql.to_ascii_uppercase().contains(" WHERE ");

    for (column, value) in filter.pairs() {
        if has_where {
            out.push_str(" AND ");
        } else {
            out.push_str(" WHERE ");
            has_where = true;
        }
        out.push_str(column);
        out.push_str(" = ?");
        params.push(Value::Text(value.clone()));
    }

    (out, params)
}

/// Read a nullable text column.
pub fn text_or_null(row: &libsql::Row, idx: i32) -> crate::Result<Option<String>> {
    match row.get_value(idx)? {
        Value::Null => Ok(None),
        Value::Text(s) => Ok(Some(s)),
        other => Err(crate::Error::Internal(format!(
            "Expected text column at index {idx}, got {other:?}"
        ))),
    }
}

/// Read a nullable numeric column as f64.
pub fn real_or_null(row: &libsql::Row, idx: i32) -> crate::Result<Option<f64>> {
    match row.get_value(idx)? {
        Value::Null => Ok(None),
        Value::Real(f) => Ok(Some(f)),
        Value::Integer(i) => Ok(Some(i as f64)),
        other => Err(crate::Error::Internal(format!(
            "Expected numeric column at index {idx}, got {other:?}"
        ))),
    }
}

// Re-export commonly used libsql types for convenience
pub use libsql::{Connection as DbConnection, Database as Db, Row, params};
