//! Training-session module.
//!
//! Read access to recorded practice calls. A trainee sees only their own
//! sessions, a manager their branch's, an admin everything, all through
//! the same scope filter the query layer ANDs onto each statement.

use serde::Serialize;
use tracing::info;

use crate::module::Module;
use crate::permission::keys;
use crate::response::{self, HttpResponse};
use crate::router::{Context, Router};
use crate::{Error, Result, db};

/// Training sessions API module.
pub struct TrainingSessions;

impl Module for TrainingSessions {
    fn name(&self) -> &'static str {
        "training"
    }

    fn routes(&self, router: &mut Router) {
        router.get("/api/v1/sessions", list_sessions);
        router.get("/api/v1/sessions/{id}", get_session);
        router.delete("/api/v1/sessions/{id}", delete_session);
    }
}

#[derive(Debug, Serialize)]
struct SessionRecord {
    id: String,
    user_id: String,
    scenario: String,
    score: Option<f64>,
    created_at: String,
}

fn session_from_row(row: &libsql::Row) -> Result<SessionRecord> {
    Ok(SessionRecord {
        id: row.get::<String>(0)?,
        user_id: row.get::<String>(1)?,
        scenario: row.get::<String>(2)?,
        score: db::real_or_null(row, 3)?,
        created_at: row.get::<String>(4)?,
    })
}

const SESSION_COLUMNS: &str = "id, user_id, scenario, score, created_at";

/// List sessions visible under the caller's scope, newest first.
async fn list_sessions(ctx: Context) -> Result<HttpResponse> {
    let session = ctx.require_permission(keys::SESSIONS_VIEW)?;
    let filter = ctx.scope_filter(&session, "training_sessions");

    let conn = db::connection(ctx.require_db()?)?;
    let (sql, params) = db::apply_scope(
        &format!("SELECT {SESSION_COLUMNS} FROM training_sessions"),
        &filter,
    );
    let sql = format!("{sql} ORDER BY created_at DESC");

    let mut rows = conn.query(&sql, libsql::params_from_iter(params)).await?;
    let mut sessions = Vec::new();
    while let Some(row) = rows.next().await? {
        sessions.push(session_from_row(&row)?);
    }

    response::ok(&sessions)
}

/// Fetch a single session. The scope filter rides along, so an
/// out-of-scope id reads as not found rather than forbidden.
async fn get_session(ctx: Context) -> Result<HttpResponse> {
    let session = ctx.require_permission(keys::SESSIONS_VIEW)?;
    let id = ctx.require_param("id")?;
    let filter = ctx.scope_filter(&session, "training_sessions");

    let conn = db::connection(ctx.require_db()?)?;
    let (sql, scope_params) = db::apply_scope(
        &format!("SELECT {SESSION_COLUMNS} FROM training_sessions WHERE id = ?"),
        &filter,
    );
    let mut params = vec![libsql::Value::Text(id.to_string())];
    params.extend(scope_params);

    let mut rows = conn.query(&sql, libsql::params_from_iter(params)).await?;
    match rows.next().await? {
        Some(row) => response::ok(&session_from_row(&row)?),
        None => Err(Error::NotFound(format!("No session with id {id}"))),
    }
}

/// Delete a session. Requires `sessions:delete`; the scope filter still
/// applies, so even a privileged-but-scoped caller cannot reach outside
/// their rows.
async fn delete_session(ctx: Context) -> Result<HttpResponse> {
    let session = ctx.require_permission(keys::SESSIONS_DELETE)?;
    let id = ctx.require_param("id")?;
    let filter = ctx.scope_filter(&session, "training_sessions");

    let conn = db::connection(ctx.require_db()?)?;
    let (sql, scope_params) =
        db::apply_scope("DELETE FROM training_sessions WHERE id = ?", &filter);
    let mut params = vec![libsql::Value::Text(id.to_string())];
    params.extend(scope_params);

    let affected = conn
        .execute(&sql, libsql::params_from_iter(params))
        .await?;
    if affected == 0 {
        return Err(Error::NotFound(format!("No session with id {id}")));
    }

    info!(actor = %session.user_id, session_id = %id, "Session deleted");
    Ok(response::no_content())
}
