//! User directory module.
//!
//! Routes for listing users, changing roles, and recording invites. Every
//! read goes through the caller's scope filter; role changes go through the
//! transition validator. Denials are logged with their reason for audit and
//! surfaced to the client as a uniform "authorization denied".

use libsql::params;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::module::Module;
use crate::permission::keys;
use crate::response::{self, HttpResponse};
use crate::role::Role;
use crate::router::{Context, Router};
use crate::transition::validate_role_transition;
use crate::{Error, Result, db};

/// User directory API module.
pub struct UserDirectory;

impl Module for UserDirectory {
    fn name(&self) -> &'static str {
        "users"
    }

    fn routes(&self, router: &mut Router) {
        router.get("/api/v1/users", list_users);
        router.get("/api/v1/users/{id}", get_user);
        router.put("/api/v1/users/{id}/role", change_role);
        router.get("/api/v1/roles/assignable", assignable_roles);
        router.post("/api/v1/users/invite", invite_user);
    }
}

#[derive(Debug, Serialize)]
struct UserRecord {
    id: String,
    email: String,
    name: String,
    role: Role,
    branch_id: Option<String>,
}

fn user_from_row(row: &libsql::Row) -> Result<UserRecord> {
    Ok(UserRecord {
        id: row.get::<String>(0)?,
        email: row.get::<String>(1)?,
        name: row.get::<String>(2)?,
        role: Role::from(row.get::<String>(3)?),
        branch_id: db::text_or_null(row, 4)?,
    })
}

/// List users visible under the caller's scope.
async fn list_users(ctx: Context) -> Result<HttpResponse> {
    let session = ctx.require_permission(keys::USERS_VIEW)?;
    let filter = ctx.scope_filter(&session, "users");

    let conn = db::connection(ctx.require_db()?)?;
    let (sql, params) = db::apply_scope("SELECT id, email, name, role, branch_id FROM users", &filter);
    let sql = format!("{sql} ORDER BY email");

    let mut rows = conn
        .query(&sql, libsql::params_from_iter(params))
        .await?;
    let mut users = Vec::new();
    while let Some(row) = rows.next().await? {
        users.push(user_from_row(&row)?);
    }

    response::ok(&users)
}

/// Fetch a single user. Self-lookups are always allowed; anything else
/// requires `users:view` and still passes through the scope filter, so an
/// out-of-scope id reads as not found.
async fn get_user(ctx: Context) -> Result<HttpResponse> {
    let session = ctx.require_session()?;
    let id = ctx.require_param("id")?;

    if id != session.user_id {
        session.require(&ctx.policy, keys::USERS_VIEW)?;
    }
    let filter = ctx.scope_filter(&session, "users");

    let conn = db::connection(ctx.require_db()?)?;
    let (sql, scope_params) = db::apply_scope(
        "SELECT id, email, name, role, branch_id FROM users WHERE id = ?",
        &filter,
    );
    let mut params = vec![libsql::Value::Text(id.to_string())];
    params.extend(scope_params);

    let mut rows = conn.query(&sql, libsql::params_from_iter(params)).await?;
    match rows.next().await? {
        Some(row) => response::ok(&user_from_row(&row)?),
        None => Err(Error::NotFound(format!("No user with id {id}"))),
    }
}

#[derive(Debug, Deserialize)]
struct ChangeRoleRequest {
    role: String,
}

/// Change a user's role, guarded by the transition validator.
async fn change_role(ctx: Context) -> Result<HttpResponse> {
    let session = ctx.require_session()?;
    let id = ctx.require_param("id")?;
    let req: ChangeRoleRequest = ctx.json()?;

    let new_role = Role::from(req.role.as_str());
    if new_role == Role::Unknown {
        return Err(Error::BadRequest(format!("Unknown role: {}", req.role)));
    }

    let conn = db::connection(ctx.require_db()?)?;
    let mut rows = conn
        .query("SELECT role FROM users WHERE id = ?", params![id])
        .await?;
    let row = rows
        .next()
        .await?
        .ok_or_else(|| Error::NotFound(format!("No user with id {id}")))?;
    let current = Role::from(row.get::<String>(0)?);

    let decision = validate_role_transition(&ctx.policy, session.role, current, new_role);
    if !decision.allowed {
        let reason = decision.reason.unwrap_or_default();
        warn!(
            actor = %session.user_id,
            target = %id,
            old = %current,
            new = %new_role,
            "Role change denied: {reason}"
        );
        return Ok(response::forbidden("Authorization denied"));
    }

    conn.execute(
        "UPDATE users SET role = ? WHERE id = ?",
        params![new_role.as_str(), id],
    )
    .await?;

    info!(actor = %session.user_id, target = %id, old = %current, new = %new_role, "Role changed");
    response::ok(&serde_json::json!({ "id": id, "role": new_role }))
}

/// Roles the caller may hand out, for the invite flow's role picker.
async fn assignable_roles(ctx: Context) -> Result<HttpResponse> {
    let session = ctx.require_session()?;
    let roles: Vec<&str> = session
        .role
        .assignable_roles()
        .into_iter()
        .map(Role::as_str)
        .collect();
    response::ok(&serde_json::json!({ "roles": roles }))
}

#[derive(Debug, Deserialize)]
struct InviteRequest {
    email: String,
    role: String,
    branch_id: Option<String>,
}

/// Record an invite. Delivery is the mail service's job; this endpoint only
/// persists the invite row with a role the caller is allowed to hand out.
async fn invite_user(ctx: Context) -> Result<HttpResponse> {
    let session = ctx.require_permission(keys::USERS_INVITE)?;
    let req: InviteRequest = ctx.json()?;

    let role = Role::from(req.role.as_str());
    if role == Role::Unknown {
        return Err(Error::BadRequest(format!("Unknown role: {}", req.role)));
    }
    if !session.role.assignable_roles().contains(&role) {
        warn!(
            actor = %session.user_id,
            invited_role = %role,
            "Invite denied: role not assignable by actor"
        );
        return Ok(response::forbidden("Authorization denied"));
    }

    let invite_id = Uuid::new_v4().to_string();
    let branch = req
        .branch_id
        .clone()
        .map(libsql::Value::Text)
        .unwrap_or(libsql::Value::Null);

    let conn = db::connection(ctx.require_db()?)?;
    conn.execute(
        "INSERT INTO invites (id, email, role, branch_id, invited_by) VALUES (?, ?, ?, ?, ?)",
        params![
            invite_id.as_str(),
            req.email.as_str(),
            role.as_str(),
            branch,
            session.user_id.as_str()
        ],
    )
    .await?;

    info!(actor = %session.user_id, invite = %invite_id, "Invite recorded");
    response::created(&serde_json::json!({
        "id": invite_id,
        "email": req.email,
        "role": role,
    }))
}
