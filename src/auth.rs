//! JWT sessions carrying identity, role, and branch.
//!
//! This module creates and verifies the tokens the platform issues after
//! login and resolves them into a [`Session`]: the `{id, role, branch}`
//! record every route handler consults before touching the policy engine.
//! Password handling is NOT included - that's the identity provider's job.

use hyper::http::HeaderMap;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::config::Auth as AuthConfig;
use crate::error::{Error, Result};
use crate::permission::Policy;
use crate::role::Role;
use crate::scope::Caller;

const MIN_SECRET_LENGTH: usize = 32;

fn validate_secret(config: &AuthConfig) -> Result<()> {
    if config.jwt_secret.len() < MIN_SECRET_LENGTH {
        return Err(Error::Config(format!(
            "JWT secret must be at least {MIN_SECRET_LENGTH} bytes"
        )));
    }
    Ok(())
}

/// JWT claims structure.
///
/// `role` deserializes through the total role parser, so a token minted
/// under a since-removed role label still verifies; it resolves to
/// `Role::Unknown` and gets the most restrictive treatment downstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// The user's role at token-issue time
    pub role: Role,
    /// The user's branch, if assigned
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_id: Option<String>,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
}

/// An authenticated caller, resolved from a verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
    pub role: Role,
    pub branch_id: Option<String>,
}

impl Session {
    /// The identity attributes the scope rules need.
    pub fn caller(&self) -> Caller<'_> {
        Caller {
            id: &self.user_id,
            role: self.role,
            branch_id: self.branch_id.as_deref(),
        }
    }

    /// Require a permission, mapping a missing grant to `Forbidden`.
    pub fn require(&self, policy: &Policy, permission: &str) -> Result<()> {
        if policy.has_permission(self.role, permission) {
            Ok(())
        } else {
            Err(Error::forbidden(permission))
        }
    }
}

impl From<Claims> for Session {
    fn from(claims: Claims) -> Self {
        Session {
            user_id: claims.sub,
            role: claims.role,
            branch_id: claims.branch_id,
        }
    }
}

/// Create a JWT token for a user.
///
/// # Arguments
/// * `config` - Auth configuration with JWT secret and expiry settings
/// * `user_id` - The user ID to encode in the token's `sub` claim
/// * `role` - The user's role at issue time
/// * `branch_id` - The user's branch, if assigned
pub fn create_token(
    config: &AuthConfig,
    user_id: &str,
    role: Role,
    branch_id: Option<&str>,
) -> Result<String> {
    validate_secret(config)?;
    let now = jiff::Timestamp::now();
    let hours = config.token_expiry_days as i64 * 24;
    let exp = now + jiff::Span::new().hours(hours);

    let claims = Claims {
        sub: user_id.to_string(),
        role,
        branch_id: branch_id.map(|b| b.to_string()),
        exp: exp.as_second(),
        iat: now.as_second(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| Error::Internal(format!("Token creation failed: {e}")))?;

    Ok(token)
}

/// Verify and decode a JWT token.
///
/// # Returns
/// - `Ok(Claims)` if the token is valid
/// - `Err(Error::TokenExpired)` if the token has expired
/// - `Err(Error::Unauthorized)` for any other validation failure
pub fn verify_token(config: &AuthConfig, token: &str) -> Result<Claims> {
    validate_secret(config)?;
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => Error::TokenExpired,
        _ => Error::Unauthorized,
    })?;

    Ok(token_data.claims)
}

/// Resolve the session from the Authorization header.
///
/// Expects a Bearer token in the format: `Authorization: Bearer <token>`.
/// The auth-scheme is matched case-insensitively per RFC 7235.
///
/// # Returns
/// - `Ok(Session)` if the token is valid
/// - `Err(Error::Unauthorized)` if the header is missing or token is invalid
pub fn authenticate(headers: &HeaderMap, config: &AuthConfig) -> Result<Session> {
    let auth_header = headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or(Error::Unauthorized)?;

    let token = auth_header
        .get(..7)
        .filter(|p| p.eq_ignore_ascii_case("bearer "))
        .map(|_| &auth_header[7..])
        .ok_or(Error::Unauthorized)?;

    let claims = verify_token(config, token)?;

    Ok(Session::from(claims))
}
