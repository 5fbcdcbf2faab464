//! Session-layer tests: token forgery, algorithm confusion, and privilege
//! claims that are not backed by a valid signature.

use coachline::Role;
use coachline::auth;
use coachline::config::Auth as AuthConfig;

use super::{TEST_SECRET, request, start_test_server, token_for};

/// A token forged with `"alg":"none"` claiming super_admin must be
/// rejected; `Validation::default()` in jsonwebtoken 9.x restricts to
/// HS256.
#[tokio::test]
async fn rejects_none_algorithm_token() {
    use base64::Engine;
    let engine = base64::engine::general_purpose::URL_SAFE_NO_PAD;
    let header = engine.encode(r#"{"alg":"none","typ":"JWT"}"#);
    let payload = engine.encode(
        serde_json::json!({
            "sub": "U-evil",
            "role": "super_admin",
            "exp": 9999999999i64,
            "iat": 1700000000
        })
        .to_string(),
    );
    let forged = format!("{header}.{payload}.");

    let server = start_test_server().await;
    let (status, _) = request(server.addr(), "GET", "/api/v1/users", Some(&forged), None).await;
    server.shutdown().await.unwrap();

    assert_eq!(status, 401);
}

/// A syntactically valid token signed with the wrong secret gets 401 even
/// if it claims admin.
#[tokio::test]
async fn rejects_token_signed_with_wrong_secret() {
    let wrong = AuthConfig {
        jwt_secret: "different_secret_that_is_32bytes!".to_string(),
        token_expiry_days: 1,
    };
    let forged = auth::create_token(&wrong, "U-evil", Role::Admin, None).unwrap();

    let server = start_test_server().await;
    let (status, _) = request(server.addr(), "GET", "/api/v1/users", Some(&forged), None).await;
    server.shutdown().await.unwrap();

    assert_eq!(status, 401);
}

/// Garbage in the Authorization header is 401, not 500.
#[tokio::test]
async fn rejects_malformed_bearer_token() {
    let server = start_test_server().await;
    let (status, _) = request(
        server.addr(),
        "GET",
        "/api/v1/users",
        Some("not.a.token"),
        None,
    )
    .await;
    server.shutdown().await.unwrap();

    assert_eq!(status, 401);
}

/// The signature, not the claims, carries the privilege: a correctly
/// signed token is honored exactly at its claimed role.
#[tokio::test]
async fn valid_token_is_honored_at_claimed_role() {
    // Sanity-check the mint path against the server's verify path.
    let config = AuthConfig {
        jwt_secret: TEST_SECRET.to_string(),
        token_expiry_days: 1,
    };
    let token = token_for("U-admin", Role::Admin, None);
    let claims = auth::verify_token(&config, &token).unwrap();
    assert_eq!(claims.role, Role::Admin);

    let server = start_test_server().await;
    let (status, _) = request(server.addr(), "GET", "/api/v1/users", Some(&token), None).await;
    server.shutdown().await.unwrap();

    assert_eq!(status, 200);
}
