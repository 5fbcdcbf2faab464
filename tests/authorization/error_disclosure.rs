//! Error information-disclosure tests.
//!
//! `Error::into_response` must redact server-side detail (SQL fragments,
//! file paths) while letting client-facing authorization messages through.

use coachline::Error;
use http_body_util::BodyExt;

fn body_of(resp: hyper::Response<http_body_util::Full<bytes::Bytes>>) -> String {
    let bytes = tokio_test::block_on(BodyExt::collect(resp.into_body()))
        .unwrap()
        .to_bytes();
    String::from_utf8_lossy(&bytes).to_string()
}

/// Errors created with `Error::Internal(...)` must not pass their payload
/// into the JSON body visible to the caller.
#[test]
fn internal_error_redacts_sql() {
    let err = Error::Internal("Failed to query SELECT * FROM users WHERE id = 'x'".into());
    let body = body_of(err.into_response());
    assert!(
        !body.contains("SELECT"),
        "SQL fragment leaked to client: {body}"
    );
    assert!(
        body.contains("Internal server error"),
        "Expected generic error message, got: {body}"
    );
}

/// `Error::Io` wraps the underlying `std::io::Error` whose message often
/// contains filesystem paths.
#[test]
fn io_error_redacts_paths() {
    let io_err = std::io::Error::new(
        std::io::ErrorKind::NotFound,
        "No such file: /etc/secret/policy.toml",
    );
    let err = Error::Io(io_err);
    let body = body_of(err.into_response());
    assert!(
        !body.contains("/etc/secret"),
        "Filesystem path leaked to client: {body}"
    );
    assert!(body.contains("Internal server error"));
}

/// Authorization denials are client errors; their message is meant for the
/// caller and passes through with a 403.
#[test]
fn forbidden_message_is_client_facing() {
    let err = Error::forbidden("users:change_role");
    let resp = err.into_response();
    assert_eq!(resp.status(), hyper::StatusCode::FORBIDDEN);
    let body = body_of(resp);
    assert!(body.contains("cannot change_role users"), "body: {body}");
}

/// Config failures surface as 500 with a generic body; the message may
/// name environment variables and paths.
#[test]
fn config_error_is_redacted() {
    let err = Error::Config("COACHLINE_JWT_SECRET must be set".into());
    let resp = err.into_response();
    assert_eq!(resp.status(), hyper::StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_of(resp);
    assert!(!body.contains("COACHLINE_JWT_SECRET"), "body: {body}");
}
