//! Role-change guards exercised end to end: the validator's decision is
//! what actually gates the UPDATE.

use coachline::Role;

use super::{request, start_test_server, token_for};

/// An admin demotes a manager; the change is persisted and visible.
#[tokio::test]
async fn admin_demotes_manager() {
    let server = start_test_server().await;
    let admin = token_for("U-admin", Role::Admin, None);

    let (status, body) = request(
        server.addr(),
        "PUT",
        "/api/v1/users/U-manager1/role",
        Some(&admin),
        Some(r#"{"role":"trainee"}"#),
    )
    .await;
    assert_eq!(status, 200, "body: {body}");

    let (status, body) = request(
        server.addr(),
        "GET",
        "/api/v1/users/U-manager1",
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, 200);
    assert!(body.contains(r#""role":"trainee""#), "body: {body}");

    server.shutdown().await.unwrap();
}

/// A manager holds `users:change_role` but cannot grant a role at or above
/// their own rank; the rank guard denies and nothing is persisted.
#[tokio::test]
async fn manager_cannot_promote_to_admin() {
    let server = start_test_server().await;
    let manager = token_for("U-manager1", Role::Manager, Some("B1"));

    let (status, body) = request(
        server.addr(),
        "PUT",
        "/api/v1/users/U-trainee1/role",
        Some(&manager),
        Some(r#"{"role":"admin"}"#),
    )
    .await;
    assert_eq!(status, 403);
    assert!(body.contains("Authorization denied"), "body: {body}");

    // The trainee is untouched.
    let admin = token_for("U-admin", Role::Admin, None);
    let (_, body) = request(
        server.addr(),
        "GET",
        "/api/v1/users/U-trainee1",
        Some(&admin),
        None,
    )
    .await;
    assert!(body.contains(r#""role":"trainee""#), "body: {body}");

    server.shutdown().await.unwrap();
}

/// An admin cannot modify a user whose current role is at or above admin.
#[tokio::test]
async fn admin_cannot_demote_super_admin() {
    let server = start_test_server().await;
    let admin = token_for("U-admin", Role::Admin, None);

    let (status, _) = request(
        server.addr(),
        "PUT",
        "/api/v1/users/U-super/role",
        Some(&admin),
        Some(r#"{"role":"manager"}"#),
    )
    .await;

    server.shutdown().await.unwrap();

    assert_eq!(status, 403);
}

/// A trainee fails the permission guard outright.
#[tokio::test]
async fn trainee_cannot_change_roles() {
    let server = start_test_server().await;
    let trainee = token_for("U-trainee1", Role::Trainee, Some("B1"));

    let (status, _) = request(
        server.addr(),
        "PUT",
        "/api/v1/users/U-trainee2/role",
        Some(&trainee),
        Some(r#"{"role":"manager"}"#),
    )
    .await;

    server.shutdown().await.unwrap();

    assert_eq!(status, 403);
}

/// A role label outside the hierarchy is a client error, not a policy
/// decision.
#[tokio::test]
async fn unknown_new_role_is_bad_request() {
    let server = start_test_server().await;
    let admin = token_for("U-admin", Role::Admin, None);

    let (status, body) = request(
        server.addr(),
        "PUT",
        "/api/v1/users/U-trainee1/role",
        Some(&admin),
        Some(r#"{"role":"owner"}"#),
    )
    .await;

    server.shutdown().await.unwrap();

    assert_eq!(status, 400, "body: {body}");
}

/// The invite role picker offers exactly the roles below the caller's own.
#[tokio::test]
async fn assignable_roles_match_rank() {
    let server = start_test_server().await;

    let admin = token_for("U-admin", Role::Admin, None);
    let (status, body) = request(
        server.addr(),
        "GET",
        "/api/v1/roles/assignable",
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, 200);
    assert!(body.contains(r#"["trainee","manager"]"#), "body: {body}");

    let trainee = token_for("U-trainee1", Role::Trainee, Some("B1"));
    let (status, body) = request(
        server.addr(),
        "GET",
        "/api/v1/roles/assignable",
        Some(&trainee),
        None,
    )
    .await;
    assert_eq!(status, 200);
    assert!(body.contains(r#""roles":[]"#), "body: {body}");

    server.shutdown().await.unwrap();
}

/// A manager invites a trainee; the invite is recorded.
#[tokio::test]
async fn manager_invites_trainee() {
    let server = start_test_server().await;
    let manager = token_for("U-manager1", Role::Manager, Some("B1"));

    let (status, body) = request(
        server.addr(),
        "POST",
        "/api/v1/users/invite",
        Some(&manager),
        Some(r#"{"email":"new-hire@b1.example","role":"trainee","branch_id":"B1"}"#),
    )
    .await;

    server.shutdown().await.unwrap();

    assert_eq!(status, 201, "body: {body}");
    assert!(body.contains("new-hire@b1.example"));
}

/// A manager cannot invite at their own rank.
#[tokio::test]
async fn manager_cannot_invite_manager() {
    let server = start_test_server().await;
    let manager = token_for("U-manager1", Role::Manager, Some("B1"));

    let (status, _) = request(
        server.addr(),
        "POST",
        "/api/v1/users/invite",
        Some(&manager),
        Some(r#"{"email":"peer@b1.example","role":"manager","branch_id":"B1"}"#),
    )
    .await;

    server.shutdown().await.unwrap();

    assert_eq!(status, 403);
}

/// A trainee lacks `users:invite` entirely.
#[tokio::test]
async fn trainee_cannot_invite() {
    let server = start_test_server().await;
    let trainee = token_for("U-trainee1", Role::Trainee, Some("B1"));

    let (status, _) = request(
        server.addr(),
        "POST",
        "/api/v1/users/invite",
        Some(&trainee),
        Some(r#"{"email":"friend@b1.example","role":"trainee"}"#),
    )
    .await;

    server.shutdown().await.unwrap();

    assert_eq!(status, 403);
}
