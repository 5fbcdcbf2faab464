//! End-to-end scope filtering: what each role actually sees over HTTP.

use coachline::Role;

use super::{request, start_test_server, token_for};

/// A trainee listing sessions gets only their own rows.
#[tokio::test]
async fn trainee_lists_only_their_own_sessions() {
    let server = start_test_server().await;
    let token = token_for("U-trainee1", Role::Trainee, Some("B1"));

    let (status, body) = request(server.addr(), "GET", "/api/v1/sessions", Some(&token), None).await;

    server.shutdown().await.unwrap();

    assert_eq!(status, 200, "body: {body}");
    assert!(body.contains("S1"));
    assert!(body.contains("S3"));
    assert!(!body.contains("S2"), "saw another trainee's session: {body}");
}

/// A manager's session list is restricted to their branch.
#[tokio::test]
async fn manager_lists_branch_sessions_only() {
    let server = start_test_server().await;

    let token = token_for("U-manager1", Role::Manager, Some("B1"));
    let (status, body) = request(server.addr(), "GET", "/api/v1/sessions", Some(&token), None).await;
    assert_eq!(status, 200, "body: {body}");
    assert!(body.contains("S1") && body.contains("S3"));
    assert!(!body.contains("S2"));

    let token = token_for("U-manager2", Role::Manager, Some("B2"));
    let (status, body) = request(server.addr(), "GET", "/api/v1/sessions", Some(&token), None).await;
    assert_eq!(status, 200, "body: {body}");
    assert!(body.contains("S2"));
    assert!(!body.contains("S1"));

    server.shutdown().await.unwrap();
}

/// Admin scope is unrestricted: every session in every branch.
#[tokio::test]
async fn admin_lists_all_sessions() {
    let server = start_test_server().await;
    let token = token_for("U-admin", Role::Admin, None);

    let (status, body) = request(server.addr(), "GET", "/api/v1/sessions", Some(&token), None).await;

    server.shutdown().await.unwrap();

    assert_eq!(status, 200, "body: {body}");
    for id in ["S1", "S2", "S3"] {
        assert!(body.contains(id), "missing {id} in: {body}");
    }
}

/// A trainee has no `users:view`, so the directory listing is forbidden.
#[tokio::test]
async fn trainee_cannot_list_users() {
    let server = start_test_server().await;
    let token = token_for("U-trainee1", Role::Trainee, Some("B1"));

    let (status, _) = request(server.addr(), "GET", "/api/v1/users", Some(&token), None).await;

    server.shutdown().await.unwrap();

    assert_eq!(status, 403);
}

/// A manager's user listing is restricted to their branch; unbranched
/// accounts (admins) are not included.
#[tokio::test]
async fn manager_lists_branch_users_only() {
    let server = start_test_server().await;
    let token = token_for("U-manager1", Role::Manager, Some("B1"));

    let (status, body) = request(server.addr(), "GET", "/api/v1/users", Some(&token), None).await;

    server.shutdown().await.unwrap();

    assert_eq!(status, 200, "body: {body}");
    assert!(body.contains("U-trainee1"));
    assert!(body.contains("U-manager1"));
    assert!(!body.contains("U-manager2"));
    assert!(!body.contains("U-admin"));
}

/// Self-lookup works without `users:view`; looking up anyone else with a
/// trainee token is forbidden.
#[tokio::test]
async fn trainee_fetches_self_but_not_others() {
    let server = start_test_server().await;
    let token = token_for("U-trainee1", Role::Trainee, Some("B1"));

    let (status, body) = request(
        server.addr(),
        "GET",
        "/api/v1/users/U-trainee1",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, 200, "body: {body}");
    assert!(body.contains("trainee1@b1.example"));

    let (status, _) = request(
        server.addr(),
        "GET",
        "/api/v1/users/U-manager1",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, 403);

    server.shutdown().await.unwrap();
}

/// Out-of-scope rows read as not found, not forbidden; the filter rides
/// along with the id lookup.
#[tokio::test]
async fn manager_cannot_fetch_user_outside_branch() {
    let server = start_test_server().await;
    let token = token_for("U-manager1", Role::Manager, Some("B1"));

    let (status, _) = request(
        server.addr(),
        "GET",
        "/api/v1/users/U-manager2",
        Some(&token),
        None,
    )
    .await;

    server.shutdown().await.unwrap();

    assert_eq!(status, 404);
}

/// A session claiming a role outside the hierarchy fails closed: no
/// permission, not even `sessions:view`.
#[tokio::test]
async fn unknown_role_claim_gets_nothing() {
    let server = start_test_server().await;
    let token = token_for("U-trainee1", Role::Unknown, Some("B1"));

    let (status, _) = request(server.addr(), "GET", "/api/v1/sessions", Some(&token), None).await;

    server.shutdown().await.unwrap();

    assert_eq!(status, 403);
}

/// No token, no data.
#[tokio::test]
async fn unauthenticated_requests_are_rejected() {
    let server = start_test_server().await;

    let (status, _) = request(server.addr(), "GET", "/api/v1/sessions", None, None).await;
    assert_eq!(status, 401);

    let (status, _) = request(server.addr(), "GET", "/api/v1/users", None, None).await;
    assert_eq!(status, 401);

    server.shutdown().await.unwrap();
}

/// Scoped deletion: an admin may delete any session and the row is gone.
#[tokio::test]
async fn admin_deletes_a_session() {
    let server = start_test_server().await;
    let admin = token_for("U-admin", Role::Admin, None);

    let (status, _) = request(
        server.addr(),
        "DELETE",
        "/api/v1/sessions/S2",
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, 204);

    let (status, _) = request(
        server.addr(),
        "GET",
        "/api/v1/sessions/S2",
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, 404);

    server.shutdown().await.unwrap();
}

/// A manager lacks `sessions:delete` entirely.
#[tokio::test]
async fn manager_cannot_delete_sessions() {
    let server = start_test_server().await;
    let token = token_for("U-manager1", Role::Manager, Some("B1"));

    let (status, _) = request(
        server.addr(),
        "DELETE",
        "/api/v1/sessions/S1",
        Some(&token),
        None,
    )
    .await;

    server.shutdown().await.unwrap();

    assert_eq!(status, 403);
}
