mod common;

use axum::http::{Method, StatusCode};
use produksi_api::auth::Role;

use common::{expired_token_for, request, send, test_app, token_for};

const REPORT_PREFIXES: [&str; 4] = [
    "/api/laporan",
    "/api/penjumboan/laporan",
    "/api/pemuatan/laporan",
    "/api/packing-plant/laporan",
];

const DAILY_BODY: &str = r#"{"tanggal":"2024-03-05","id_unit":1,"produksi_ton":850}"#;

#[tokio::test]
async fn missing_token_is_unauthorized() {
    let (app, _) = test_app();

    for prefix in REPORT_PREFIXES {
        let (status, body) = send(&app, request(Method::GET, &format!("{prefix}/all"), None, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{prefix}/all");
        assert_eq!(body["error"], true);

        let (status, _) = send(&app, request(Method::POST, prefix, None, Some(DAILY_BODY))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "POST {prefix}");

        let (status, _) = send(&app, request(Method::DELETE, &format!("{prefix}/1"), None, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "DELETE {prefix}/1");
    }
}

#[tokio::test]
async fn bad_tokens_are_unauthorized() {
    let (app, state) = test_app();

    let (status, body) = send(&app, request(Method::GET, "/api/laporan/all", Some("not.a.token"), None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid token");

    let expired = expired_token_for(&state, Role::Superuser);
    let (status, body) = send(&app, request(Method::GET, "/api/laporan/all", Some(&expired), None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Token expired");
}

#[tokio::test]
async fn viewer_cannot_list_reports() {
    let (app, state) = test_app();
    let token = token_for(&state, Role::Viewer, &["Pabrik"]);

    for prefix in REPORT_PREFIXES {
        let (status, body) = send(&app, request(Method::GET, &format!("{prefix}/all"), Some(&token), None)).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{prefix}/all");
        assert_eq!(body["code"], "FORBIDDEN");
    }
}

#[tokio::test]
async fn read_only_roles_cannot_write() {
    let (app, state) = test_app();

    for role in [Role::Viewer, Role::Admin] {
        let token = token_for(&state, role, &["Pabrik"]);

        let (status, _) = send(&app, request(Method::POST, "/api/laporan", Some(&token), Some(DAILY_BODY))).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{role} create");

        let (status, _) = send(
            &app,
            request(Method::PUT, "/api/laporan/7", Some(&token), Some(DAILY_BODY)),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{role} update");

        let (status, _) = send(
            &app,
            request(Method::DELETE, "/api/packing-plant/laporan/7", Some(&token), None),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{role} delete");
    }
}

#[tokio::test]
async fn entry_admin_without_groups_sends_incomplete_payload() {
    let (app, state) = test_app();
    let token = token_for(&state, Role::EntryAdmin, &[]);

    let (status, body) = send(&app, request(Method::POST, "/api/laporan", Some(&token), Some(DAILY_BODY))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn entry_admin_needs_a_unit() {
    let (app, state) = test_app();
    let token = token_for(&state, Role::EntryAdmin, &["Pabrik"]);

    let (status, _) = send(
        &app,
        request(Method::POST, "/api/pemuatan/laporan", Some(&token), Some(r#"{"tanggal":"2024-03-05"}"#)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
