//! Route gating through the real router and session layer.
//!
//! Every request here is answered before a handler queries the database, so
//! these run without `PostgreSQL`.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;

use cs_console_core::StaffRole;
use cs_console_integration_tests::{TestConsole, body_text, get, location, post};

#[tokio::test]
async fn test_health_is_public() {
    let console = TestConsole::new().unwrap();

    let response = console.send(get("/health", None).unwrap()).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await.unwrap(), "ok");
}

#[tokio::test]
async fn test_login_page_renders_for_anonymous() {
    let console = TestConsole::new().unwrap();

    let response = console.send(get("/auth/login", None).unwrap()).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await.unwrap();
    assert!(body.contains("Cozmeed"));
    assert!(body.contains(r#"name="username""#));
    assert!(body.contains(r#"name="password""#));
}

#[tokio::test]
async fn test_pages_redirect_anonymous_to_login() {
    let console = TestConsole::new().unwrap();

    for path in [
        "/",
        "/dashboard",
        "/products",
        "/promos/new",
        "/orders",
        "/complaints?filter=unhandled",
        "/journeys",
        "/token-usage",
        "/style-cs",
        "/holds/export.csv",
    ] {
        let response = console.send(get(path, None).unwrap()).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{path}");
        assert_eq!(location(&response), Some("/auth/login"), "{path}");
    }
}

#[tokio::test]
async fn test_api_rejects_anonymous_with_401() {
    let console = TestConsole::new().unwrap();

    let events = console
        .send(get("/api/events?table=Order", None).unwrap())
        .await
        .unwrap();
    assert_eq!(events.status(), StatusCode::UNAUTHORIZED);

    let metrics = console
        .send(post("/api/metrics/daily", None, "application/json", "{}").unwrap())
        .await
        .unwrap();
    assert_eq!(metrics.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_operator_is_kept_off_admin_screens() {
    let console = TestConsole::new().unwrap();
    let cookie = console.sign_in("sari", StaffRole::Operator).await.unwrap();

    let holds = console.send(get("/", Some(&cookie)).unwrap()).await.unwrap();
    assert_eq!(holds.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&holds), Some("/dashboard"));

    let hold_number = console
        .send(
            post(
                "/holds",
                Some(&cookie),
                "application/x-www-form-urlencoded",
                "phone_number=628123456789",
            )
            .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(hold_number.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&hold_number), Some("/dashboard"));
}

#[tokio::test]
async fn test_operator_gets_403_from_admin_api() {
    let console = TestConsole::new().unwrap();
    let cookie = console.sign_in("sari", StaffRole::Operator).await.unwrap();

    let response = console
        .send(post("/api/metrics/daily", Some(&cookie), "application/json", "{}").unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        body_text(response).await.unwrap(),
        "Only admins can access this resource"
    );
}

#[tokio::test]
async fn test_admin_api_rejects_malformed_date() {
    let console = TestConsole::new().unwrap();
    let cookie = console.sign_in("budi", StaffRole::Admin).await.unwrap();

    let response = console
        .send(
            post(
                "/api/metrics/daily",
                Some(&cookie),
                "application/json",
                r#"{"date":"31/03/2024"}"#,
            )
            .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = serde_json::from_str(&body_text(response).await.unwrap()).unwrap();
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("31/03/2024"));
}

#[tokio::test]
async fn test_admin_api_rejects_non_json_body() {
    let console = TestConsole::new().unwrap();
    let cookie = console.sign_in("budi", StaffRole::Admin).await.unwrap();

    let response = console
        .send(post("/api/metrics/daily", Some(&cookie), "text/plain", "yesterday").unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_signed_in_login_page_redirects_home() {
    let console = TestConsole::new().unwrap();

    let admin = console.sign_in("budi", StaffRole::Admin).await.unwrap();
    let response = console.send(get("/auth/login", Some(&admin)).unwrap()).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/"));

    let operator = console.sign_in("sari", StaffRole::Operator).await.unwrap();
    let response = console
        .send(get("/auth/login", Some(&operator)).unwrap())
        .await
        .unwrap();
    assert_eq!(location(&response), Some("/dashboard"));
}

#[tokio::test]
async fn test_logout_ends_the_session() {
    let console = TestConsole::new().unwrap();
    let cookie = console.sign_in("budi", StaffRole::Admin).await.unwrap();

    let response = console
        .send(post("/auth/logout", Some(&cookie), "application/x-www-form-urlencoded", "").unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/auth/login"));

    let after = console.send(get("/dashboard", Some(&cookie)).unwrap()).await.unwrap();
    assert_eq!(after.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&after), Some("/auth/login"));
}
