use recursion_backend::{AppConfig, AppState, MemoryRepository, RepositoryState, create_router};
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::net::TcpListener;

#[derive(Debug)]
pub struct TestApp {
    pub address: String,
}

/// Serves the full router on an ephemeral port, backed by a fresh in-memory store.
async fn spawn_app() -> TestApp {
    let repo = Arc::new(MemoryRepository::new()) as RepositoryState;
    let state = AppState {
        repo,
        config: AppConfig::default(),
    };
    let router = create_router(state);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    TestApp { address }
}

#[tokio::test]
async fn test_health_check() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let response = client
        .get(format!("{}/health", app.address))
        .send()
        .await
        .expect("req fail");
    assert!(response.status().is_success());
    // Every response carries a correlation id.
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_register_and_fetch_profile_over_http() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/register", app.address))
        .json(&json!({
            "username": "alice",
            "email": "alice@x.com",
            "password": "longpass1",
            "confirmPassword": "longpass1"
        }))
        .send()
        .await
        .expect("req fail");
    assert_eq!(response.status().as_u16(), 201);
    let body: Value = response.json().await.unwrap();
    let token = body["token"].as_str().unwrap();

    let response = client
        .get(format!("{}/profile", app.address))
        .bearer_auth(token)
        .send()
        .await
        .expect("req fail");
    assert_eq!(response.status().as_u16(), 200);
    let profile: Value = response.json().await.unwrap();
    assert_eq!(profile["user"]["username"], "alice");
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let response = client
        .get(format!("{}/api-docs/openapi.json", app.address))
        .send()
        .await
        .expect("req fail");
    assert!(response.status().is_success());

    let doc: Value = response.json().await.unwrap();
    assert!(doc["paths"]["/interviews/{id}"].is_object());
    assert!(doc["paths"]["/admin/dashboard"].is_object());
    assert!(doc["components"]["securitySchemes"]["bearer_auth"].is_object());
}
