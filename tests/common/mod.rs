#![allow(dead_code)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use recursion_backend::{
    AppConfig, AppState, MemoryRepository, create_router,
    commands::{self, AdminSeed},
    repository::RepositoryState,
};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

pub const PASSWORD: &str = "longpass1";

/// Router over a fresh in-memory store; every test gets its own.
pub struct TestApp {
    pub state: AppState,
    pub router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        let repo = Arc::new(MemoryRepository::new()) as RepositoryState;
        let state = AppState {
            repo,
            config: AppConfig::default(),
        };
        let router = create_router(state.clone());
        Self { state, router }
    }

    pub async fn send(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(Method::PUT, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, token, None).await
    }

    /// Registers `username` with `<username>@x.com` and returns (id, token).
    pub async fn register(&self, username: &str) -> (Uuid, String) {
        let (status, body) = self
            .post(
                "/register",
                None,
                json!({
                    "username": username,
                    "email": format!("{username}@x.com"),
                    "password": PASSWORD,
                    "confirmPassword": PASSWORD,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register {username}: {body}");
        let id = body["user"]["id"].as_str().unwrap().parse().unwrap();
        (id, body["token"].as_str().unwrap().to_string())
    }

    pub async fn login(&self, email: &str, password: &str) -> (StatusCode, Value) {
        self.post("/login", None, json!({ "email": email, "password": password })).await
    }

    /// Seeds a staff superuser through the CLI command and returns its token.
    pub async fn staff_token(&self) -> String {
        commands::create_admin(
            &self.state.repo,
            AdminSeed {
                username: "ops".into(),
                email: "ops@recursion.com".into(),
                password: PASSWORD.into(),
            },
        )
        .await
        .unwrap();
        let (status, body) = self.login("ops@recursion.com", PASSWORD).await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().unwrap().to_string()
    }

    pub async fn create_interview(&self, token: &str, company: &str) -> Value {
        let (status, body) = self.post("/interviews", Some(token), interview_body(company)).await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body
    }

    pub async fn create_task(&self, token: &str, company: &str) -> Value {
        let (status, body) = self.post("/tasks", Some(token), task_body(company)).await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body
    }
}

pub fn interview_body(company: &str) -> Value {
    json!({
        "company": company,
        "position": "SWE",
        "interview_date": "2024-01-01",
        "status": "pending",
        "rating": 4
    })
}

pub fn task_body(company: &str) -> Value {
    json!({
        "company_name": company,
        "position": "Intern",
        "task_type": "internship",
        "start_date": "2023-06-01",
        "description": "Built the billing service",
        "technologies_used": "rust, postgres"
    })
}
