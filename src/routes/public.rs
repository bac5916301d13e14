use crate::{
    AppState,
    handlers::{accounts, public},
};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Unauthenticated endpoints. The public listings carry no ownership filter; the
/// account detail is assembled from view types and never exposes credentials.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness check for monitoring and load balancers.
        .route("/health", get(accounts::health_check))
        // POST /register
        // Creates the account and its empty profile, returns the first token (201).
        .route("/register", post(accounts::register))
        // POST /login
        // Email + password; returns the account's active token.
        .route("/login", post(accounts::login))
        // GET /public/interviews, GET /public/tasks
        // Every user's experiences.
        .route("/public/interviews", get(public::list_public_interviews))
        .route("/public/tasks", get(public::list_public_tasks))
        // GET /public/users/{id}
        // Account + profile + experiences, with completeness and badges.
        .route("/public/users/{id}", get(public::get_public_user))
}
