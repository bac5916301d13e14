use crate::{
    AppState,
    handlers::{accounts, experiences},
};
use axum::{
    Router,
    routing::{get, post},
};

/// Authenticated Router Module
///
/// Every handler here receives a validated `AuthUser`. Experience records are
/// owner-scoped: a record belonging to someone else answers 404, exactly like a
/// record that does not exist.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // POST /logout
        // Revokes the caller's token.
        .route("/logout", post(accounts::logout))
        // GET/PUT /profile
        // The caller's own profile; PUT is a partial update.
        .route(
            "/profile",
            get(accounts::get_profile).put(accounts::update_profile),
        )
        // --- Interview experiences ---
        .route(
            "/interviews",
            get(experiences::list_my_interviews).post(experiences::create_interview),
        )
        .route(
            "/interviews/{id}",
            get(experiences::get_interview)
                .put(experiences::update_interview)
                .delete(experiences::delete_interview),
        )
        // --- Task experiences ---
        .route(
            "/tasks",
            get(experiences::list_my_tasks).post(experiences::create_task),
        )
        .route(
            "/tasks/{id}",
            get(experiences::get_task)
                .put(experiences::update_task)
                .delete(experiences::delete_task),
        )
}
