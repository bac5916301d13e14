use crate::{AppState, handlers::admin};
use axum::{
    Router,
    routing::{get, put},
};

/// Admin Router Module
///
/// Operator endpoints, nested under `/admin` and wrapped by the auth middleware.
/// Each handler additionally requires `is_staff`; other callers get 403.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET /admin/site
        // Static admin-site configuration (headers, registered model admins).
        .route("/site", get(admin::get_site))
        // GET /admin/dashboard
        // Real-time, weekly, engagement and health metrics plus the recent activity feed.
        .route("/dashboard", get(admin::get_dashboard))
        // GET /admin/users?search=&is_staff=&is_superuser=&is_active=
        .route("/users", get(admin::list_users))
        // PUT /admin/users/{id}/active, DELETE /admin/users/{id}
        // Deactivation revokes the token; deletion cascades.
        .route("/users/{id}/active", put(admin::set_user_active))
        .route("/users/{id}", axum::routing::delete(admin::delete_user))
}
