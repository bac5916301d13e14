use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use chrono::Utc;
use uuid::Uuid;

use crate::{
    AppState,
    auth::AuthUser,
    error::{ApiError, ApiJson, ApiPath, ErrorBody},
    insights::{self, DashboardMetrics},
    models::{AccountSummary, OwnerFilter, SetActiveRequest},
    policy::require_staff,
    site::{ADMIN_SITE, AccountQuery, AdminSite},
};

const USER_NOT_FOUND: &str = "User not found.";

/// get_site
///
/// [Admin Route] The static admin-site configuration.
#[utoipa::path(
    get,
    path = "/admin/site",
    responses(
        (status = 200, description = "Admin site configuration", body = AdminSite),
        (status = 403, description = "Not staff", body = ErrorBody)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_site(user: AuthUser) -> Result<Json<AdminSite>, ApiError> {
    require_staff(&user)?;
    Ok(Json(ADMIN_SITE.clone()))
}

/// get_dashboard
///
/// [Admin Route] Live activity metrics computed from a fresh store snapshot.
#[utoipa::path(
    get,
    path = "/admin/dashboard",
    responses(
        (status = 200, description = "Dashboard metrics", body = DashboardMetrics),
        (status = 403, description = "Not staff", body = ErrorBody)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_dashboard(user: AuthUser, State(state): State<AppState>) -> Result<Json<DashboardMetrics>, ApiError> {
    require_staff(&user)?;

    let accounts = state.repo.list_accounts().await?;
    let interviews = state.repo.list_interviews(OwnerFilter::All).await?;
    let tasks = state.repo.list_tasks(OwnerFilter::All).await?;

    Ok(Json(insights::dashboard(&accounts, &interviews, &tasks, Utc::now())))
}

/// list_users
///
/// [Admin Route] Account listing with search and flag filters, newest first.
#[utoipa::path(
    get,
    path = "/admin/users",
    params(AccountQuery),
    responses(
        (status = 200, description = "Accounts", body = [AccountSummary]),
        (status = 403, description = "Not staff", body = ErrorBody)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_users(
    user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<AccountQuery>,
) -> Result<Json<Vec<AccountSummary>>, ApiError> {
    require_staff(&user)?;

    let accounts = state.repo.list_accounts().await?;
    Ok(Json(
        accounts
            .iter()
            .filter(|a| query.matches(a))
            .map(AccountSummary::from)
            .collect(),
    ))
}

/// set_user_active
///
/// [Admin Route] Activates or deactivates an account. Deactivation also revokes the
/// account's token, so its open sessions end immediately.
#[utoipa::path(
    put,
    path = "/admin/users/{id}/active",
    params(("id" = Uuid, Path, description = "Account ID")),
    request_body = SetActiveRequest,
    responses(
        (status = 200, description = "Updated account", body = AccountSummary),
        (status = 403, description = "Not staff", body = ErrorBody),
        (status = 404, description = "No such account", body = ErrorBody)
    ),
    security(("bearer_auth" = []))
)]
pub async fn set_user_active(
    user: AuthUser,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<SetActiveRequest>,
) -> Result<Json<AccountSummary>, ApiError> {
    require_staff(&user)?;

    let account = state
        .repo
        .set_account_active(id, payload.is_active)
        .await?
        .ok_or(ApiError::NotFound(USER_NOT_FOUND))?;
    if !payload.is_active {
        state.repo.delete_token(id).await?;
    }
    tracing::info!(admin_id = %user.id, user_id = %id, is_active = payload.is_active, "account activity changed");
    Ok(Json(AccountSummary::from(&account)))
}

/// delete_user
///
/// [Admin Route] Deletes an account with its profile, token and experiences.
#[utoipa::path(
    delete,
    path = "/admin/users/{id}",
    params(("id" = Uuid, Path, description = "Account ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Not staff", body = ErrorBody),
        (status = 404, description = "No such account", body = ErrorBody)
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_user(
    user: AuthUser,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, ApiError> {
    require_staff(&user)?;

    if state.repo.delete_account(id).await? {
        tracing::warn!(admin_id = %user.id, user_id = %id, "account deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(USER_NOT_FOUND))
    }
}
