use axum::{Json, extract::State};
use std::collections::HashSet;
use uuid::Uuid;

use crate::{
    AppState,
    error::{ApiError, ApiPath, ErrorBody},
    insights,
    models::{InterviewExperience, OwnerFilter, Profile, PublicUserDetail, TaskExperience, UserView},
};

const USER_NOT_FOUND: &str = "User not found.";

/// Ids of the accounts whose experiences may be listed publicly.
async fn active_owners(state: &AppState) -> Result<HashSet<Uuid>, ApiError> {
    let accounts = state.repo.list_accounts().await?;
    Ok(accounts.into_iter().filter(|a| a.is_active).map(|a| a.id).collect())
}

/// list_public_interviews
///
/// [Public Route] Interview experiences of every active user, newest first.
#[utoipa::path(
    get,
    path = "/public/interviews",
    responses((status = 200, description = "All interview experiences", body = [InterviewExperience]))
)]
pub async fn list_public_interviews(
    State(state): State<AppState>,
) -> Result<Json<Vec<InterviewExperience>>, ApiError> {
    let owners = active_owners(&state).await?;
    let mut interviews = state.repo.list_interviews(OwnerFilter::All).await?;
    interviews.retain(|i| owners.contains(&i.user_id));
    Ok(Json(interviews))
}

/// list_public_tasks
///
/// [Public Route] Task experiences of every active user, newest start date first.
#[utoipa::path(
    get,
    path = "/public/tasks",
    responses((status = 200, description = "All task experiences", body = [TaskExperience]))
)]
pub async fn list_public_tasks(State(state): State<AppState>) -> Result<Json<Vec<TaskExperience>>, ApiError> {
    let owners = active_owners(&state).await?;
    let mut tasks = state.repo.list_tasks(OwnerFilter::All).await?;
    tasks.retain(|t| owners.contains(&t.user_id));
    Ok(Json(tasks))
}

/// get_public_user
///
/// [Public Route] Account detail for anyone: user view, profile, all experiences and
/// the derived completeness and badges. Built from view types only, so neither the
/// password hash nor the token can appear. Deactivated accounts are not disclosed.
#[utoipa::path(
    get,
    path = "/public/users/{id}",
    params(("id" = Uuid, Path, description = "Account ID")),
    responses(
        (status = 200, description = "Public account detail", body = PublicUserDetail),
        (status = 404, description = "No such active account", body = ErrorBody)
    )
)]
pub async fn get_public_user(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<PublicUserDetail>, ApiError> {
    let account = state
        .repo
        .get_account(id)
        .await?
        .filter(|a| a.is_active)
        .ok_or(ApiError::NotFound(USER_NOT_FOUND))?;

    let profile = state
        .repo
        .get_profile(id)
        .await?
        .unwrap_or_else(|| Profile::empty(id));
    let interview_experiences = state.repo.list_interviews(OwnerFilter::Owner(id)).await?;
    let task_experiences = state.repo.list_tasks(OwnerFilter::Owner(id)).await?;

    Ok(Json(PublicUserDetail {
        user: UserView::from(&account),
        completeness: insights::profile_completeness(&account, &profile),
        badges: insights::badges(&interview_experiences, &task_experiences),
        profile,
        interview_experiences,
        task_experiences,
    }))
}
