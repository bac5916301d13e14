use axum::{Json, extract::State, http::StatusCode};
use uuid::Uuid;

use crate::{
    AppState,
    auth::AuthUser,
    error::{ApiError, ApiJson, ApiPath, ErrorBody, NOT_FOUND},
    models::{InterviewExperience, InterviewPayload, OwnerFilter, TaskExperience, TaskPayload},
    policy::{self, Action, Caller},
    validation,
};

// --- Interview experiences ---

/// list_my_interviews
///
/// [Authenticated Route] The caller's interview experiences, newest first.
#[utoipa::path(
    get,
    path = "/interviews",
    responses((status = 200, description = "Own interview experiences", body = [InterviewExperience])),
    security(("bearer_auth" = []))
)]
pub async fn list_my_interviews(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<InterviewExperience>>, ApiError> {
    let records = state.repo.list_interviews(OwnerFilter::Owner(user.id)).await?;
    Ok(Json(records))
}

/// create_interview
///
/// [Authenticated Route] The owner is always the caller; any owner in the body is ignored.
#[utoipa::path(
    post,
    path = "/interviews",
    request_body = InterviewPayload,
    responses(
        (status = 201, description = "Created", body = InterviewExperience),
        (status = 400, description = "Invalid payload", body = ErrorBody)
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_interview(
    user: AuthUser,
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<InterviewPayload>,
) -> Result<(StatusCode, Json<InterviewExperience>), ApiError> {
    let new = validation::validate_new_interview(payload)?;
    let record = state.repo.create_interview(user.id, new).await?;
    tracing::info!(
        user_id = %user.id,
        interview_id = %record.id,
        company = %record.company_name,
        "interview experience created"
    );
    Ok((StatusCode::CREATED, Json(record)))
}

/// get_interview
///
/// [Authenticated Route] Owner-only; a foreign record is reported as missing.
#[utoipa::path(
    get,
    path = "/interviews/{id}",
    params(("id" = Uuid, Path, description = "Interview experience ID")),
    responses(
        (status = 200, description = "Found", body = InterviewExperience),
        (status = 404, description = "Not found or not owned", body = ErrorBody)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_interview(
    user: AuthUser,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<InterviewExperience>, ApiError> {
    let record = state.repo.get_interview(id).await?;
    let record = policy::authorize_record(&Caller::from(&user), Action::ReadExperience, record, NOT_FOUND)?;
    Ok(Json(record))
}

/// update_interview
///
/// [Authenticated Route] Partial update; only supplied fields are validated and replaced.
#[utoipa::path(
    put,
    path = "/interviews/{id}",
    params(("id" = Uuid, Path, description = "Interview experience ID")),
    request_body = InterviewPayload,
    responses(
        (status = 200, description = "Updated", body = InterviewExperience),
        (status = 400, description = "Invalid field", body = ErrorBody),
        (status = 404, description = "Not found or not owned", body = ErrorBody)
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_interview(
    user: AuthUser,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<InterviewPayload>,
) -> Result<Json<InterviewExperience>, ApiError> {
    let current = state.repo.get_interview(id).await?;
    policy::authorize_record(&Caller::from(&user), Action::UpdateExperience, current, NOT_FOUND)?;

    let changes = validation::validate_interview_changes(payload)?;
    // The store re-checks the owner in the same statement as the write.
    let record = state
        .repo
        .update_interview(id, user.id, changes)
        .await?
        .ok_or(ApiError::NotFound(NOT_FOUND))?;
    tracing::info!(user_id = %user.id, interview_id = %id, "interview experience updated");
    Ok(Json(record))
}

/// delete_interview
///
/// [Authenticated Route] Owner-only. Deleting a missing or foreign record is 404.
#[utoipa::path(
    delete,
    path = "/interviews/{id}",
    params(("id" = Uuid, Path, description = "Interview experience ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found or not owned", body = ErrorBody)
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_interview(
    user: AuthUser,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, ApiError> {
    let current = state.repo.get_interview(id).await?;
    policy::authorize_record(&Caller::from(&user), Action::DeleteExperience, current, NOT_FOUND)?;

    if state.repo.delete_interview(id, user.id).await? {
        tracing::info!(user_id = %user.id, interview_id = %id, "interview experience deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(NOT_FOUND))
    }
}

// --- Task experiences ---

/// list_my_tasks
///
/// [Authenticated Route] The caller's task experiences, newest start date first.
#[utoipa::path(
    get,
    path = "/tasks",
    responses((status = 200, description = "Own task experiences", body = [TaskExperience])),
    security(("bearer_auth" = []))
)]
pub async fn list_my_tasks(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<TaskExperience>>, ApiError> {
    let records = state.repo.list_tasks(OwnerFilter::Owner(user.id)).await?;
    Ok(Json(records))
}

#[utoipa::path(
    post,
    path = "/tasks",
    request_body = TaskPayload,
    responses(
        (status = 201, description = "Created", body = TaskExperience),
        (status = 400, description = "Invalid payload", body = ErrorBody)
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_task(
    user: AuthUser,
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<TaskPayload>,
) -> Result<(StatusCode, Json<TaskExperience>), ApiError> {
    let new = validation::validate_new_task(payload)?;
    let record = state.repo.create_task(user.id, new).await?;
    tracing::info!(
        user_id = %user.id,
        task_id = %record.id,
        task_type = %record.task_type,
        "task experience created"
    );
    Ok((StatusCode::CREATED, Json(record)))
}

#[utoipa::path(
    get,
    path = "/tasks/{id}",
    params(("id" = Uuid, Path, description = "Task experience ID")),
    responses(
        (status = 200, description = "Found", body = TaskExperience),
        (status = 404, description = "Not found or not owned", body = ErrorBody)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_task(
    user: AuthUser,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<TaskExperience>, ApiError> {
    let record = state.repo.get_task(id).await?;
    let record = policy::authorize_record(&Caller::from(&user), Action::ReadExperience, record, NOT_FOUND)?;
    Ok(Json(record))
}

/// update_task
///
/// [Authenticated Route] Partial update. Setting `currently_working` clears `end_date`;
/// an end date before the (possibly stored) start date is rejected.
#[utoipa::path(
    put,
    path = "/tasks/{id}",
    params(("id" = Uuid, Path, description = "Task experience ID")),
    request_body = TaskPayload,
    responses(
        (status = 200, description = "Updated", body = TaskExperience),
        (status = 400, description = "Invalid field", body = ErrorBody),
        (status = 404, description = "Not found or not owned", body = ErrorBody)
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_task(
    user: AuthUser,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<TaskPayload>,
) -> Result<Json<TaskExperience>, ApiError> {
    let current = state.repo.get_task(id).await?;
    let current = policy::authorize_record(&Caller::from(&user), Action::UpdateExperience, current, NOT_FOUND)?;

    let changes = validation::validate_task_changes(payload)?;
    validation::check_task_dates(&current, &changes)?;
    let record = state
        .repo
        .update_task(id, user.id, changes)
        .await?
        .ok_or(ApiError::NotFound(NOT_FOUND))?;
    tracing::info!(user_id = %user.id, task_id = %id, "task experience updated");
    Ok(Json(record))
}

#[utoipa::path(
    delete,
    path = "/tasks/{id}",
    params(("id" = Uuid, Path, description = "Task experience ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found or not owned", body = ErrorBody)
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_task(
    user: AuthUser,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, ApiError> {
    let current = state.repo.get_task(id).await?;
    policy::authorize_record(&Caller::from(&user), Action::DeleteExperience, current, NOT_FOUND)?;

    if state.repo.delete_task(id, user.id).await? {
        tracing::info!(user_id = %user.id, task_id = %id, "task experience deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(NOT_FOUND))
    }
}
