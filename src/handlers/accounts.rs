use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;
use uuid::Uuid;

use crate::{
    AppState,
    auth::{self, AuthUser},
    config::AppConfig,
    error::{ApiError, ApiJson, ErrorBody},
    models::{
        AuthResponse, AuthToken, HealthResponse, LoginRequest, MessageResponse, NewAccount,
        ProfileUpdateRequest, ProfileUpdateResponse, ProfileView, RegisterRequest, UserView,
    },
    policy::{self, Action, Caller},
    repository::RepositoryState,
    validation::{self, NON_FIELD, ValidationErrors},
};

const PROFILE_NOT_FOUND: &str = "Profile not found";
const INVALID_CREDENTIALS: &str = "Invalid credentials.";
const DISABLED_ACCOUNT: &str = "User account is disabled.";

/// start_session
///
/// Returns the account's active token: the stored one while it is still valid, otherwise
/// a freshly issued token that replaces it.
async fn start_session(repo: &RepositoryState, config: &AppConfig, user_id: Uuid) -> Result<String, ApiError> {
    if let Some(existing) = repo.get_token(user_id).await? {
        if auth::decode_token(&existing.key, &config.jwt_secret).is_ok() {
            return Ok(existing.key);
        }
    }

    let key = auth::issue_token(user_id, config).map_err(|e| {
        tracing::error!(error = %e, %user_id, "failed to issue access token");
        ApiError::Internal
    })?;
    repo.store_token(AuthToken {
        user_id,
        key: key.clone(),
        created_at: Utc::now(),
    })
    .await?;
    Ok(key)
}

/// health_check
///
/// [Public Route] Liveness check; always 200.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health_check() -> Json<HealthResponse> {
    let endpoints = [
        "/register",
        "/login",
        "/logout",
        "/profile",
        "/interviews",
        "/tasks",
        "/public/interviews",
        "/public/tasks",
        "/public/users/{id}",
    ];
    Json(HealthResponse {
        status: "ok".to_string(),
        message: "API is working!".to_string(),
        endpoints: endpoints.iter().map(|e| e.to_string()).collect(),
    })
}

/// register
///
/// [Public Route] Creates an account together with its empty profile and issues the
/// first access token. Duplicate email/username is rejected by the store.
#[utoipa::path(
    post,
    path = "/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Registered", body = AuthResponse),
        (status = 400, description = "Invalid payload or duplicate account", body = ErrorBody)
    )
)]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let valid = validation::validate_registration(payload)?;

    let password_hash = auth::hash_password(&valid.password).map_err(|_| ApiError::Internal)?;
    let account = state
        .repo
        .create_account(NewAccount {
            username: valid.username,
            email: valid.email,
            password_hash,
            first_name: valid.first_name,
            last_name: valid.last_name,
            is_staff: false,
            is_superuser: false,
        })
        .await?;

    let token = start_session(&state.repo, &state.config, account.id).await?;
    tracing::info!(user_id = %account.id, username = %account.username, "user registered");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: UserView::from(&account),
            token,
            message: "User registered successfully".to_string(),
        }),
    ))
}

/// login
///
/// [Public Route] Authenticates by email and password. A disabled account is refused
/// before the password is looked at.
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = AuthResponse),
        (status = 400, description = "Missing fields or invalid credentials", body = ErrorBody),
        (status = 401, description = "Account disabled", body = ErrorBody)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let credentials = validation::validate_login(payload)?;
    let invalid = || ApiError::Validation(ValidationErrors::single(NON_FIELD, INVALID_CREDENTIALS));

    let account = state
        .repo
        .get_account_by_email(&credentials.email)
        .await?
        .ok_or_else(invalid)?;
    if !account.is_active {
        tracing::warn!(user_id = %account.id, "login attempt on disabled account");
        return Err(ApiError::Auth(DISABLED_ACCOUNT.to_string()));
    }
    if !auth::verify_password(&credentials.password, &account.password_hash) {
        tracing::debug!(user_id = %account.id, "login rejected: wrong password");
        return Err(invalid());
    }

    let token = start_session(&state.repo, &state.config, account.id).await?;
    state.repo.record_login(account.id).await?;
    tracing::info!(user_id = %account.id, "user logged in");

    Ok(Json(AuthResponse {
        user: UserView::from(&account),
        token,
        message: "Login successful".to_string(),
    }))
}

/// logout
///
/// [Authenticated Route] Revokes the caller's token. Any failure is reported with a
/// generic message.
#[utoipa::path(
    post,
    path = "/logout",
    responses(
        (status = 200, description = "Logged out", body = MessageResponse),
        (status = 400, description = "Something went wrong", body = ErrorBody)
    ),
    security(("bearer_auth" = []))
)]
pub async fn logout(user: AuthUser, State(state): State<AppState>) -> Result<Json<MessageResponse>, ApiError> {
    match state.repo.delete_token(user.id).await {
        Ok(true) => {
            tracing::info!(user_id = %user.id, "user logged out");
            Ok(Json(MessageResponse {
                message: "Logout successful".to_string(),
            }))
        }
        Ok(false) => {
            tracing::warn!(user_id = %user.id, "logout without a stored token");
            Err(ApiError::OperationFailed)
        }
        Err(e) => {
            tracing::error!(error = %e, user_id = %user.id, "logout failed");
            Err(ApiError::OperationFailed)
        }
    }
}

/// get_profile
///
/// [Authenticated Route] The caller's own profile with the embedded user view.
#[utoipa::path(
    get,
    path = "/profile",
    responses(
        (status = 200, description = "Own profile", body = ProfileView),
        (status = 404, description = "Profile not found", body = ErrorBody)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_profile(user: AuthUser, State(state): State<AppState>) -> Result<Json<ProfileView>, ApiError> {
    let account = state
        .repo
        .get_account(user.id)
        .await?
        .ok_or(ApiError::NotFound(PROFILE_NOT_FOUND))?;
    let profile = policy::authorize_record(
        &Caller::from(&user),
        Action::ReadProfile,
        state.repo.get_profile(user.id).await?,
        PROFILE_NOT_FOUND,
    )?;
    Ok(Json(ProfileView::new(&account, profile)))
}

/// update_profile
///
/// [Authenticated Route] Partial update; omitted fields keep their value.
#[utoipa::path(
    put,
    path = "/profile",
    request_body = ProfileUpdateRequest,
    responses(
        (status = 200, description = "Profile updated", body = ProfileUpdateResponse),
        (status = 400, description = "Invalid field", body = ErrorBody),
        (status = 404, description = "Profile not found", body = ErrorBody)
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_profile(
    user: AuthUser,
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<ProfileUpdateRequest>,
) -> Result<Json<ProfileUpdateResponse>, ApiError> {
    let account = state
        .repo
        .get_account(user.id)
        .await?
        .ok_or(ApiError::NotFound(PROFILE_NOT_FOUND))?;
    policy::authorize_record(
        &Caller::from(&user),
        Action::UpdateProfile,
        state.repo.get_profile(user.id).await?,
        PROFILE_NOT_FOUND,
    )?;

    let changes = validation::validate_profile_changes(payload)?;
    let profile = state
        .repo
        .update_profile(user.id, changes)
        .await?
        .ok_or(ApiError::NotFound(PROFILE_NOT_FOUND))?;
    tracing::info!(user_id = %user.id, "profile updated");

    Ok(Json(ProfileUpdateResponse {
        profile: ProfileView::new(&account, profile),
        message: "Profile updated successfully".to_string(),
    }))
}
