use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Path, Request, rejection::JsonRejection},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

use crate::{repository::RepoError, validation::ValidationErrors};

pub const SOMETHING_WENT_WRONG: &str = "Something went wrong";
pub const NOT_FOUND: &str = "Not found.";

/// ErrorBody
///
/// The single error shape returned by every endpoint: `{"error": "..."}`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ErrorBody {
    pub error: String,
}

/// ApiError
///
/// Every failure a handler can produce. Internal details are logged where the error is
/// created and never rendered into the response body.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Bad, missing or malformed field(s).
    #[error("{0}")]
    Validation(ValidationErrors),
    /// Uniqueness violation reported by the store.
    #[error("{0}")]
    Conflict(ValidationErrors),
    /// Bad or missing token, or a disabled account.
    #[error("{0}")]
    Auth(String),
    /// Authenticated but lacking staff rights (admin surface only).
    #[error("You do not have permission to perform this action.")]
    Forbidden,
    /// Absent, or owned by someone else. The two cases are indistinguishable on purpose.
    #[error("{0}")]
    NotFound(&'static str),
    /// An expected operation failed; the cause is not disclosed.
    #[error("Something went wrong")]
    OperationFailed,
    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::Conflict(_) | ApiError::OperationFailed => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Auth(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::Validation(errors)
    }
}

impl From<RepoError> for ApiError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Conflict { field } => ApiError::Conflict(ValidationErrors::single(
                field,
                format!("An account with this {field} already exists."),
            )),
            RepoError::Database(e) => {
                tracing::error!(error = ?e, "repository failure");
                ApiError::Internal
            }
        }
    }
}

/// ApiJson
///
/// Drop-in replacement for `axum::Json` whose rejection is an [`ApiError`], so malformed
/// bodies produce the same `{"error": "..."}` shape as every other failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => {
                tracing::debug!(error = %rejection.body_text(), "rejected request body");
                Err(ApiError::Validation(ValidationErrors::single(
                    "body",
                    rejection.body_text(),
                )))
            }
        }
    }
}

/// ApiPath
///
/// `axum::extract::Path` whose rejection is `NotFound`: an id that cannot be parsed
/// cannot name an existing record.
#[derive(Debug, Clone, Copy)]
pub struct ApiPath<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiPath<T>
where
    T: serde::de::DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(Path(value)) => Ok(ApiPath(value)),
            Err(rejection) => {
                tracing::debug!(error = %rejection.body_text(), "rejected path parameter");
                Err(ApiError::NotFound(NOT_FOUND))
            }
        }
    }
}
