use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum_helpers::errors::{ErrorCode, error_response_with_details};
use axum_helpers::AppError;
use thiserror::Error;
use uuid::Uuid;

use crate::validation::ValidationProblem;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("User not found: {0}")]
    NotFound(Uuid),

    #[error("Invalid user id: {0}")]
    InvalidId(String),

    #[error("Path id '{path}' does not match the id supplied in the body")]
    IdentityMismatch {
        path: String,
        body: Option<String>,
    },

    #[error("Validation failed with {} problem(s)", .0.len())]
    Validation(Vec<ValidationProblem>),

    #[error("User with name '{0}' already exists")]
    DuplicateName(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("{0}")]
    WriteFailed(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type UserResult<T> = Result<T, UserError>;

impl UserError {
    /// Store failures on the write paths surface to the client as a generic
    /// 400, never as a 500 carrying driver details. The underlying error is
    /// logged here before it is discarded.
    pub(crate) fn into_write_failure(self, action: &str) -> Self {
        match self {
            UserError::Database(msg) => {
                tracing::error!(error = %msg, "user {} failed at the store", action);
                UserError::WriteFailed(format!("Failed to {} user.", action))
            }
            other => other,
        }
    }
}

/// Convert UserError to AppError for standardized error responses
impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound(id) => AppError::NotFound(format!("User {} not found", id)),
            UserError::InvalidId(id) => AppError::BadRequest(format!("Invalid user id: {}", id)),
            UserError::IdentityMismatch { path, body } => AppError::BadRequest(format!(
                "{} and {} are not the same.",
                path,
                body.as_deref().unwrap_or("<missing>")
            )),
            UserError::Validation(_) => {
                AppError::UnprocessableEntity(ErrorCode::ValidationError.default_message().to_string())
            }
            UserError::DuplicateName(name) => {
                AppError::Conflict(format!("User with name '{}' already exists", name))
            }
            UserError::Database(msg) => {
                // Underlying error is logged, never shown to the caller
                tracing::error!(error = %msg, "store operation failed");
                AppError::InternalServerError("Internal Server Error".to_string())
            }
            UserError::WriteFailed(msg) => AppError::BadRequest(msg),
            UserError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        match self {
            // Validation failures carry the complete problem list so that
            // callers see every defect at once
            UserError::Validation(problems) => {
                tracing::info!(problem_count = problems.len(), "request failed validation");
                error_response_with_details(
                    StatusCode::UNPROCESSABLE_ENTITY,
                    ErrorCode::ValidationError.default_message().to_string(),
                    ErrorCode::ValidationError,
                    serde_json::json!(problems),
                )
            }
            // A unique-index hit is reported in the same shape as the
            // validator's own uniqueness problem
            UserError::DuplicateName(name) => {
                tracing::info!(name = %name, "duplicate user name rejected by the store");
                error_response_with_details(
                    StatusCode::UNPROCESSABLE_ENTITY,
                    ErrorCode::ValidationError.default_message().to_string(),
                    ErrorCode::ValidationError,
                    serde_json::json!([ValidationProblem::for_field(
                        "name",
                        "That name is already taken. The name must be unique.",
                    )]),
                )
            }
            other => {
                let app_error: AppError = other.into();
                app_error.into_response()
            }
        }
    }
}

impl From<mongodb::error::Error> for UserError {
    fn from(err: mongodb::error::Error) -> Self {
        UserError::Database(err.to_string())
    }
}
