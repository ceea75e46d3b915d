//! Error responses.
//!
//! Every failure renders as `{"error": <CODE>, "message": <human text>}`
//! with the status code the error taxonomy assigns. Handlers return
//! `Result<_, ApiError>` and use `?`; the conversions below route
//! repository and domain errors through `AppError`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use centavo_db::repositories::transaction::TransactionError;
use centavo_db::repositories::user::UserError;
use centavo_shared::AppError;

/// Wrapper making `AppError` an axum response.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = json!({
            "error": self.0.error_code(),
            "message": self.0.to_string(),
        });
        (status, Json(body)).into_response()
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<TransactionError> for ApiError {
    fn from(err: TransactionError) -> Self {
        Self(err.into())
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        let app = match err {
            UserError::NotFound => AppError::NotFound("User".to_string()),
            UserError::EmailTaken(email) => {
                AppError::Conflict(format!("Email already registered: {email}"))
            }
            UserError::Database(db) => AppError::Database(db.to_string()),
        };
        Self(app)
    }
}

/// Shorthand for handler results.
pub type ApiResult<T> = Result<T, ApiError>;
