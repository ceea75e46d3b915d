//! Authentication routes for signup, login, and the current user.
//!
//! The access token travels in the `Authorization` response header; the
//! mobile client stores the header value and replays it on every request.

use axum::http::{StatusCode, header};
use axum::{Json, Router, extract::State, routing::get, routing::post};
use chrono::Utc;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthUser;
use crate::AppState;
use centavo_core::auth::{hash_password, verify_password};
use centavo_db::UserRepository;
use centavo_db::entities::users;
use centavo_shared::AppError;
use centavo_shared::auth::{LoginRequest, SignupRequest, UserInfo};

/// Creates the public auth router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/signup", post(signup))
}

/// Creates the auth routes that require a valid token.
pub fn protected_routes() -> Router<AppState> {
    Router::new().route("/auth/me", get(me))
}

/// POST /auth/login - Authenticate and return the user with a token header.
async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<([(header::HeaderName, String); 1], Json<UserInfo>)> {
    let user_repo = UserRepository::new((*state.db).clone());

    let Some(user) = user_repo.find_by_email(&payload.email).await? else {
        info!(email = %payload.email, "Login attempt for non-existent user");
        return Err(invalid_credentials());
    };

    let password_matches = verify_password(&payload.password, &user.password_hash)
        .map_err(|e| ApiError(AppError::Internal(e.to_string())))?;
    if !password_matches {
        info!(user_id = %user.id, "Failed login attempt - invalid password");
        return Err(invalid_credentials());
    }

    let token = state
        .jwt_service
        .generate_access_token(user.id, &user.email)
        .map_err(|e| ApiError(AppError::Internal(e.to_string())))?;

    info!(user_id = %user.id, "User logged in");

    Ok((
        [(header::AUTHORIZATION, format!("Bearer {token}"))],
        Json(user_info(user)),
    ))
}

/// POST /auth/signup - Register a new account.
async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> ApiResult<(
    StatusCode,
    [(header::HeaderName, String); 1],
    Json<UserInfo>,
)> {
    validate_signup(&payload)?;

    let user_repo = UserRepository::new((*state.db).clone());

    let password_hash = hash_password(&payload.password)
        .map_err(|e| ApiError(AppError::Internal(e.to_string())))?;
    let user = user_repo
        .create(&payload.email, &password_hash, &payload.name)
        .await?;

    let token = state
        .jwt_service
        .generate_access_token(user.id, &user.email)
        .map_err(|e| ApiError(AppError::Internal(e.to_string())))?;

    info!(user_id = %user.id, "User registered");

    Ok((
        StatusCode::CREATED,
        [(header::AUTHORIZATION, format!("Bearer {token}"))],
        Json(user_info(user)),
    ))
}

/// GET /auth/me - The authenticated user.
async fn me(State(state): State<AppState>, auth: AuthUser) -> ApiResult<Json<UserInfo>> {
    let user_repo = UserRepository::new((*state.db).clone());

    let user = user_repo
        .find_by_id(auth.user_id())
        .await?
        // A valid token for a deleted account: force the client to drop
        // its cached credential.
        .ok_or_else(|| ApiError(AppError::Unauthorized("Account no longer exists".into())))?;

    Ok(Json(user_info(user)))
}

fn user_info(user: users::Model) -> UserInfo {
    UserInfo {
        id: user.id,
        email: user.email,
        name: user.name,
        created_at: user.created_at.with_timezone(&Utc),
    }
}

fn invalid_credentials() -> ApiError {
    ApiError(AppError::Unauthorized(
        "Invalid email or password".to_string(),
    ))
}

fn validate_signup(payload: &SignupRequest) -> Result<(), ApiError> {
    if !payload.email.contains('@') {
        return Err(ApiError(AppError::Validation(
            "A valid email address is required".to_string(),
        )));
    }
    if payload.password.len() < 8 {
        return Err(ApiError(AppError::Validation(
            "Password must be at least 8 characters".to_string(),
        )));
    }
    if payload.name.trim().is_empty() {
        return Err(ApiError(AppError::Validation(
            "Name must not be empty".to_string(),
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(email: &str, password: &str, name: &str) -> SignupRequest {
        SignupRequest {
            email: email.to_string(),
            password: password.to_string(),
            name: name.to_string(),
        }
    }

    #[test]
    fn test_signup_validation() {
        assert!(validate_signup(&payload("maria@example.com", "long-enough", "Maria")).is_ok());
        assert!(validate_signup(&payload("not-an-email", "long-enough", "Maria")).is_err());
        assert!(validate_signup(&payload("maria@example.com", "short", "Maria")).is_err());
        assert!(validate_signup(&payload("maria@example.com", "long-enough", "  ")).is_err());
    }
}
