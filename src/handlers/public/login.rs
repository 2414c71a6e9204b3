// handlers/public/login.rs - POST /api/auth/login

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::app::AppState;
use crate::auth::verify_password;
use crate::database::models::User;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
    pub user: User,
}

/// POST /api/auth/login - exchange email and password for a bearer token
///
/// Unknown email, wrong password and deactivated accounts all answer with the
/// same 401.
pub async fn login(State(state): State<AppState>, Json(body): Json<LoginRequest>) -> ApiResult<LoginResponse> {
    let invalid = || ApiError::unauthorized("Invalid email or password");

    let email = body.email.trim().to_lowercase();
    let user = state
        .ctx
        .users()
        .find_by("email", email.as_str())
        .await?
        .into_iter()
        .next()
        .ok_or_else(invalid)?;

    if !user.is_active || !verify_password(&body.password, &user.password_hash)? {
        return Err(invalid());
    }

    let token = state.jwt.issue(user.id, &user.email, user.role)?;
    info!("User {} logged in as {}", user.email, user.role);

    Ok(ApiResponse::success(LoginResponse {
        token,
        token_type: "Bearer",
        expires_in: state.jwt.expires_in_secs(),
        user,
    }))
}
