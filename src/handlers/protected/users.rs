// handlers/protected/users.rs - /api/users (AdminPolicy)

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::app::AppState;
use crate::auth::{hash_password, AdminPolicy, Role};
use crate::database::models::User;
use crate::database::{Repository, SkillMap};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, Authorized};

const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub full_name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub technical_skills: SkillMap,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
    pub department: Option<String>,
    pub technical_skills: Option<SkillMap>,
    pub is_active: Option<bool>,
}

fn check_password(password: &str) -> Result<(), ApiError> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::invalid_field(
            "password",
            format!("must be at least {} characters", MIN_PASSWORD_LEN),
        ));
    }
    Ok(())
}

fn normalize_email(email: &str) -> Result<String, ApiError> {
    let email = email.trim().to_lowercase();
    if !email.contains('@') {
        return Err(ApiError::invalid_field("email", "not an email address"));
    }
    Ok(email)
}

/// GET /api/users
pub async fn list(_auth: Authorized<AdminPolicy>, State(state): State<AppState>) -> ApiResult<Vec<User>> {
    let users = Repository::<User>::new(state.ctx).list().await?;
    Ok(ApiResponse::success(users))
}

/// GET /api/users/:id
pub async fn show(_auth: Authorized<AdminPolicy>, State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<User> {
    let user = Repository::<User>::new(state.ctx).get(id).await?;
    Ok(ApiResponse::success(user))
}

/// POST /api/users - duplicate email answers 409
pub async fn create(
    auth: Authorized<AdminPolicy>,
    State(state): State<AppState>,
    Json(body): Json<CreateUserRequest>,
) -> ApiResult<User> {
    check_password(&body.password)?;
    let mut user = User::new(body.full_name, normalize_email(&body.email)?, body.role);
    user.department = body.department;
    user.technical_skills = body.technical_skills;
    user.password_hash = hash_password(&body.password)?;

    let user = Repository::<User>::new(state.ctx).create(user).await?;
    info!("{} created user {} ({})", auth.email, user.email, user.role);
    Ok(ApiResponse::created(user))
}

/// PUT /api/users/:id - only the supplied fields change
pub async fn update(
    _auth: Authorized<AdminPolicy>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateUserRequest>,
) -> ApiResult<User> {
    let repo = Repository::<User>::new(state.ctx);
    let mut user = repo.get(id).await?;

    if let Some(full_name) = body.full_name {
        user.full_name = full_name;
    }
    if let Some(email) = body.email {
        user.email = normalize_email(&email)?;
    }
    if let Some(password) = body.password {
        check_password(&password)?;
        user.password_hash = hash_password(&password)?;
    }
    if let Some(role) = body.role {
        user.role = role;
    }
    if body.department.is_some() {
        user.department = body.department;
    }
    if let Some(skills) = body.technical_skills {
        user.technical_skills = skills;
    }
    if let Some(is_active) = body.is_active {
        user.is_active = is_active;
    }

    let user = repo.update(user).await?;
    Ok(ApiResponse::success(user))
}

/// DELETE /api/users/:id
///
/// Refused with 409 while the user heads a branch or holds task assignments.
/// Otherwise their screenshots, activity, leave and notifications go too.
pub async fn delete(
    auth: Authorized<AdminPolicy>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    if id == auth.user_id {
        return Err(ApiError::bad_request("You cannot delete your own account"));
    }
    Repository::<User>::new(state.ctx).delete(id).await?;
    info!("{} deleted user {}", auth.email, id);
    Ok(ApiResponse::no_content())
}
