// handlers/protected/activities.rs - /api/activities

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::app::AppState;
use crate::auth::{EmployeePolicy, TeamLeadPolicy};
use crate::database::models::ActivityLog;
use crate::database::Repository;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, Authorized};

#[derive(Debug, Deserialize)]
pub struct ActivityRequest {
    pub activity_type: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub application: Option<String>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ended_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UserFilter {
    pub user_id: Option<Uuid>,
}

/// GET /api/activities[?user_id=]
pub async fn list(
    _auth: Authorized<TeamLeadPolicy>,
    State(state): State<AppState>,
    Query(filter): Query<UserFilter>,
) -> ApiResult<Vec<ActivityLog>> {
    let logs = state.ctx.activity_logs();
    let records = match filter.user_id {
        Some(user_id) => logs.find_by("user_id", user_id).await?,
        None => logs.all().await?,
    };
    Ok(ApiResponse::success(records))
}

/// POST /api/activities - recorded against the caller
pub async fn create(
    auth: Authorized<EmployeePolicy>,
    State(state): State<AppState>,
    Json(body): Json<ActivityRequest>,
) -> ApiResult<ActivityLog> {
    let mut log = ActivityLog::new(Some(auth.user_id), body.activity_type);
    log.description = body.description;
    log.application = body.application;
    if let Some(started_at) = body.started_at {
        log.started_at = started_at;
    }
    if let Some(ended_at) = body.ended_at {
        if ended_at < log.started_at {
            return Err(ApiError::invalid_field("ended_at", "must not be before started_at"));
        }
        log.ended_at = Some(ended_at);
    }

    let log = Repository::<ActivityLog>::new(state.ctx).create(log).await?;
    Ok(ApiResponse::created(log))
}
