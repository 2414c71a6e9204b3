// handlers/protected/notifications.rs - /api/notifications

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::app::AppState;
use crate::auth::{EmployeePolicy, TeamLeadPolicy};
use crate::database::models::Notification;
use crate::database::{EntityKey, Repository};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, Authorized};

#[derive(Debug, Deserialize)]
pub struct CreateNotificationRequest {
    pub user_id: Uuid,
    pub title: String,
    pub message: String,
}

/// GET /api/notifications - the caller's own, newest first
pub async fn list(auth: Authorized<EmployeePolicy>, State(state): State<AppState>) -> ApiResult<Vec<Notification>> {
    let mut records = state.ctx.notifications().find_by("user_id", auth.user_id).await?;
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(ApiResponse::success(records))
}

/// POST /api/notifications
pub async fn create(
    _auth: Authorized<TeamLeadPolicy>,
    State(state): State<AppState>,
    Json(body): Json<CreateNotificationRequest>,
) -> ApiResult<Notification> {
    let notification = Notification::new(Some(body.user_id), body.title, body.message);
    let notification = Repository::<Notification>::new(state.ctx).create(notification).await?;
    Ok(ApiResponse::created(notification))
}

/// PATCH /api/notifications/:id/read
///
/// Someone else's notification answers 404, same as a missing one.
pub async fn mark_read(
    auth: Authorized<EmployeePolicy>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Notification> {
    let repo = Repository::<Notification>::new(state.ctx);
    let mut notification = match repo.find(id).await? {
        Some(n) if n.user_id == Some(auth.user_id) => n,
        _ => {
            return Err(ApiError::not_found(format!(
                "Not found: {}",
                EntityKey::of::<Notification>(id)
            )))
        }
    };

    notification.is_read = true;
    let notification = repo.update(notification).await?;
    Ok(ApiResponse::success(notification))
}
