// handlers/protected/leaves.rs - /api/leaves

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::app::AppState;
use crate::auth::{EmployeePolicy, Policy, TeamLeadPolicy};
use crate::database::models::{LeaveRequest, Notification};
use crate::database::{Repository, UnitOfWork};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, Authorized};

#[derive(Debug, Deserialize)]
pub struct CreateLeaveRequest {
    pub leave_type: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LeaveStatusRequest {
    pub status: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct LeaveQuery {
    /// Team leads may list everyone's requests
    #[serde(default)]
    pub all: bool,
}

/// GET /api/leaves[?all=true]
pub async fn list(
    auth: Authorized<EmployeePolicy>,
    State(state): State<AppState>,
    Query(query): Query<LeaveQuery>,
) -> ApiResult<Vec<LeaveRequest>> {
    let leaves = state.ctx.leave_requests();
    let records = if query.all {
        if !Policy::TeamLead.admits(auth.role) {
            return Err(ApiError::forbidden("Listing all leave requests requires TeamLeadPolicy"));
        }
        leaves.all().await?
    } else {
        leaves.find_by("user_id", auth.user_id).await?
    };
    Ok(ApiResponse::success(records))
}

/// POST /api/leaves - always filed for the caller, status starts Pending
pub async fn create(
    auth: Authorized<EmployeePolicy>,
    State(state): State<AppState>,
    Json(body): Json<CreateLeaveRequest>,
) -> ApiResult<LeaveRequest> {
    if body.end_date < body.start_date {
        return Err(ApiError::invalid_field("end_date", "must not be before start_date"));
    }

    let mut leave = LeaveRequest::new(Some(auth.user_id), body.leave_type, body.start_date, body.end_date);
    leave.reason = body.reason;

    let leave = Repository::<LeaveRequest>::new(state.ctx).create(leave).await?;
    Ok(ApiResponse::created(leave))
}

/// PATCH /api/leaves/:id/status - status change and owner notification commit together
pub async fn set_status(
    _auth: Authorized<TeamLeadPolicy>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<LeaveStatusRequest>,
) -> ApiResult<LeaveRequest> {
    if !LeaveRequest::is_valid_status(&body.status) {
        return Err(ApiError::invalid_field("status", "must be Pending, Approved or Rejected"));
    }

    let mut leave = Repository::<LeaveRequest>::new(state.ctx.clone()).get(id).await?;
    leave.status = body.status;

    let mut uow = UnitOfWork::new();
    if let Some(owner) = leave.user_id {
        uow.add(Notification::new(
            Some(owner),
            "Leave request updated",
            format!(
                "Your {} leave from {} to {} is now {}",
                leave.leave_type, leave.start_date, leave.end_date, leave.status
            ),
        ));
    }
    uow.update(leave.clone());
    uow.commit(&state.ctx).await?;

    Ok(ApiResponse::success(leave))
}
