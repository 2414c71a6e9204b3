// handlers/protected/settings.rs - /api/settings (AdminPolicy)

use axum::{extract::State, Json};
use chrono::{NaiveTime, Utc};
use serde::Deserialize;

use crate::app::AppState;
use crate::auth::AdminPolicy;
use crate::database::models::{AppSettings, SETTINGS_ID};
use crate::database::{AppDbContext, DatabaseError, UnitOfWork};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, Authorized};

#[derive(Debug, Default, Deserialize)]
pub struct SettingsUpdate {
    pub screenshot_interval_minutes: Option<i64>,
    pub idle_threshold_minutes: Option<i64>,
    pub work_day_start: Option<NaiveTime>,
    pub work_day_end: Option<NaiveTime>,
}

/// The saved settings row, if an admin has saved one.
pub async fn current(ctx: &AppDbContext) -> Result<Option<AppSettings>, DatabaseError> {
    ctx.app_settings().find(SETTINGS_ID).await
}

/// GET /api/settings - defaults until an admin saves something
pub async fn show(_auth: Authorized<AdminPolicy>, State(state): State<AppState>) -> ApiResult<AppSettings> {
    let settings = current(&state.ctx).await?.unwrap_or_default();
    Ok(ApiResponse::success(settings))
}

/// PUT /api/settings
pub async fn update(
    _auth: Authorized<AdminPolicy>,
    State(state): State<AppState>,
    Json(body): Json<SettingsUpdate>,
) -> ApiResult<AppSettings> {
    let stored = current(&state.ctx).await?;
    let exists = stored.is_some();
    let mut settings = stored.unwrap_or_default();

    if let Some(v) = body.screenshot_interval_minutes {
        settings.screenshot_interval_minutes = v;
    }
    if let Some(v) = body.idle_threshold_minutes {
        settings.idle_threshold_minutes = v;
    }
    if let Some(v) = body.work_day_start {
        settings.work_day_start = v;
    }
    if let Some(v) = body.work_day_end {
        settings.work_day_end = v;
    }
    validate(&settings)?;
    settings.updated_at = Utc::now();

    settings.id = SETTINGS_ID;

    let mut uow = UnitOfWork::new();
    if exists {
        uow.update(settings.clone());
    } else {
        uow.add(settings.clone());
    }
    match uow.commit(&state.ctx).await {
        Ok(_) => {}
        // Another first save inserted the row in the meantime; write over it
        Err(DatabaseError::ConstraintViolation { .. }) if !exists => {
            let mut uow = UnitOfWork::new();
            uow.update(settings.clone());
            uow.commit(&state.ctx).await?;
        }
        Err(err) => return Err(err.into()),
    }

    Ok(ApiResponse::success(settings))
}

fn validate(settings: &AppSettings) -> Result<(), ApiError> {
    if settings.screenshot_interval_minutes <= 0 {
        return Err(ApiError::invalid_field("screenshot_interval_minutes", "must be positive"));
    }
    if settings.idle_threshold_minutes <= 0 {
        return Err(ApiError::invalid_field("idle_threshold_minutes", "must be positive"));
    }
    if settings.work_day_start >= settings.work_day_end {
        return Err(ApiError::invalid_field("work_day_end", "must be after work_day_start"));
    }
    Ok(())
}
