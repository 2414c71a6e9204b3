// handlers/public/system.rs - GET / and GET /health

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::app::AppState;

/// GET / - service description
pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Employee Monitoring API",
            "version": version,
            "endpoints": {
                "auth": "/api/auth/login (public), /api/auth/me",
                "admin": "/api/users, /api/branches, /api/holidays (write), /api/settings",
                "team_lead": "/api/projects, /api/tasks (write), /api/screenshots, /api/activities (read)",
                "employee": "/api/tasks, /api/leaves, /api/notifications, /api/activities, /api/screenshots/upload",
                "files": "/uploads/*"
            }
        }
    }))
}

/// GET /health - liveness plus a database round trip
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.ctx.health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
