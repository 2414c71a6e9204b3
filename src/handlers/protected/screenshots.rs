// handlers/protected/screenshots.rs - /api/screenshots
//
// Image bytes are written under `<upload_dir>/screenshots/<user_id>/` and
// served back from /uploads. The row keeps the relative path, a SHA-256
// checksum and the size.

use axum::{
    body::Bytes,
    extract::{multipart::MultipartError, Multipart, Query, State},
};
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::path::Path as FsPath;
use tracing::{info, warn};
use uuid::Uuid;

use crate::app::AppState;
use crate::auth::{EmployeePolicy, TeamLeadPolicy};
use crate::database::models::Screenshot;
use crate::database::Repository;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, Authorized};

use super::activities::UserFilter;

const DEFAULT_EXTENSION: &str = "png";

fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == axum::http::StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::payload_too_large(err.body_text())
    } else {
        ApiError::bad_request(err.body_text())
    }
}

/// Extension from the client's file name, when it looks like one.
fn extension(file_name: Option<&str>) -> String {
    file_name
        .and_then(|name| FsPath::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
}

pub fn checksum(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}

/// GET /api/screenshots[?user_id=]
pub async fn list(
    _auth: Authorized<TeamLeadPolicy>,
    State(state): State<AppState>,
    Query(filter): Query<UserFilter>,
) -> ApiResult<Vec<Screenshot>> {
    let screenshots = state.ctx.screenshots();
    let mut records = match filter.user_id {
        Some(user_id) => screenshots.find_by("user_id", user_id).await?,
        None => screenshots.all().await?,
    };
    records.sort_by(|a, b| b.captured_at.cmp(&a.captured_at));
    Ok(ApiResponse::success(records))
}

/// POST /api/screenshots/upload - multipart with a `file` part and an optional
/// `captured_at` (RFC 3339)
pub async fn upload(
    auth: Authorized<EmployeePolicy>,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Screenshot> {
    let mut file: Option<(Bytes, String)> = None;
    let mut captured_at: Option<DateTime<Utc>> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let ext = extension(field.file_name());
                let data = field.bytes().await.map_err(multipart_error)?;
                file = Some((data, ext));
            }
            "captured_at" => {
                let text = field.text().await.map_err(multipart_error)?;
                let parsed = DateTime::parse_from_rfc3339(text.trim())
                    .map_err(|_| ApiError::invalid_field("captured_at", "expected an RFC 3339 timestamp"))?;
                captured_at = Some(parsed.with_timezone(&Utc));
            }
            _ => {}
        }
    }

    let (data, ext) = file.ok_or_else(|| ApiError::invalid_field("file", "a file part is required"))?;
    if data.is_empty() {
        return Err(ApiError::invalid_field("file", "file is empty"));
    }

    let id = Uuid::new_v4();
    let relative = format!("screenshots/{}/{}.{}", auth.user_id, id, ext);
    let absolute = FsPath::new(&state.config.api.upload_dir).join(&relative);

    if let Some(dir) = absolute.parent() {
        tokio::fs::create_dir_all(dir).await.map_err(|e| {
            ApiError::internal_server_error(format!("Failed to prepare upload directory: {}", e))
        })?;
    }
    tokio::fs::write(&absolute, &data)
        .await
        .map_err(|e| ApiError::internal_server_error(format!("Failed to store screenshot: {}", e)))?;

    let mut screenshot = Screenshot::new(Some(auth.user_id), relative, checksum(&data), data.len() as i64);
    screenshot.id = id;
    if let Some(captured_at) = captured_at {
        screenshot.captured_at = captured_at;
    }

    match Repository::<Screenshot>::new(state.ctx).create(screenshot).await {
        Ok(screenshot) => {
            info!("Stored screenshot {} ({} bytes) for {}", screenshot.id, screenshot.size_bytes, auth.email);
            Ok(ApiResponse::created(screenshot))
        }
        Err(e) => {
            if let Err(rm) = tokio::fs::remove_file(&absolute).await {
                warn!("Failed to remove orphaned upload {}: {}", absolute.display(), rm);
            }
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_is_hex_sha256() {
        assert_eq!(
            checksum(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn extension_falls_back_to_png() {
        assert_eq!(extension(Some("shot.JPG")), "jpg");
        assert_eq!(extension(Some("shot")), "png");
        assert_eq!(extension(Some("../../etc/passwd.s h")), "png");
        assert_eq!(extension(None), "png");
    }
}
