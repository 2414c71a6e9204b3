// handlers/protected/me.rs - GET /api/auth/me

use crate::middleware::{ApiResponse, ApiResult, AuthUser};

/// GET /api/auth/me - the caller as the token describes them
pub async fn me(user: AuthUser) -> ApiResult<AuthUser> {
    Ok(ApiResponse::success(user))
}
