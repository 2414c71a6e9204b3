pub mod auth;
pub mod response;

pub use auth::{jwt_auth_middleware, AuthUser, Authorized};
pub use response::{ApiResponse, ApiResult};
