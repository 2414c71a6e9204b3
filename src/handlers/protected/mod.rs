// handlers/protected/mod.rs - Protected handlers (JWT authentication required)
//
// Every route here sits behind jwt_auth_middleware. Each handler then names
// the policy it needs through the Authorized<P> extractor.

pub mod activities;
pub mod crud;
pub mod leaves;
pub mod me;
pub mod notifications;
pub mod projects;
pub mod screenshots;
pub mod settings;
pub mod tasks;
pub mod users;

pub use me::me;
