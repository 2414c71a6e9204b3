//! Domain records, one module per table.
//!
//! Every record carries a static column list (used for DDL and column
//! validation) and an [`EntityModel`](crate::database::entity::EntityModel)
//! impl that maps it to and from a SQLite row.

pub mod activity_log;
pub mod app_settings;
pub mod branch;
pub mod holiday;
pub mod leave_request;
pub mod notification;
pub mod project;
pub mod project_member;
pub mod screenshot;
pub mod task;
pub mod user;
pub mod user_task;

pub use activity_log::ActivityLog;
pub use app_settings::{AppSettings, SETTINGS_ID};
pub use branch::Branch;
pub use holiday::Holiday;
pub use leave_request::LeaveRequest;
pub use notification::Notification;
pub use project::Project;
pub use project_member::ProjectMember;
pub use screenshot::Screenshot;
pub use task::Task;
pub use user::User;
pub use user_task::UserTask;

use uuid::Uuid;

pub(crate) fn new_id() -> Uuid {
    Uuid::new_v4()
}

pub(crate) fn default_true() -> bool {
    true
}
