// handlers/protected/tasks.rs - /api/tasks
//
// Plain reads, updates and deletes are mounted from crud.rs.

use axum::{
    extract::{Path, State},
    Json,
};
use std::collections::HashSet;
use uuid::Uuid;

use crate::app::AppState;
use crate::auth::{EmployeePolicy, TeamLeadPolicy};
use crate::database::models::{Notification, Task, User, UserTask};
use crate::database::{EntityKey, Repository, UnitOfWork};
use crate::middleware::{ApiResponse, ApiResult, Authorized};

/// GET /api/tasks/mine - tasks owned by the caller or assigned through user_tasks
pub async fn mine(auth: Authorized<EmployeePolicy>, State(state): State<AppState>) -> ApiResult<Vec<Task>> {
    let tasks = state.ctx.tasks();
    let mut mine = tasks.find_by("assigned_to", auth.user_id).await?;
    let mut seen: HashSet<Uuid> = mine.iter().map(|t| t.id).collect();

    for link in state.ctx.user_tasks().find_by("user_id", auth.user_id).await? {
        if seen.insert(link.task_id) {
            if let Some(task) = tasks.find(link.task_id).await? {
                mine.push(task);
            }
        }
    }

    mine.sort_by(|a, b| a.created_at.cmp(&b.created_at));
    Ok(ApiResponse::success(mine))
}

/// POST /api/tasks - notifies the owner when one is set
pub async fn create(
    _auth: Authorized<TeamLeadPolicy>,
    State(state): State<AppState>,
    Json(task): Json<Task>,
) -> ApiResult<Task> {
    let mut uow = UnitOfWork::new();
    uow.add(task.clone());
    if let Some(owner) = task.assigned_to {
        uow.add(Notification::new(
            Some(owner),
            "New task",
            format!("You have been assigned '{}'", task.title),
        ));
    }
    uow.commit(&state.ctx).await?;
    Ok(ApiResponse::created(task))
}

/// GET /api/tasks/:id/assignees
pub async fn assignees(
    _auth: Authorized<TeamLeadPolicy>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<UserTask>> {
    Repository::<Task>::new(state.ctx.clone()).get(id).await?;
    let links = state.ctx.user_tasks().find_by("task_id", id).await?;
    Ok(ApiResponse::success(links))
}

/// POST /api/tasks/:id/assignees/:user_id
pub async fn assign(
    _auth: Authorized<TeamLeadPolicy>,
    State(state): State<AppState>,
    Path((task_id, user_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<UserTask> {
    let task = Repository::<Task>::new(state.ctx.clone()).get(task_id).await?;
    Repository::<User>::new(state.ctx.clone()).get(user_id).await?;

    let link = UserTask::new(user_id, task_id);
    let mut uow = UnitOfWork::new();
    uow.add(link.clone()).add(Notification::new(
        Some(user_id),
        "Task assigned",
        format!("You have been assigned '{}'", task.title),
    ));
    uow.commit(&state.ctx).await?;

    Ok(ApiResponse::created(link))
}

/// DELETE /api/tasks/:id/assignees/:user_id
pub async fn unassign(
    _auth: Authorized<TeamLeadPolicy>,
    State(state): State<AppState>,
    Path((task_id, user_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<()> {
    let mut uow = UnitOfWork::new();
    uow.remove(EntityKey::of::<UserTask>((user_id, task_id)));
    uow.commit(&state.ctx).await?;
    Ok(ApiResponse::no_content())
}
