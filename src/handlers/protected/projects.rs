// handlers/protected/projects.rs - project membership (TeamLeadPolicy)
//
// Plain project CRUD is mounted from crud.rs.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::app::AppState;
use crate::auth::TeamLeadPolicy;
use crate::database::models::{Notification, Project, ProjectMember, User};
use crate::database::{EntityKey, Repository, UnitOfWork};
use crate::middleware::{ApiResponse, ApiResult, Authorized};

#[derive(Debug, Default, Deserialize)]
pub struct AddMemberRequest {
    pub member_role: Option<String>,
}

/// GET /api/projects/:id/members
pub async fn members(
    _auth: Authorized<TeamLeadPolicy>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<ProjectMember>> {
    Repository::<Project>::new(state.ctx.clone()).get(id).await?;
    let members = state.ctx.project_members().find_by("project_id", id).await?;
    Ok(ApiResponse::success(members))
}

/// POST /api/projects/:id/members/:user_id - adds the member and notifies them
pub async fn add_member(
    _auth: Authorized<TeamLeadPolicy>,
    State(state): State<AppState>,
    Path((project_id, user_id)): Path<(Uuid, Uuid)>,
    body: Option<Json<AddMemberRequest>>,
) -> ApiResult<ProjectMember> {
    let project = Repository::<Project>::new(state.ctx.clone()).get(project_id).await?;
    Repository::<User>::new(state.ctx.clone()).get(user_id).await?;

    let mut member = ProjectMember::new(user_id, project_id);
    if let Some(role) = body.and_then(|Json(b)| b.member_role) {
        member.member_role = role;
    }

    let mut uow = UnitOfWork::new();
    uow.add(member.clone()).add(Notification::new(
        Some(user_id),
        "Added to project",
        format!("You were added to project '{}' as {}", project.name, member.member_role),
    ));
    uow.commit(&state.ctx).await?;

    Ok(ApiResponse::created(member))
}

/// DELETE /api/projects/:id/members/:user_id
pub async fn remove_member(
    _auth: Authorized<TeamLeadPolicy>,
    State(state): State<AppState>,
    Path((project_id, user_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<()> {
    let mut uow = UnitOfWork::new();
    uow.remove(EntityKey::of::<ProjectMember>((user_id, project_id)));
    uow.commit(&state.ctx).await?;
    Ok(ApiResponse::no_content())
}
