mod common;

use anyhow::Result;
use chrono::NaiveDate;

use employee_monitoring_api::auth::Role;
use employee_monitoring_api::database::models::{
    ActivityLog, Branch, LeaveRequest, Notification, Project, ProjectMember, Screenshot, Task, User, UserTask,
};
use employee_monitoring_api::database::{
    AppDbContext, DatabaseError, EntityKey, EntityModel, Repository, UnitOfWork,
};

async fn insert<T: EntityModel + Clone>(ctx: &AppDbContext, record: T) -> Result<T> {
    Ok(Repository::<T>::new(ctx.clone()).create(record).await?)
}

async fn delete<T: EntityModel>(ctx: &AppDbContext, record: &T) -> Result<(), DatabaseError> {
    let mut uow = UnitOfWork::new();
    uow.remove(EntityKey::of::<T>(record.key()));
    uow.commit(ctx).await.map(|_| ())
}

fn expect_blocked_by(result: Result<(), DatabaseError>, relationship: &str) {
    match result {
        Err(DatabaseError::ConstraintViolation { constraint, .. }) => assert_eq!(constraint, relationship),
        other => panic!("expected {} to block the delete, got {:?}", relationship, other),
    }
}

#[tokio::test]
async fn branch_head_restricts_user_delete() -> Result<()> {
    let ctx = common::context().await?;
    let head = insert(&ctx, User::new("Head", "head@example.com", Role::TeamLead)).await?;
    let branch = insert(&ctx, Branch::new("Colombo", Some(head.id))).await?;

    expect_blocked_by(delete(&ctx, &head).await, "branches.head_user_id -> users");
    assert!(ctx.users().find(head.id).await?.is_some());

    // Once the branch lets go, the user can go.
    delete(&ctx, &branch).await?;
    delete(&ctx, &head).await?;
    assert!(ctx.users().find(head.id).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn user_task_link_restricts_user_but_cascades_with_task() -> Result<()> {
    let ctx = common::context().await?;
    let worker = insert(&ctx, User::new("Worker", "worker@example.com", Role::Employee)).await?;
    let task = insert(&ctx, Task::new("Ship it", None, None)).await?;
    let link = insert(&ctx, UserTask::new(worker.id, task.id)).await?;

    expect_blocked_by(delete(&ctx, &worker).await, "user_tasks.user_id -> users");

    delete(&ctx, &task).await?;
    assert!(ctx.user_tasks().find(link.key()).await?.is_none());
    assert!(ctx.users().find(worker.id).await?.is_some());

    delete(&ctx, &worker).await?;
    Ok(())
}

#[tokio::test]
async fn user_delete_cascades_to_owned_rows() -> Result<()> {
    let ctx = common::context().await?;
    let user = insert(&ctx, User::new("Leaver", "leaver@example.com", Role::Employee)).await?;
    let other = insert(&ctx, User::new("Stayer", "stayer@example.com", Role::Employee)).await?;
    let day = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap_or_default();

    insert(&ctx, Screenshot::new(Some(user.id), "screenshots/a.png", "00", 1)).await?;
    insert(&ctx, ActivityLog::new(Some(user.id), "Active")).await?;
    insert(&ctx, LeaveRequest::new(Some(user.id), "Annual", day, day)).await?;
    insert(&ctx, Notification::new(Some(user.id), "Hello", "World")).await?;
    let task = insert(&ctx, Task::new("Owned", None, Some(user.id))).await?;
    // Another user's link on the cascaded task goes with it.
    insert(&ctx, UserTask::new(other.id, task.id)).await?;
    let project = insert(&ctx, Project::new("Apollo")).await?;
    insert(&ctx, ProjectMember::new(user.id, project.id)).await?;
    insert(&ctx, Notification::new(Some(other.id), "Unrelated", "Keep me")).await?;

    delete(&ctx, &user).await?;

    assert!(ctx.screenshots().find_by("user_id", user.id).await?.is_empty());
    assert!(ctx.activity_logs().find_by("user_id", user.id).await?.is_empty());
    assert!(ctx.leave_requests().find_by("user_id", user.id).await?.is_empty());
    assert!(ctx.notifications().find_by("user_id", user.id).await?.is_empty());
    assert!(ctx.tasks().find(task.id).await?.is_none());
    assert_eq!(ctx.user_tasks().count().await?, 0);
    assert_eq!(ctx.project_members().count().await?, 0);

    assert!(ctx.projects().find(project.id).await?.is_some());
    assert_eq!(ctx.notifications().find_by("user_id", other.id).await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn project_delete_cascades_tasks_but_keeps_assignees() -> Result<()> {
    let ctx = common::context().await?;
    let lead = insert(&ctx, User::new("Lead", "lead@example.com", Role::TeamLead)).await?;
    let project = insert(&ctx, Project::new("Gemini")).await?;
    let first = insert(&ctx, Task::new("One", Some(project.id), Some(lead.id))).await?;
    insert(&ctx, Task::new("Two", Some(project.id), None)).await?;
    insert(&ctx, UserTask::new(lead.id, first.id)).await?;
    let loose = insert(&ctx, Task::new("No project", None, None)).await?;

    delete(&ctx, &project).await?;

    assert!(ctx.tasks().find_by("project_id", project.id).await?.is_empty());
    assert_eq!(ctx.user_tasks().count().await?, 0);
    assert!(ctx.tasks().find(loose.id).await?.is_some());
    assert!(ctx.users().find(lead.id).await?.is_some());
    Ok(())
}

#[tokio::test]
async fn restrict_wins_over_sibling_cascades() -> Result<()> {
    let ctx = common::context().await?;
    let user = insert(&ctx, User::new("Owner", "owner@example.com", Role::Employee)).await?;
    let project = insert(&ctx, Project::new("Mercury")).await?;
    insert(&ctx, ProjectMember::new(user.id, project.id)).await?;
    let task = insert(&ctx, Task::new("Linked", Some(project.id), None)).await?;
    insert(&ctx, UserTask::new(user.id, task.id)).await?;

    // project_members would cascade, user_tasks restricts.
    expect_blocked_by(delete(&ctx, &user).await, "user_tasks.user_id -> users");
    assert_eq!(ctx.project_members().count().await?, 1);
    Ok(())
}

#[tokio::test]
async fn dangling_references_are_rejected_on_insert_and_update() -> Result<()> {
    let ctx = common::context().await?;
    let ghost = uuid::Uuid::new_v4();

    let err = Repository::<Task>::new(ctx.clone())
        .create(Task::new("Orphan", Some(ghost), None))
        .await
        .expect_err("unknown project must be rejected");
    match err {
        DatabaseError::ConstraintViolation { constraint, .. } => assert_eq!(constraint, "tasks.project_id -> projects"),
        other => panic!("unexpected error {:?}", other),
    }

    let mut task = insert(&ctx, Task::new("Real", None, None)).await?;
    task.assigned_to = Some(ghost);
    let err = Repository::<Task>::new(ctx.clone())
        .update(task)
        .await
        .expect_err("unknown assignee must be rejected");
    assert!(matches!(err, DatabaseError::ConstraintViolation { .. }));
    Ok(())
}

fn expect_duplicate(result: Result<impl std::fmt::Debug>, constraint_name: &str) {
    match result.map_err(|e| e.downcast::<DatabaseError>()) {
        Err(Ok(DatabaseError::ConstraintViolation { constraint, .. })) => assert_eq!(constraint, constraint_name),
        other => panic!("expected {} to reject the insert, got {:?}", constraint_name, other),
    }
}

#[tokio::test]
async fn duplicate_links_violate_their_composite_keys() -> Result<()> {
    let ctx = common::context().await?;
    let worker = insert(&ctx, User::new("Worker", "dup@example.com", Role::Employee)).await?;
    let task = insert(&ctx, Task::new("Once only", None, None)).await?;
    let project = insert(&ctx, Project::new("Gemini")).await?;

    insert(&ctx, UserTask::new(worker.id, task.id)).await?;
    expect_duplicate(
        insert(&ctx, UserTask::new(worker.id, task.id)).await,
        "unique(user_tasks.user_id, user_tasks.task_id)",
    );

    insert(&ctx, ProjectMember::new(worker.id, project.id)).await?;
    expect_duplicate(
        insert(&ctx, ProjectMember::new(worker.id, project.id)).await,
        "unique(project_members.user_id, project_members.project_id)",
    );

    assert_eq!(ctx.user_tasks().count().await?, 1);
    assert_eq!(ctx.project_members().count().await?, 1);
    Ok(())
}
