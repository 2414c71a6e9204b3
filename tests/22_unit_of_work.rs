mod common;

use anyhow::Result;

use employee_monitoring_api::auth::Role;
use employee_monitoring_api::database::models::{Branch, Notification, Screenshot, User};
use employee_monitoring_api::database::{DatabaseError, EntityKey, EntityModel, Repository, UnitOfWork};

#[tokio::test]
async fn commit_is_all_or_nothing() -> Result<()> {
    let ctx = common::context().await?;
    let head = Repository::<User>::new(ctx.clone())
        .create(User::new("Head", "head@example.com", Role::Admin))
        .await?;
    Repository::<Branch>::new(ctx.clone())
        .create(Branch::new("Kandy", Some(head.id)))
        .await?;

    let mut uow = UnitOfWork::new();
    uow.add(Screenshot::new(Some(head.id), "screenshots/x.png", "ab", 2))
        .remove(EntityKey::of::<User>(head.id));
    let err = uow.commit(&ctx).await.expect_err("branch head must block the delete");
    assert!(matches!(err, DatabaseError::ConstraintViolation { .. }));

    // Neither change landed.
    assert_eq!(ctx.screenshots().count().await?, 0);
    assert!(ctx.users().find(head.id).await?.is_some());
    Ok(())
}

#[tokio::test]
async fn later_changes_see_earlier_ones() -> Result<()> {
    let ctx = common::context().await?;
    let user = User::new("New", "new@example.com", Role::Employee);
    let note = Notification::new(Some(user.id), "Welcome", "Glad to have you");

    let mut uow = UnitOfWork::new();
    uow.add(user.clone()).add(note.clone());
    let summary = uow.commit(&ctx).await?;

    assert_eq!(summary.inserted, 2);
    assert_eq!(summary.total(), 2);
    let stored = ctx.notifications().find(note.id).await?.expect("notification was inserted");
    assert_eq!(stored.user_id, Some(user.id));
    assert!(!stored.is_read);
    Ok(())
}

#[tokio::test]
async fn updating_or_removing_a_missing_row_is_not_found() -> Result<()> {
    let ctx = common::context().await?;
    let ghost = User::new("Ghost", "ghost@example.com", Role::Employee);

    let mut uow = UnitOfWork::new();
    uow.update(ghost.clone());
    assert!(matches!(uow.commit(&ctx).await, Err(DatabaseError::NotFound(_))));

    let mut uow = UnitOfWork::new();
    uow.remove(EntityKey::of::<User>(ghost.key()));
    assert!(matches!(uow.commit(&ctx).await, Err(DatabaseError::NotFound(_))));
    Ok(())
}

#[tokio::test]
async fn duplicate_email_is_a_constraint_violation() -> Result<()> {
    let ctx = common::context().await?;
    let repo = Repository::<User>::new(ctx.clone());
    repo.create(User::new("First", "same@example.com", Role::Employee)).await?;

    let err = repo
        .create(User::new("Second", "same@example.com", Role::Employee))
        .await
        .expect_err("email is unique");
    match err {
        DatabaseError::ConstraintViolation { constraint, .. } => assert!(constraint.contains("users.email")),
        other => panic!("unexpected error {:?}", other),
    }
    assert_eq!(repo.count().await?, 1);
    Ok(())
}

#[tokio::test]
async fn empty_unit_of_work_commits_nothing() -> Result<()> {
    let ctx = common::context().await?;
    let summary = UnitOfWork::new().commit(&ctx).await?;
    assert_eq!(summary.total(), 0);
    Ok(())
}
