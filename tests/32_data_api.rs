mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};
use uuid::Uuid;

use employee_monitoring_api::auth::Role;
use employee_monitoring_api::database::models::{Branch, User};
use employee_monitoring_api::database::Repository;

#[tokio::test]
async fn admin_creates_and_reads_users_with_skills() -> Result<()> {
    let server = common::spawn_server().await?;
    let admin = server.token(Role::Admin).await?;

    let res = server
        .client
        .post(server.url("/api/users"))
        .bearer_auth(&admin)
        .json(&json!({
            "full_name": "Nimal Perera",
            "email": "Nimal@Example.com",
            "password": "long-enough-password",
            "role": "TeamLead",
            "technical_skills": { "rust": "expert", "sql": "intermediate" }
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body = res.json::<Value>().await?;
    let id = body["data"]["id"].as_str().unwrap_or_default().to_string();
    assert_eq!(body["data"]["email"], "nimal@example.com");
    assert!(body["data"].get("password_hash").is_none());

    let res = server
        .client
        .get(server.url(&format!("/api/users/{}", id)))
        .bearer_auth(&admin)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body["data"]["technical_skills"]["rust"], "expert");
    assert_eq!(body["data"]["role"], "TeamLead");
    Ok(())
}

#[tokio::test]
async fn deleting_a_branch_head_is_a_conflict() -> Result<()> {
    let server = common::spawn_server().await?;
    let admin = server.token(Role::Admin).await?;
    let (head, _) = server.user(Role::TeamLead).await?;
    Repository::<Branch>::new(server.ctx.clone())
        .create(Branch::new("Galle", Some(head.id)))
        .await?;

    let res = server
        .client
        .delete(server.url(&format!("/api/users/{}", head.id)))
        .bearer_auth(&admin)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body = res.json::<Value>().await?;
    assert_eq!(body["code"], "CONFLICT");
    assert!(body["message"].as_str().unwrap_or_default().contains("branches.head_user_id -> users"));
    Ok(())
}

#[tokio::test]
async fn missing_records_are_not_found() -> Result<()> {
    let server = common::spawn_server().await?;
    let admin = server.token(Role::Admin).await?;

    for path in ["/api/users", "/api/branches", "/api/projects", "/api/tasks"] {
        let res = server
            .client
            .get(server.url(&format!("{}/{}", path, Uuid::new_v4())))
            .bearer_auth(&admin)
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::NOT_FOUND, "{}", path);
    }

    let res = server
        .client
        .delete(server.url(&format!("/api/tasks/{}/assignees/{}", Uuid::new_v4(), Uuid::new_v4())))
        .bearer_auth(&admin)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn corrupt_skills_column_is_a_bad_request() -> Result<()> {
    let server = common::spawn_server().await?;
    let admin = server.token(Role::Admin).await?;
    let victim = Repository::<User>::new(server.ctx.clone())
        .create(User::new("Broken", "broken@example.com", Role::Employee))
        .await?;

    sqlx::query("UPDATE users SET technical_skills = 'not json' WHERE id = ?")
        .bind(victim.id)
        .execute(server.ctx.pool())
        .await?;

    let res = server
        .client
        .get(server.url(&format!("/api/users/{}", victim.id)))
        .bearer_auth(&admin)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<Value>().await?;
    assert!(body["field_errors"].get("technical_skills").is_some());
    Ok(())
}

#[tokio::test]
async fn task_assignment_notifies_the_assignee() -> Result<()> {
    let server = common::spawn_server().await?;
    let lead = server.token(Role::TeamLead).await?;
    let (worker, worker_token) = server.user(Role::Employee).await?;

    let res = server
        .client
        .post(server.url("/api/tasks"))
        .bearer_auth(&lead)
        .json(&json!({ "title": "Write release notes" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let task_id = res.json::<Value>().await?["data"]["id"].as_str().unwrap_or_default().to_string();

    let res = server
        .client
        .post(server.url(&format!("/api/tasks/{}/assignees/{}", task_id, worker.id)))
        .bearer_auth(&lead)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let mine = server
        .client
        .get(server.url("/api/tasks/mine"))
        .bearer_auth(&worker_token)
        .send()
        .await?
        .json::<Value>()
        .await?;
    assert_eq!(mine["data"].as_array().map(Vec::len), Some(1));
    assert_eq!(mine["data"][0]["title"], "Write release notes");

    let notes = server
        .client
        .get(server.url("/api/notifications"))
        .bearer_auth(&worker_token)
        .send()
        .await?
        .json::<Value>()
        .await?;
    assert_eq!(notes["data"].as_array().map(Vec::len), Some(1));

    // The link now protects the worker from deletion.
    let admin = server.token(Role::Admin).await?;
    let res = server
        .client
        .delete(server.url(&format!("/api/users/{}", worker.id)))
        .bearer_auth(&admin)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    Ok(())
}

#[tokio::test]
async fn task_with_unknown_project_is_a_conflict() -> Result<()> {
    let server = common::spawn_server().await?;
    let lead = server.token(Role::TeamLead).await?;

    let res = server
        .client
        .post(server.url("/api/tasks"))
        .bearer_auth(&lead)
        .json(&json!({ "title": "Orphan", "project_id": Uuid::new_v4() }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    Ok(())
}

#[tokio::test]
async fn leave_approval_flow() -> Result<()> {
    let server = common::spawn_server().await?;
    let lead = server.token(Role::TeamLead).await?;
    let (_, employee) = server.user(Role::Employee).await?;

    let res = server
        .client
        .post(server.url("/api/leaves"))
        .bearer_auth(&employee)
        .json(&json!({ "leave_type": "Annual", "start_date": "2026-12-24", "end_date": "2026-12-20" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = server
        .client
        .post(server.url("/api/leaves"))
        .bearer_auth(&employee)
        .json(&json!({ "leave_type": "Annual", "start_date": "2026-12-24", "end_date": "2026-12-31" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let leave = res.json::<Value>().await?;
    assert_eq!(leave["data"]["status"], "Pending");
    let leave_id = leave["data"]["id"].as_str().unwrap_or_default().to_string();

    let status_url = server.url(&format!("/api/leaves/{}/status", leave_id));
    let res = server
        .client
        .patch(&status_url)
        .bearer_auth(&employee)
        .json(&json!({ "status": "Approved" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = server
        .client
        .patch(&status_url)
        .bearer_auth(&lead)
        .json(&json!({ "status": "Maybe" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = server
        .client
        .patch(&status_url)
        .bearer_auth(&lead)
        .json(&json!({ "status": "Approved" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let notes = server
        .client
        .get(server.url("/api/notifications"))
        .bearer_auth(&employee)
        .send()
        .await?
        .json::<Value>()
        .await?;
    assert_eq!(notes["data"][0]["title"], "Leave request updated");
    Ok(())
}

#[tokio::test]
async fn settings_default_then_persist() -> Result<()> {
    let server = common::spawn_server().await?;
    let admin = server.token(Role::Admin).await?;

    let body = server
        .client
        .get(server.url("/api/settings"))
        .bearer_auth(&admin)
        .send()
        .await?
        .json::<Value>()
        .await?;
    assert_eq!(body["data"]["screenshot_interval_minutes"], 10);

    let res = server
        .client
        .put(server.url("/api/settings"))
        .bearer_auth(&admin)
        .json(&json!({ "screenshot_interval_minutes": 0 }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = server
        .client
        .put(server.url("/api/settings"))
        .bearer_auth(&admin)
        .json(&json!({ "screenshot_interval_minutes": 3 }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(server.ctx.app_settings().count().await?, 1);

    let res = server
        .client
        .put(server.url("/api/settings"))
        .bearer_auth(&admin)
        .json(&json!({ "idle_threshold_minutes": 7 }))
        .send()
        .await?;
    let body = res.json::<Value>().await?;
    assert_eq!(body["data"]["screenshot_interval_minutes"], 3);
    assert_eq!(body["data"]["idle_threshold_minutes"], 7);
    assert_eq!(server.ctx.app_settings().count().await?, 1);
    Ok(())
}

#[tokio::test]
async fn concurrent_first_settings_saves_share_one_row() -> Result<()> {
    let server = common::spawn_server().await?;
    let admin = server.token(Role::Admin).await?;

    let put = |minutes: i64| {
        server
            .client
            .put(server.url("/api/settings"))
            .bearer_auth(&admin)
            .json(&json!({ "screenshot_interval_minutes": minutes }))
            .send()
    };
    let (first, second) = tokio::join!(put(4), put(6));
    assert_eq!(first?.status(), StatusCode::OK);
    assert_eq!(second?.status(), StatusCode::OK);
    assert_eq!(server.ctx.app_settings().count().await?, 1);

    let body = server
        .client
        .get(server.url("/api/settings"))
        .bearer_auth(&admin)
        .send()
        .await?
        .json::<Value>()
        .await?;
    let minutes = body["data"]["screenshot_interval_minutes"].as_i64();
    assert!(minutes == Some(4) || minutes == Some(6));
    Ok(())
}

#[tokio::test]
async fn reassigning_a_task_is_a_conflict_without_a_second_notification() -> Result<()> {
    let server = common::spawn_server().await?;
    let lead = server.token(Role::TeamLead).await?;
    let (worker, worker_token) = server.user(Role::Employee).await?;

    let res = server
        .client
        .post(server.url("/api/tasks"))
        .bearer_auth(&lead)
        .json(&json!({ "title": "Write report" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let task_id = res.json::<Value>().await?["data"]["id"].as_str().unwrap_or_default().to_string();

    let assign = server.url(&format!("/api/tasks/{}/assignees/{}", task_id, worker.id));
    let res = server.client.post(&assign).bearer_auth(&lead).send().await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = server.client.post(&assign).bearer_auth(&lead).send().await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let body = server
        .client
        .get(server.url("/api/notifications"))
        .bearer_auth(&worker_token)
        .send()
        .await?
        .json::<Value>()
        .await?;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));
    assert_eq!(server.ctx.user_tasks().count().await?, 1);
    Ok(())
}

#[tokio::test]
async fn screenshot_upload_stores_file_and_checksum() -> Result<()> {
    let server = common::spawn_server().await?;
    let (user, token) = server.user(Role::Employee).await?;
    let bytes = b"\x89PNG fake image bytes".to_vec();

    let form = reqwest::multipart::Form::new().part(
        "file",
        reqwest::multipart::Part::bytes(bytes.clone()).file_name("capture.png"),
    );
    let res = server
        .client
        .post(server.url("/api/screenshots/upload"))
        .bearer_auth(&token)
        .multipart(form)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body = res.json::<Value>().await?;
    let path = body["data"]["file_path"].as_str().unwrap_or_default().to_string();
    assert!(path.starts_with(&format!("screenshots/{}/", user.id)));
    assert_eq!(body["data"]["size_bytes"], bytes.len());
    assert_eq!(body["data"]["checksum"].as_str().map(str::len), Some(64));

    let stored = tokio::fs::read(server.upload_dir().join(&path)).await?;
    assert_eq!(stored, bytes);

    // Served back through /uploads, to authenticated callers only
    let url = server.url(&format!("/uploads/{}", path));
    let res = server.client.get(&url).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = server.client.get(&url).bearer_auth(&token).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.bytes().await?.to_vec(), bytes);

    let _ = tokio::fs::remove_dir_all(server.upload_dir()).await;
    Ok(())
}

#[tokio::test]
async fn oversized_upload_is_rejected() -> Result<()> {
    let mut config = common::test_config();
    config.api.max_upload_bytes = 1024;
    let server = common::spawn_with(config).await?;
    let token = server.token(Role::Employee).await?;

    let form = reqwest::multipart::Form::new()
        .part("file", reqwest::multipart::Part::bytes(vec![0u8; 4096]).file_name("big.png"));
    let res = server
        .client
        .post(server.url("/api/screenshots/upload"))
        .bearer_auth(&token)
        .multipart(form)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(server.ctx.screenshots().count().await?, 0);
    Ok(())
}
