mod common;

use anyhow::Result;
use chrono::Utc;
use reqwest::StatusCode;
use uuid::Uuid;

use employee_monitoring_api::auth::{Claims, Role};

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let server = common::spawn_server().await?;

    let res = server.client.get(server.url("/health")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["success"], true);
    Ok(())
}

#[tokio::test]
async fn protected_routes_require_a_bearer_token() -> Result<()> {
    let server = common::spawn_server().await?;

    let res = server.client.get(server.url("/api/auth/me")).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = server
        .client
        .get(server.url("/api/auth/me"))
        .header("Authorization", "Token abc")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = server
        .client
        .get(server.url("/api/auth/me"))
        .bearer_auth("not.a.jwt")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["code"], "UNAUTHORIZED");
    Ok(())
}

#[tokio::test]
async fn expired_token_is_rejected() -> Result<()> {
    let server = common::spawn_server().await?;
    let now = Utc::now().timestamp();
    let token = server.jwt.encode(&Claims {
        sub: Uuid::new_v4(),
        email: "late@example.com".to_string(),
        role: Role::Admin,
        iss: server.config.jwt.issuer.clone(),
        aud: server.config.jwt.audience.clone(),
        iat: now - 7200,
        exp: now - 60,
    })?;

    let res = server.client.get(server.url("/api/auth/me")).bearer_auth(token).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn me_reports_the_token_identity() -> Result<()> {
    let server = common::spawn_server().await?;
    let (user, token) = server.user(Role::TeamLead).await?;

    let res = server.client.get(server.url("/api/auth/me")).bearer_auth(&token).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["data"]["user_id"], user.id.to_string());
    assert_eq!(body["data"]["role"], "TeamLead");
    Ok(())
}

#[tokio::test]
async fn admin_policy_admits_only_admins() -> Result<()> {
    let server = common::spawn_server().await?;

    for (role, expected) in [
        (Role::Admin, StatusCode::OK),
        (Role::TeamLead, StatusCode::FORBIDDEN),
        (Role::Employee, StatusCode::FORBIDDEN),
    ] {
        let token = server.token(role).await?;
        let res = server.client.get(server.url("/api/users")).bearer_auth(&token).send().await?;
        assert_eq!(res.status(), expected, "{} on /api/users", role);
    }
    Ok(())
}

#[tokio::test]
async fn team_lead_policy_admits_admins_and_team_leads() -> Result<()> {
    let server = common::spawn_server().await?;

    for (role, expected) in [
        (Role::Admin, StatusCode::OK),
        (Role::TeamLead, StatusCode::OK),
        (Role::Employee, StatusCode::FORBIDDEN),
    ] {
        let token = server.token(role).await?;
        let res = server.client.get(server.url("/api/projects")).bearer_auth(&token).send().await?;
        assert_eq!(res.status(), expected, "{} on /api/projects", role);
    }
    Ok(())
}

#[tokio::test]
async fn employee_policy_admits_every_role() -> Result<()> {
    let server = common::spawn_server().await?;

    for role in Role::ALL {
        let token = server.token(role).await?;
        let res = server.client.get(server.url("/api/tasks/mine")).bearer_auth(&token).send().await?;
        assert_eq!(res.status(), StatusCode::OK, "{} on /api/tasks/mine", role);
    }
    Ok(())
}

#[tokio::test]
async fn one_route_can_mix_policies_across_methods() -> Result<()> {
    let server = common::spawn_server().await?;
    let employee = server.token(Role::Employee).await?;
    let admin = server.token(Role::Admin).await?;

    let res = server.client.get(server.url("/api/holidays")).bearer_auth(&employee).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let holiday = serde_json::json!({ "name": "New Year", "date": "2027-01-01" });
    let res = server
        .client
        .post(server.url("/api/holidays"))
        .bearer_auth(&employee)
        .json(&holiday)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = server
        .client
        .post(server.url("/api/holidays"))
        .bearer_auth(&admin)
        .json(&holiday)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    Ok(())
}
