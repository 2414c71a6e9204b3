#![allow(dead_code)]

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use uuid::Uuid;

use employee_monitoring_api::app::{router, AppState};
use employee_monitoring_api::auth::{hash_password, JwtService, Role};
use employee_monitoring_api::config::AppConfig;
use employee_monitoring_api::database::models::User;
use employee_monitoring_api::database::{AppDbContext, Repository};

pub const TEST_SECRET: &str = "integration-test-secret-0123456789abcdef";
pub const TEST_PASSWORD: &str = "correct-horse-battery";

/// One server per test, each on its own in-memory database.
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub ctx: AppDbContext,
    pub jwt: JwtService,
    pub config: AppConfig,
    pub client: reqwest::Client,
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::development();
    config.jwt.secret = TEST_SECRET.to_string();
    config.api.enable_request_logging = false;
    config.api.upload_dir = std::env::temp_dir()
        .join(format!("ems-test-{}", Uuid::new_v4()))
        .to_string_lossy()
        .into_owned();
    config
}

impl TestServer {
    async fn spawn(config: AppConfig) -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let ctx = AppDbContext::in_memory().await?;
        let jwt = JwtService::new(&config.jwt)?;
        let app = router(AppState::new(ctx.clone(), jwt.clone(), config.clone()));

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .with_context(|| format!("failed to bind {}", base_url))?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            port,
            base_url,
            ctx,
            jwt,
            config,
            client: reqwest::Client::new(),
        })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn upload_dir(&self) -> PathBuf {
        PathBuf::from(&self.config.api.upload_dir)
    }

    /// Insert an active user with [`TEST_PASSWORD`] and return it with a token.
    pub async fn user(&self, role: Role) -> Result<(User, String)> {
        let id = Uuid::new_v4();
        let mut user = User::new(
            format!("{} {}", role, &id.to_string()[..8]),
            format!("{}-{}@example.com", role.as_str().to_lowercase(), id),
            role,
        );
        user.id = id;
        user.password_hash = hash_password(TEST_PASSWORD)?;
        let user = Repository::<User>::new(self.ctx.clone()).create(user).await?;
        let token = self.jwt.issue(user.id, &user.email, user.role)?;
        Ok((user, token))
    }

    pub async fn token(&self, role: Role) -> Result<String> {
        Ok(self.user(role).await?.1)
    }
}

pub async fn spawn_server() -> Result<TestServer> {
    spawn_with(test_config()).await
}

pub async fn spawn_with(config: AppConfig) -> Result<TestServer> {
    let server = TestServer::spawn(config).await?;
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// Fresh context for tests that never touch HTTP.
pub async fn context() -> Result<AppDbContext> {
    Ok(AppDbContext::in_memory().await?)
}
