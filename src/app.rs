use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware,
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::warn;

use crate::auth::{AdminPolicy, EmployeePolicy, JwtService, TeamLeadPolicy};
use crate::config::AppConfig;
use crate::database::models::{Branch, Holiday, Project, Task};
use crate::database::AppDbContext;
use crate::handlers::{protected, public};
use crate::middleware::jwt_auth_middleware;

/// Shared state handed to every handler
#[derive(Clone, Debug)]
pub struct AppState {
    pub ctx: AppDbContext,
    pub jwt: Arc<JwtService>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(ctx: AppDbContext, jwt: JwtService, config: AppConfig) -> Self {
        Self {
            ctx,
            jwt: Arc::new(jwt),
            config: Arc::new(config),
        }
    }
}

pub fn router(state: AppState) -> Router {
    let protected = protected_routes(&state.config)
        // Stored screenshots are only served to authenticated callers
        .nest_service("/uploads", ServeDir::new(&state.config.api.upload_dir))
        .route_layer(middleware::from_fn_with_state(state.clone(), jwt_auth_middleware));

    let mut app = Router::new().merge(public_routes()).merge(protected);

    if state.config.api.enable_request_logging {
        app = app.layer(TraceLayer::new_for_http());
    }
    if state.config.security.enable_cors {
        app = app.layer(cors_layer(&state.config.security.cors_origins));
    }

    app.with_state(state)
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .route("/api/auth/login", post(public::login))
}

fn protected_routes(config: &AppConfig) -> Router<AppState> {
    use protected::{activities, crud, leaves, notifications, projects, screenshots, settings, tasks, users};

    Router::new()
        .route("/api/auth/me", get(protected::me))
        // Admin: people and places
        .route("/api/users", get(users::list).post(users::create))
        .route(
            "/api/users/:id",
            get(users::show).put(users::update).delete(users::delete),
        )
        .route(
            "/api/branches",
            get(crud::list::<Branch, AdminPolicy>).post(crud::create::<Branch, AdminPolicy>),
        )
        .route(
            "/api/branches/:id",
            get(crud::show::<Branch, AdminPolicy>)
                .put(crud::update::<Branch, AdminPolicy>)
                .delete(crud::delete::<Branch, AdminPolicy>),
        )
        .route(
            "/api/holidays",
            get(crud::list::<Holiday, EmployeePolicy>).post(crud::create::<Holiday, AdminPolicy>),
        )
        .route(
            "/api/holidays/:id",
            get(crud::show::<Holiday, EmployeePolicy>)
                .put(crud::update::<Holiday, AdminPolicy>)
                .delete(crud::delete::<Holiday, AdminPolicy>),
        )
        .route("/api/settings", get(settings::show).put(settings::update))
        // Team leads: projects and task planning
        .route(
            "/api/projects",
            get(crud::list::<Project, TeamLeadPolicy>).post(crud::create::<Project, TeamLeadPolicy>),
        )
        .route(
            "/api/projects/:id",
            get(crud::show::<Project, TeamLeadPolicy>)
                .put(crud::update::<Project, TeamLeadPolicy>)
                .delete(crud::delete::<Project, TeamLeadPolicy>),
        )
        .route("/api/projects/:id/members", get(projects::members))
        .route(
            "/api/projects/:id/members/:user_id",
            post(projects::add_member).delete(projects::remove_member),
        )
        .route(
            "/api/tasks",
            get(crud::list::<Task, EmployeePolicy>).post(tasks::create),
        )
        .route("/api/tasks/mine", get(tasks::mine))
        .route(
            "/api/tasks/:id",
            get(crud::show::<Task, EmployeePolicy>)
                .put(crud::update::<Task, TeamLeadPolicy>)
                .delete(crud::delete::<Task, TeamLeadPolicy>),
        )
        .route("/api/tasks/:id/assignees", get(tasks::assignees))
        .route(
            "/api/tasks/:id/assignees/:user_id",
            post(tasks::assign).delete(tasks::unassign),
        )
        // Everyone: own leave, notifications and activity
        .route("/api/leaves", get(leaves::list).post(leaves::create))
        .route("/api/leaves/:id/status", patch(leaves::set_status))
        .route(
            "/api/notifications",
            get(notifications::list).post(notifications::create),
        )
        .route("/api/notifications/:id/read", patch(notifications::mark_read))
        .route("/api/activities", get(activities::list).post(activities::create))
        .route("/api/screenshots", get(screenshots::list))
        .route(
            "/api/screenshots/upload",
            post(screenshots::upload).layer(DefaultBodyLimit::max(config.api.max_upload_bytes)),
        )
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();
    layer.allow_origin(parsed)
}
