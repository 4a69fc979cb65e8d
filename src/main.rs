// Define data modules
mod auth;   // Sessions, credentials, bearer token lookup
mod clock;  // Wall clock helpers (only used at the HTTP edge)
mod config; // CLI flags / environment configuration
mod error;  // StoreError, AppError
mod extractors; // Body / query rejections -> AppError
mod logic;  // Task view-model: filter, search, sort, stats
mod models; // Data structures (Task, Profile, Db, etc.)
mod state;  // Shared handler state
mod store;  // Persistent storage (load/save db.json)
mod routes_auth;  // HTTP handlers for session APIs
mod routes_tasks; // HTTP handlers for task APIs

use std::path::Path;

use anyhow::Context;
use axum::{
    routing::{get, post, put}, // HTTP method helpers
    Router, // Main router type
};
use clap::Parser;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing_subscriber::EnvFilter;

use crate::auth::SessionRegistry;
use crate::config::Config;
use crate::state::AppState;
use crate::store::Store;

pub fn build_app(state: AppState, static_dir: Option<&Path>) -> Router {
    let api = Router::new()
        // auth
        .route("/auth/signup", post(routes_auth::sign_up))
        .route("/auth/signin", post(routes_auth::sign_in))
        .route("/auth/signout", post(routes_auth::sign_out))
        .route("/auth/session", get(routes_auth::get_session))
        .route("/profile", get(routes_auth::get_profile))
        // tasks
        .route("/tasks", get(routes_tasks::get_tasks).post(routes_tasks::create_task))
        .route("/tasks/:id", put(routes_tasks::update_task).delete(routes_tasks::delete_task))
        .route("/tasks/:id/toggle", post(routes_tasks::toggle_task))
        .route("/tasks/:id/done", put(routes_tasks::set_done))
        .with_state(state);

    let app = Router::new().nest("/api", api);
    let app = match static_dir {
        Some(dir) => app.fallback_service(ServeDir::new(dir)),
        None => app,
    };
    app.layer(TraceLayer::new_for_http())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.log).context("invalid log filter")?)
        .init();

    let store = Store::new(&config.db_path);
    tracing::info!(addr = %config.bind, db = %store.path().display(), "server starting");
    let sessions = SessionRegistry::new(chrono::Duration::hours(config.session_ttl_hours));
    let app = build_app(AppState::new(store, sessions), config.static_dir.as_deref());

    if let Some(dir) = &config.static_dir {
        tracing::info!(dir = %dir.display(), "serving static files");
    }

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("bind {} failed", config.bind))?;

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
