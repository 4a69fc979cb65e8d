use std::{net::SocketAddr, path::PathBuf};

use clap::Parser;

use crate::auth::DEFAULT_SESSION_TTL_HOURS;
use crate::store::DEFAULT_DB_PATH;

/// Personal task planner backend.
#[derive(Debug, Clone, Parser)]
#[command(version, about)]
pub struct Config {
    /// Address the HTTP server listens on
    #[arg(long, env = "TASK_PLANNER_BIND", default_value = "127.0.0.1:3000")]
    pub bind: SocketAddr,

    /// JSON file holding accounts, profiles and tasks
    #[arg(long, env = "TASK_PLANNER_DB", default_value = DEFAULT_DB_PATH)]
    pub db_path: PathBuf,

    /// Optional directory of static files served at `/`
    #[arg(long, env = "TASK_PLANNER_STATIC")]
    pub static_dir: Option<PathBuf>,

    /// Hours a session token stays valid after sign-in
    #[arg(long, env = "TASK_PLANNER_SESSION_TTL_HOURS", default_value_t = DEFAULT_SESSION_TTL_HOURS)]
    pub session_ttl_hours: i64,

    /// tracing filter directive, e.g. `task_planner=debug`
    #[arg(long, env = "TASK_PLANNER_LOG", default_value = "task_planner=info,tower_http=info")]
    pub log: String,
}
