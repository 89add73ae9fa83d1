//! deadman server - HTTP control surface for the dead-man's switch.

mod routes;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use deadman::config::load_config;
use deadman::countdown::CountdownController;
use deadman::deletion::DeletionExecutor;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeFile;
use tracing::{info, warn};

use crate::state::AppState;

#[derive(Parser)]
#[command(name = "deadman-server")]
#[command(about = "Arm a countdown that deletes the configured directories when it expires")]
struct Args {
    /// Address to bind the server to
    #[arg(long, default_value = "127.0.0.1")]
    bind: String,

    /// Port to listen on
    #[arg(long, default_value = "8080")]
    port: u16,

    /// TOML config with a [settings] table (paths and time limit)
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Page served at `/`
    #[arg(long, default_value = "ui/index.html")]
    index: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    deadman::logging::init("deadman=info,deadman_server=info");

    let args = Args::parse();

    let config = load_config(&args.config)?;
    info!(
        config = %args.config.display(),
        git_repo_path = %config.git_repo_path.display(),
        local_code_path = %config.local_code_path.display(),
        time_limit_secs = config.time_limit_seconds,
        "config loaded"
    );

    let controller = CountdownController::new(DeletionExecutor::default());
    let state = AppState::new(config, controller);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut app = routes::app_router();

    if args.index.is_file() {
        info!(index = %args.index.display(), "serving index page");
        app = app.route_service("/", ServeFile::new(&args.index));
    } else {
        warn!(index = %args.index.display(), "index page not found, API-only mode");
    }

    let app = app.layer(cors).with_state(state);

    let addr: SocketAddr = format!("{}:{}", args.bind, args.port).parse()?;
    info!(addr = %addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
