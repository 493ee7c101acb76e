use std::sync::Arc;

use fairshare_scheduler::app::{AppState, router};
use fairshare_scheduler::config::Config;
use fairshare_scheduler::store::JsonFileStore;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("fairshare: {e}");
            std::process::exit(1);
        }
    };

    let env_filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let store = JsonFileStore::new(&config.db_path);
    let state = AppState::new(Arc::new(store), config.daily_capacity);
    let app = router(state);

    let listener = match tokio::net::TcpListener::bind(config.addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(addr = %config.addr, error = %e, "bind failed");
            std::process::exit(1);
        }
    };

    info!(
        addr = %config.addr,
        db_path = %config.db_path.display(),
        daily_capacity = config.daily_capacity,
        "server running, API base http://{}/api",
        config.addr
    );

    if let Err(e) = axum::serve(listener, app).await {
        error!(error = %e, "server error");
        std::process::exit(1);
    }
}
