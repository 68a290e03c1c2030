use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod api;
mod config;
mod models;
mod routes;
mod services;
mod utils;

#[cfg(test)]
mod test_support;

use config::Config;
use routes::AppState;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("dht_dashboard=debug,hyper=warn,reqwest=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("📈 Starting DHT11 dashboard...");

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return;
        }
    };

    info!("Adafruit IO user: {}", config.username);
    if !config.has_api_key() {
        warn!("AIO_KEY not set, feeds will be requested without an API key");
    }

    let state = Arc::new(AppState::new(config));
    if let Err(e) = routes::run_server(state).await {
        error!("Server error: {}", e);
    }
}
