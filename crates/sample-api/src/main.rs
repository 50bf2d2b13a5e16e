//! `sample-api` binary entry point.
//!
//! Startup sequence:
//! 1. Load and validate [`Config`] from environment variables.
//! 2. Initialise structured JSON logging.
//! 3. Decrypt the settings file and seed the [`SettingsStore`].
//! 4. Spawn the background settings reload task, if enabled.
//! 5. Build the Axum router and start the HTTP server.

mod config;
mod server;
mod settings;
mod telemetry;

use anyhow::Result;
use ejson_config::SettingsStore;
use tracing::info;

use crate::config::Config;
use crate::server::state::AppState;
use crate::settings::SettingsLoader;

#[tokio::main]
async fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = Config::from_env().map_err(|e| {
        // Telemetry is not yet up; write to stderr directly.
        eprintln!("ERROR: configuration invalid: {e:#}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init_telemetry(&cfg.log_level)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        listen_port = cfg.listen_port,
        settings_path = %cfg.settings_path,
        "sample-api starting"
    );

    // -----------------------------------------------------------------------
    // 3. Settings
    // -----------------------------------------------------------------------
    let loader = SettingsLoader::from_config(&cfg)?;
    let store = SettingsStore::new();
    loader.load_into(&store).await?;

    // -----------------------------------------------------------------------
    // 4. Background tasks
    // -----------------------------------------------------------------------
    let _settings_reload = (cfg.reload_interval_secs > 0)
        .then(|| settings::reload_task(loader, cfg.reload_interval_secs, store.clone()));

    // -----------------------------------------------------------------------
    // 5. HTTP server
    // -----------------------------------------------------------------------
    let router = server::router::build(AppState::new(store));

    let addr: std::net::SocketAddr = ([0, 0, 0, 0], cfg.listen_port).into();
    info!(addr = %addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
