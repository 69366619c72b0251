//! Binary entry point: resolve the data directory, start file logging, open
//! the SQLite store and drive the Ratatui event loop until the user exits.
use anyhow::Context;
use school_manager::logging::init_logging;
use school_manager::{open_database, run_app, App, AppConfig};
use tracing::info;

fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    init_logging(&config.log_path)?;

    let conn = open_database(&config.database_path)
        .with_context(|| format!("cannot use {}", config.database_path.display()))?;
    info!(path = %config.database_path.display(), "school manager started");

    let mut app = App::new(conn, config.rules).context("failed to load initial data")?;
    run_app(&mut app)
}
