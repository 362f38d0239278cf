//! photonav - folder browser and image viewer core, driven from the terminal
//!
//! Usage: `photonav [--log] [DIR | IMAGE]`

mod app;
mod console;

use anyhow::Result;
use std::path::PathBuf;

fn main() -> Result<()> {
    let mut console_log = false;
    let mut start: Option<PathBuf> = None;

    for arg in std::env::args_os().skip(1) {
        if arg == "--log" {
            console_log = true;
        } else if start.is_none() {
            start = Some(PathBuf::from(arg));
        }
    }

    // Initialize logging and panic hook first
    app_log::init(console_log)?;

    if let Err(e) = app_log::cleanup_old_logs(7) {
        tracing::warn!("Failed to cleanup old logs: {}", e);
    }

    tracing::info!("photonav {} starting", env!("CARGO_PKG_VERSION"));

    let config = match app_core::AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("Using default configuration: {:#}", e);
            app_core::AppConfig::default()
        }
    };

    app::run(config, start)
}
