//! ldfsview - dual-pane browser for local and remote LiteDFS storage
//!
//! Connects one websocket channel per pane to a viewer server and drives
//! both panes from a single terminal UI loop.

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;

use ldfs_viewer::cli::ViewerOpts;
use ldfs_viewer::config;
use ldfs_viewer::logger::{Logger, NoopLogger, TextLogger};

fn main() -> Result<()> {
    let opts = ViewerOpts::parse();

    let config_path = opts
        .config
        .clone()
        .unwrap_or_else(config::default_config_path);
    let cfg = opts.apply(config::load(&config_path)?);
    if opts.save_config {
        config::save(&config_path, &cfg)
            .with_context(|| format!("saving config to {}", config_path.display()))?;
    }

    // Choose logger once; NoopLogger unless a trace file was asked for
    let logger: Arc<dyn Logger> = match &cfg.log_file {
        Some(p) => Arc::new(
            TextLogger::new(p).with_context(|| format!("opening log file {}", p.display()))?,
        ),
        None => Arc::new(NoopLogger),
    };

    ldfs_viewer::tui::start_viewer(cfg, logger)
}
