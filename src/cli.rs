//! Command-line options for the `ldfsview` binary

use clap::Parser;
use std::path::PathBuf;

use crate::config::ViewerConfig;

/// Browse local and remote LiteDFS storage side by side
#[derive(Clone, Debug, Parser)]
#[command(name = "ldfsview", version)]
pub struct ViewerOpts {
    /// Viewer server origin (host:port, http://host:port or ws://host:port)
    pub origin: Option<String>,

    /// Config file (default: <config dir>/ldfs-viewer.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Entries requested per page
    #[arg(long)]
    pub page_size: Option<u32>,

    /// Replica factor used when the prompt is left blank
    #[arg(long)]
    pub replica: Option<u32>,

    /// Append a session trace of channel traffic to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Write the effective settings back to the config file
    #[arg(long)]
    pub save_config: bool,
}

impl ViewerOpts {
    pub fn apply(&self, mut cfg: ViewerConfig) -> ViewerConfig {
        if let Some(origin) = &self.origin {
            cfg.origin = origin.clone();
        }
        if let Some(n) = self.page_size {
            cfg.page_size = n;
        }
        if let Some(n) = self.replica {
            cfg.default_replica = n;
        }
        if let Some(p) = &self.log_file {
            cfg.log_file = Some(p.clone());
        }
        cfg.normalized()
    }
}
