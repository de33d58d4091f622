pub mod app;
pub mod theme;
pub mod ui;

use std::sync::Arc;

use crate::config::ViewerConfig;
use crate::logger::Logger;

pub fn start_viewer(cfg: ViewerConfig, logger: Arc<dyn Logger>) -> anyhow::Result<()> {
    app::run(cfg, logger)
}
