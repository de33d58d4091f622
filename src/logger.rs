use anyhow::Result;
use chrono::Utc;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use crate::pane::PaneId;

/// Session trace of channel traffic. Operator-facing messages go to
/// [`crate::status_log::StatusLog`] instead.
pub trait Logger: Send + Sync {
    fn opened(&self, _pane: PaneId, _url: &str) {}
    fn sent(&self, _pane: PaneId, _cmd: &str, _frame: &str) {}
    fn received(&self, _pane: PaneId, _cmd: &str) {}
    fn protocol_error(&self, _pane: PaneId, _msg: &str) {}
    fn closed(&self, _pane: PaneId, _reason: &str) {}
}

pub struct NoopLogger;
impl Logger for NoopLogger {}

pub struct TextLogger {
    file: Mutex<File>,
}

impl TextLogger {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let f = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(f),
        })
    }

    fn line(&self, s: &str) {
        if let Ok(mut f) = self.file.lock() {
            let _ = writeln!(f, "[{}] {}", Utc::now().to_rfc3339(), s);
        }
    }
}

impl Logger for TextLogger {
    fn opened(&self, pane: PaneId, url: &str) {
        self.line(&format!("OPEN pane={} url={}", pane, url));
    }
    fn sent(&self, pane: PaneId, cmd: &str, frame: &str) {
        self.line(&format!("SEND pane={} cmd={} bytes={}", pane, cmd, frame.len()));
    }
    fn received(&self, pane: PaneId, cmd: &str) {
        self.line(&format!("RECV pane={} cmd={}", pane, cmd));
    }
    fn protocol_error(&self, pane: PaneId, msg: &str) {
        self.line(&format!("ERROR pane={} msg={}", pane, msg));
    }
    fn closed(&self, pane: PaneId, reason: &str) {
        self.line(&format!("CLOSE pane={} reason={}", pane, reason));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_logger_appends_timestamped_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs/session.log");
        let logger = TextLogger::new(&path).unwrap();
        logger.sent(PaneId::Remote, "cd", r#"{"cmd":"cd"}"#);
        logger.received(PaneId::Local, "init");
        drop(logger);

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with('['));
        assert!(lines[0].ends_with("SEND pane=remote cmd=cd bytes=12"));
        assert!(lines[1].ends_with("RECV pane=local cmd=init"));
    }
}
