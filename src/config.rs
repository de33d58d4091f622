//! Persistent viewer settings (`ldfs-viewer.toml`)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::clipboard::DEFAULT_REPLICA;
use crate::pagination::{DEFAULT_LINK_SPAN, DEFAULT_PAGE_SIZE};
use crate::status_log::DEFAULT_CAPACITY;

pub const CONFIG_FILE: &str = "ldfs-viewer.toml";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Viewer server: host[:port], http(s)://… or ws(s)://…
    pub origin: String,
    pub page_size: u32,
    pub link_span: u32,
    pub log_capacity: usize,
    pub log_file: Option<PathBuf>,
    pub default_replica: u32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            origin: "127.0.0.1:8080".to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            link_span: DEFAULT_LINK_SPAN,
            log_capacity: DEFAULT_CAPACITY,
            log_file: None,
            default_replica: DEFAULT_REPLICA,
        }
    }
}

impl ViewerConfig {
    /// Clamp values a hand-edited file could get wrong.
    pub fn normalized(mut self) -> Self {
        self.page_size = self.page_size.max(1);
        self.log_capacity = self.log_capacity.max(1);
        self.default_replica = self.default_replica.max(1);
        self
    }
}

pub fn config_dir() -> PathBuf {
    #[cfg(windows)]
    {
        if let Ok(appdata) = std::env::var("APPDATA") {
            return PathBuf::from(appdata).join("LdfsViewer");
        }
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".config").join("ldfs-viewer");
    }
    PathBuf::from(".ldfs-viewer")
}

pub fn default_config_path() -> PathBuf {
    config_dir().join(CONFIG_FILE)
}

/// Missing file means defaults; a present but broken file is an error.
pub fn load(path: &Path) -> Result<ViewerConfig> {
    match std::fs::read_to_string(path) {
        Ok(data) => {
            let cfg: ViewerConfig = toml::from_str(&data)
                .with_context(|| format!("parsing {}", path.display()))?;
            Ok(cfg.normalized())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ViewerConfig::default()),
        Err(e) => Err(e).with_context(|| format!("reading {}", path.display())),
    }
}

pub fn save(path: &Path, cfg: &ViewerConfig) -> Result<()> {
    let dir = path
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&dir).ok();
    let data = toml::to_string(cfg)?;
    // atomic write
    let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
    use std::io::Write as _;
    tmp.write_all(data.as_bytes())?;
    tmp.flush()?;
    tmp.persist(path)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(cfg, ViewerConfig::default());
        assert_eq!(cfg.page_size, 100);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "origin = \"ldfs.lan:9000\"\npage_size = 0\n").unwrap();
        let cfg = load(&path).unwrap();
        assert_eq!(cfg.origin, "ldfs.lan:9000");
        assert_eq!(cfg.page_size, 1);
        assert_eq!(cfg.link_span, 5);
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE);
        let cfg = ViewerConfig {
            log_file: Some(PathBuf::from("/tmp/ldfs.log")),
            default_replica: 3,
            ..ViewerConfig::default()
        };
        save(&path, &cfg).unwrap();
        assert_eq!(load(&path).unwrap(), cfg);
    }

    #[test]
    fn broken_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "page_size = \"many\"").unwrap();
        assert!(load(&path).is_err());
    }
}
