//! Per-pane cut/copy sets

use crate::error::PaneError;
use crate::listing::EntryRef;
use crate::pane::PaneId;
use crate::path::DirPath;

pub const DEFAULT_REPLICA: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipMode {
    Cut,
    Copy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardEntry {
    pub source: PaneId,
    pub source_path: DirPath,
    pub mode: ClipMode,
    pub dirs: Vec<EntryRef>,
    pub files: Vec<EntryRef>,
}

impl ClipboardEntry {
    pub fn len(&self) -> usize {
        self.dirs.len() + self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One cut/copy set per pane, as each pane's server keeps its own. Directory
/// navigation leaves them alone; only the acknowledgment of a paste from the
/// owning pane consumes that pane's entry.
#[derive(Debug, Default)]
pub struct Clipboard {
    local: Option<ClipboardEntry>,
    remote: Option<ClipboardEntry>,
}

impl Clipboard {
    fn slot(&mut self, pane: PaneId) -> &mut Option<ClipboardEntry> {
        match pane {
            PaneId::Local => &mut self.local,
            PaneId::Remote => &mut self.remote,
        }
    }

    /// Replace the set of the entry's source pane only.
    pub fn record(&mut self, entry: ClipboardEntry) {
        let source = entry.source;
        *self.slot(source) = Some(entry);
    }

    /// Entry owned by `pane`, if any.
    pub fn owned_by(&self, pane: PaneId) -> Option<&ClipboardEntry> {
        match pane {
            PaneId::Local => self.local.as_ref(),
            PaneId::Remote => self.remote.as_ref(),
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = &ClipboardEntry> {
        self.local.iter().chain(self.remote.iter())
    }

    pub fn consume(&mut self, pane: PaneId) -> Option<ClipboardEntry> {
        self.slot(pane).take()
    }

    pub fn is_empty(&self) -> bool {
        self.local.is_none() && self.remote.is_none()
    }
}

/// Replica factor typed by the operator. Blank means `default`.
pub fn parse_replica(input: Option<&str>, default: u32) -> Result<u32, PaneError> {
    let raw = match input.map(str::trim) {
        None | Some("") => return Ok(default.max(1)),
        Some(s) => s,
    };
    match raw.parse::<u32>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(PaneError::InvalidInput(format!("replica must be an integer >= 1, got {raw:?}"))),
    }
}
