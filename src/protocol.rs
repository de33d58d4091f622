//! Wire protocol for the storage viewer channels
//!
//! Every frame is one JSON object whose `cmd` field names the command
//! (client → server) or event (server → client). There is no request id:
//! events are unsolicited and must be self-describing.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ProtocolError;
use crate::listing::{Entry, EntryRef, Listing};
use crate::path::DirPath;

// Channel paths relative to the viewer origin
pub const LOCAL_CHANNEL_PATH: &str = "/websocket/local";
pub const REMOTE_CHANNEL_PATH: &str = "/websocket/remote";

/// File reference sent with a preview request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewFile {
    pub name: String,
    pub sha1: String,
    #[serde(rename = "type")]
    pub file_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Command {
    Cd { dir_path: DirPath, offset: u64, limit: u32 },
    Refresh { dir_path: DirPath, offset: u64, limit: u32 },
    ChangePage { dir_path: DirPath, offset: u64, limit: u32 },
    Mkdir { name: String, dir_path: DirPath },
    Rename { old_name: String, new_name: String, dir_path: DirPath },
    Delete { dirs: Vec<EntryRef>, files: Vec<EntryRef>, dir_path: DirPath },
    Cut { dirs: Vec<EntryRef>, files: Vec<EntryRef>, dir_path: DirPath },
    Copy { dirs: Vec<EntryRef>, files: Vec<EntryRef>, dir_path: DirPath },
    Paste { dir_path: DirPath },
    Upload {
        dirs: Vec<EntryRef>,
        files: Vec<EntryRef>,
        local_path: DirPath,
        remote_path: DirPath,
        replica: u32,
    },
    Download {
        dirs: Vec<EntryRef>,
        files: Vec<EntryRef>,
        remote_path: DirPath,
        local_path: DirPath,
    },
    Preview { file: PreviewFile, dir_path: DirPath },
    Update { dirs: Vec<EntryRef>, files: Vec<EntryRef>, dir_path: DirPath, replica: u32 },
}

/// Server-side operations whose completion is only visible through later events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    Mkdir,
    Rename,
    Delete,
    Cut,
    Copy,
    Paste,
    Upload,
    Download,
    Update,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Cd { .. } => "cd",
            Command::Refresh { .. } => "refresh",
            Command::ChangePage { .. } => "change_page",
            Command::Mkdir { .. } => "mkdir",
            Command::Rename { .. } => "rename",
            Command::Delete { .. } => "delete",
            Command::Cut { .. } => "cut",
            Command::Copy { .. } => "copy",
            Command::Paste { .. } => "paste",
            Command::Upload { .. } => "upload",
            Command::Download { .. } => "download",
            Command::Preview { .. } => "preview",
            Command::Update { .. } => "update",
        }
    }

    /// The operation this command leaves outstanding, if it mutates storage.
    pub fn op_kind(&self) -> Option<OpKind> {
        match self {
            Command::Mkdir { .. } => Some(OpKind::Mkdir),
            Command::Rename { .. } => Some(OpKind::Rename),
            Command::Delete { .. } => Some(OpKind::Delete),
            Command::Cut { .. } => Some(OpKind::Cut),
            Command::Copy { .. } => Some(OpKind::Copy),
            Command::Paste { .. } => Some(OpKind::Paste),
            Command::Upload { .. } => Some(OpKind::Upload),
            Command::Download { .. } => Some(OpKind::Download),
            Command::Update { .. } => Some(OpKind::Update),
            Command::Cd { .. }
            | Command::Refresh { .. }
            | Command::ChangePage { .. }
            | Command::Preview { .. } => None,
        }
    }

    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warning,
    Error,
}

impl Level {
    pub fn prefix(self) -> &'static str {
        match self {
            Level::Info => "Info",
            Level::Warning => "Warning",
            Level::Error => "Error",
        }
    }
}

/// A full directory listing pushed by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEvent {
    pub dir_path: DirPath,
    pub home_path: Option<DirPath>,
    pub total: u64,
    pub listing: Listing,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PreviewContent {
    Text(String),
    /// Archive members and similar structured payloads
    Structured(Value),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PreviewEvent {
    pub file_path: String,
    pub file_type: String,
    pub content: PreviewContent,
}

impl PreviewEvent {
    /// Highlighting class for the previewed file type.
    pub fn language(&self) -> &'static str {
        match self.file_type.as_str() {
            ".zip" | ".json" => "json",
            ".md" => "markdown",
            ".c" => "c",
            ".go" => "go",
            ".xml" => "xml",
            ".sh" => "bash",
            ".yml" => "yaml",
            ".html" => "html",
            ".py" => "python",
            _ => "plaintext",
        }
    }

    /// Text to show; structured payloads are pretty-printed.
    pub fn rendered(&self) -> String {
        match &self.content {
            PreviewContent::Text(s) => s.clone(),
            PreviewContent::Structured(v) => {
                serde_json::to_string_pretty(v).unwrap_or_else(|_| v.to_string())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Init(ListingEvent),
    Status { level: Level, text: String },
    /// Server finished the last clipboard operation
    Paste,
    NeedRefresh { dir_path: DirPath },
    Preview(PreviewEvent),
}

#[derive(Deserialize)]
struct WireInit {
    dir_path: DirPath,
    #[serde(default)]
    home_path: Option<DirPath>,
    #[serde(default)]
    total: Option<u64>,
    #[serde(default)]
    items: Option<Vec<Entry>>,
    #[serde(default)]
    dirs: Vec<Entry>,
    #[serde(default)]
    files: Vec<Entry>,
}

#[derive(Deserialize)]
struct WireStatus {
    #[serde(default)]
    info: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WirePath {
    Segments(DirPath),
    Joined(String),
}

#[derive(Deserialize)]
struct WireNeedRefresh {
    dir_path: WirePath,
}

#[derive(Deserialize)]
struct WirePreview {
    file_path: String,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    content: Option<Value>,
    #[serde(rename = "type", default)]
    file_type: String,
}

impl Event {
    /// Single entry point for inbound frames.
    pub fn decode(frame: &str) -> Result<Self, ProtocolError> {
        let value: Value = serde_json::from_str(frame)?;
        let cmd = match value.get("cmd") {
            Some(Value::String(s)) => s.clone(),
            _ => return Err(ProtocolError::MissingCommand),
        };
        let malformed = |source: serde_json::Error| ProtocolError::Malformed {
            cmd: cmd.clone(),
            source,
        };
        let status = |level: Level, value: Value| {
            serde_json::from_value::<WireStatus>(value)
                .map(|w| Event::Status { level, text: w.info })
                .map_err(malformed)
        };
        match cmd.as_str() {
            "init" => {
                let w: WireInit = serde_json::from_value(value).map_err(malformed)?;
                let listing = match w.items {
                    Some(items) => Listing::from_items(items),
                    None => Listing::from_parts(w.dirs, w.files),
                };
                Ok(Event::Init(ListingEvent {
                    dir_path: w.dir_path,
                    home_path: w.home_path,
                    total: w.total.unwrap_or(listing.len() as u64),
                    listing,
                }))
            }
            "info" => status(Level::Info, value),
            "warning" => status(Level::Warning, value),
            "error" => status(Level::Error, value),
            "paste" => Ok(Event::Paste),
            "need_refresh" => {
                let w: WireNeedRefresh = serde_json::from_value(value).map_err(malformed)?;
                let dir_path = match w.dir_path {
                    WirePath::Segments(p) => p,
                    WirePath::Joined(s) => DirPath::parse(&s),
                };
                Ok(Event::NeedRefresh { dir_path })
            }
            "preview" => {
                let w: WirePreview = serde_json::from_value(value).map_err(malformed)?;
                // `data` is what the viewer server sends; `content` is the older name
                let content = match w.data.or(w.content).unwrap_or(Value::Null) {
                    Value::String(s) => PreviewContent::Text(s),
                    other => PreviewContent::Structured(other),
                };
                Ok(Event::Preview(PreviewEvent {
                    file_path: w.file_path,
                    file_type: w.file_type,
                    content,
                }))
            }
            _ => Err(ProtocolError::UnknownCommand(cmd.clone())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Event::Init(_) => "init",
            Event::Status { level: Level::Info, .. } => "info",
            Event::Status { level: Level::Warning, .. } => "warning",
            Event::Status { level: Level::Error, .. } => "error",
            Event::Paste => "paste",
            Event::NeedRefresh { .. } => "need_refresh",
            Event::Preview(_) => "preview",
        }
    }
}
