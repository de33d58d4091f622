//! ldfs-viewer library
//!
//! Client-side state machine for a dual-pane storage browser: typed wire
//! protocol, per-pane controllers, the shared clipboard, and the websocket
//! plumbing and terminal UI that drive them.

pub mod cli;
pub mod clipboard;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod listing;
pub mod logger;
pub mod net;
pub mod origin;
pub mod pagination;
pub mod pane;
pub mod path;
pub mod protocol;
pub mod selection;
pub mod status_log;
pub mod tui;
pub mod workspace;
