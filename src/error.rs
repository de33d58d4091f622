//! Error types shared by the pane state machine and the wire protocol

use thiserror::Error;

use crate::selection::Action;

/// Rejected path construction (operator input or malformed server path)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("path segment is empty")]
    EmptySegment,
    #[error("path segment contains a separator: {0:?}")]
    Separator(String),
}

/// Inbound frame that could not be turned into an [`crate::protocol::Event`]
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("frame is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("frame has no `cmd` field")]
    MissingCommand,
    #[error("unknown event `{0}`")]
    UnknownCommand(String),
    #[error("malformed `{cmd}` event: {source}")]
    Malformed {
        cmd: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Outbound frame could not be handed to the connection
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    #[error("connection closed")]
    Closed,
    #[error("failed to encode command: {0}")]
    Encode(String),
}

/// Operator action refused before anything reached the wire
#[derive(Debug, Error)]
pub enum PaneError {
    #[error("lost connection, please reload")]
    Disconnected,
    #[error("not connected yet")]
    NotReady,
    #[error("{0} is not available for the current selection")]
    Unavailable(Action),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("no entry at index {0}")]
    NoSuchEntry(usize),
    #[error(transparent)]
    Path(#[from] PathError),
    #[error(transparent)]
    Channel(#[from] ChannelError),
}
