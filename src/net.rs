//! Websocket channels: one task per pane on a shared runtime
//!
//! The UI thread never awaits. Outbound frames go through an unbounded
//! queue into the pane's task; everything the task observes comes back as a
//! [`ChannelEvent`] on a std channel that the UI loop drains.

use std::sync::mpsc::Sender;
use std::sync::Arc;

use anyhow::{Context, Result};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use url::Url;

use crate::dispatcher::CommandSink;
use crate::error::ChannelError;
use crate::logger::Logger;
use crate::pane::PaneId;

// Central runtime for channel tasks
lazy_static::lazy_static! {
    static ref RUNTIME: tokio::runtime::Runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .worker_threads(2)
        .build()
        .expect("Failed to create channel runtime");
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    Opened { pane: PaneId },
    Frame { pane: PaneId, text: String },
    /// Terminal: the task has exited and will not reconnect.
    Closed { pane: PaneId, reason: String },
}

/// Outbound queue into a pane's channel task.
pub struct WsSink {
    tx: UnboundedSender<String>,
}

impl CommandSink for WsSink {
    fn send_frame(&mut self, frame: String) -> Result<(), ChannelError> {
        self.tx.send(frame).map_err(|_| ChannelError::Closed)
    }
}

/// Start connecting `pane` to `url`. Returns immediately.
pub fn open_channel(
    pane: PaneId,
    url: Url,
    events: Sender<ChannelEvent>,
    logger: Arc<dyn Logger>,
) -> WsSink {
    let (tx, rx) = unbounded_channel();
    RUNTIME.spawn(run_channel(pane, url, rx, events, logger));
    WsSink { tx }
}

async fn run_channel(
    pane: PaneId,
    url: Url,
    mut outbound: UnboundedReceiver<String>,
    events: Sender<ChannelEvent>,
    logger: Arc<dyn Logger>,
) {
    let reason = match drive(pane, &url, &mut outbound, &events, logger.as_ref()).await {
        Ok(()) => "connection closed".to_string(),
        Err(e) => format!("{:#}", e),
    };
    logger.closed(pane, &reason);
    let _ = events.send(ChannelEvent::Closed { pane, reason });
}

async fn drive(
    pane: PaneId,
    url: &Url,
    outbound: &mut UnboundedReceiver<String>,
    events: &Sender<ChannelEvent>,
    logger: &dyn Logger,
) -> Result<()> {
    let (ws, _) = connect_async(url.as_str())
        .await
        .with_context(|| format!("connecting to {}", url))?;
    logger.opened(pane, url.as_str());
    if events.send(ChannelEvent::Opened { pane }).is_err() {
        return Ok(());
    }
    let (mut write, mut read) = ws.split();
    loop {
        tokio::select! {
            out = outbound.recv() => match out {
                Some(frame) => write
                    .send(Message::Text(frame))
                    .await
                    .context("sending frame")?,
                // UI side is gone
                None => {
                    let _ = write.close().await;
                    return Ok(());
                }
            },
            msg = read.next() => match msg {
                Some(Ok(Message::Text(text))) => {
                    if events.send(ChannelEvent::Frame { pane, text }).is_err() {
                        return Ok(());
                    }
                }
                Some(Ok(Message::Close(_))) | None => return Ok(()),
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e).context("reading frame"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sink_reports_closed_queue() {
        let (tx, rx) = unbounded_channel();
        let mut sink = WsSink { tx };
        sink.send_frame("{}".into()).unwrap();
        drop(rx);
        assert_eq!(sink.send_frame("{}".into()), Err(ChannelError::Closed));
    }

    #[test]
    fn refused_connection_reports_closed() {
        // nothing listens on port 1
        let url = Url::parse("ws://127.0.0.1:1/websocket/local").unwrap();
        let (tx, rx) = std::sync::mpsc::channel();
        let _sink = open_channel(PaneId::Local, url, tx, Arc::new(crate::logger::NoopLogger));
        let ev = rx.recv_timeout(std::time::Duration::from_secs(10)).unwrap();
        assert!(matches!(ev, ChannelEvent::Closed { pane: PaneId::Local, .. }));
    }
}
