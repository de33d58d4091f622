//! Command encoding and event decoding for one pane's connection

use std::sync::Arc;

use crate::error::{ChannelError, ProtocolError};
use crate::logger::Logger;
use crate::pane::PaneId;
use crate::protocol::{Command, Event};

/// Outbound half of a pane connection.
pub trait CommandSink {
    fn send_frame(&mut self, frame: String) -> Result<(), ChannelError>;
}

/// Turns operator intents into frames and frames into typed events.
/// Holds no browsing state of its own.
pub struct Dispatcher<S> {
    pane: PaneId,
    sink: S,
    logger: Arc<dyn Logger>,
}

impl<S: CommandSink> Dispatcher<S> {
    pub fn new(pane: PaneId, sink: S, logger: Arc<dyn Logger>) -> Self {
        Self { pane, sink, logger }
    }

    pub fn send(&mut self, cmd: &Command) -> Result<(), ChannelError> {
        let frame = cmd
            .encode()
            .map_err(|e| ChannelError::Encode(e.to_string()))?;
        self.logger.sent(self.pane, cmd.name(), &frame);
        self.sink.send_frame(frame)
    }

    pub fn decode(&self, frame: &str) -> Result<Event, ProtocolError> {
        match Event::decode(frame) {
            Ok(ev) => {
                self.logger.received(self.pane, ev.name());
                Ok(ev)
            }
            Err(e) => {
                self.logger.protocol_error(self.pane, &e.to_string());
                Err(e)
            }
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Sink that keeps every frame for inspection.
    #[derive(Default)]
    pub struct RecordingSink {
        pub frames: Vec<String>,
        pub closed: bool,
    }

    impl RecordingSink {
        pub fn commands(&self) -> Vec<Command> {
            self.frames
                .iter()
                .map(|f| serde_json::from_str(f).unwrap())
                .collect()
        }

        pub fn last(&self) -> Option<Command> {
            self.commands().pop()
        }
    }

    impl CommandSink for RecordingSink {
        fn send_frame(&mut self, frame: String) -> Result<(), ChannelError> {
            if self.closed {
                return Err(ChannelError::Closed);
            }
            self.frames.push(frame);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::RecordingSink;
    use super::*;
    use crate::logger::NoopLogger;
    use crate::path::DirPath;

    #[test]
    fn send_encodes_one_frame_per_command() {
        let mut d = Dispatcher::new(PaneId::Remote, RecordingSink::default(), Arc::new(NoopLogger));
        let dir_path = DirPath::from_segments(["/"]).unwrap();
        d.send(&Command::Paste { dir_path: dir_path.clone() }).unwrap();
        assert_eq!(d.sink().frames, vec![r#"{"cmd":"paste","dir_path":["/"]}"#.to_string()]);
        assert_eq!(d.sink().last(), Some(Command::Paste { dir_path }));
    }

    #[test]
    fn closed_sink_reports_channel_error() {
        let sink = RecordingSink { closed: true, ..Default::default() };
        let mut d = Dispatcher::new(PaneId::Local, sink, Arc::new(NoopLogger));
        let err = d.send(&Command::Paste { dir_path: DirPath::default() }).unwrap_err();
        assert_eq!(err, ChannelError::Closed);
    }

    #[test]
    fn decode_reports_unknown_events() {
        let d = Dispatcher::new(PaneId::Local, RecordingSink::default(), Arc::new(NoopLogger));
        assert!(d.decode(r#"{"cmd":"paste"}"#).is_ok());
        assert!(matches!(
            d.decode(r#"{"cmd":"explode"}"#),
            Err(ProtocolError::UnknownCommand(_))
        ));
    }
}
