use std::collections::VecDeque;

use crate::protocol::Level;

pub const DEFAULT_CAPACITY: usize = 256;

/// Append-only operator log; the oldest lines fall off past `capacity`.
#[derive(Debug, Clone)]
pub struct StatusLog {
    lines: VecDeque<String>,
    capacity: usize,
}

impl StatusLog {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            lines: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, level: Level, text: impl AsRef<str>) {
        self.push_line(format!("{}: {}", level.prefix(), text.as_ref()));
    }

    pub fn info(&mut self, text: impl AsRef<str>) {
        self.push(Level::Info, text);
    }

    pub fn error(&mut self, text: impl AsRef<str>) {
        self.push(Level::Error, text);
    }

    pub fn push_line(&mut self, line: String) {
        if self.lines.len() >= self.capacity {
            let _ = self.lines.pop_front();
        }
        self.lines.push_back(line);
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    /// Last `n` lines, oldest first.
    pub fn tail(&self, n: usize) -> impl Iterator<Item = &str> {
        self.lines
            .iter()
            .skip(self.lines.len().saturating_sub(n))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl Default for StatusLog {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
