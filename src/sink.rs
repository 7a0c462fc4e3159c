// src/sink.rs

//! Line-oriented log sinks for build and install output
//!
//! The install pipeline writes every line of subprocess output, plus its
//! own progress lines, to a [`LogSink`]. Implementations include:
//! - closures: any `Fn(&str) + Send + Sync`
//! - [`TracingSink`]: forwards lines to tracing at info level
//! - [`ChannelSink`]: sends owned lines over an mpsc channel
//! - [`NullSink`]: discards everything
//! - [`MemorySink`]: keeps every line for later inspection
//!
//! Sinks are called from the install worker thread, one call per line, in
//! the order lines were produced.

use std::sync::Mutex;
use std::sync::mpsc::Sender;
use tracing::info;

/// Receiver of output lines
pub trait LogSink: Send + Sync {
    /// Accept one line of text, without its trailing newline
    fn line(&self, line: &str);
}

impl<F> LogSink for F
where
    F: Fn(&str) + Send + Sync,
{
    fn line(&self, line: &str) {
        self(line)
    }
}

/// Discards all lines
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl LogSink for NullSink {
    fn line(&self, _line: &str) {}
}

/// Forwards lines to tracing
#[derive(Debug, Clone)]
pub struct TracingSink {
    name: String,
}

impl TracingSink {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl LogSink for TracingSink {
    fn line(&self, line: &str) {
        info!("[{}] {}", self.name, line);
    }
}

/// Sends each line over a channel to a consumer on another thread
///
/// Lines sent after the receiver has hung up are dropped.
#[derive(Debug)]
pub struct ChannelSink {
    sender: Sender<String>,
}

impl ChannelSink {
    pub fn new(sender: Sender<String>) -> Self {
        Self { sender }
    }
}

impl LogSink for ChannelSink {
    fn line(&self, line: &str) {
        let _ = self.sender.send(line.to_string());
    }
}

/// Collects lines in memory
///
/// Handy for tests and for callers that want the full log after the fact.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all lines received so far
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }
}

impl LogSink for MemorySink {
    fn line(&self, line: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(line.to_string());
        }
    }
}
