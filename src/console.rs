// Console sink for leveled diagnostic messages.
// Messages are forwarded to tracing or kept in memory for later inspection.

use std::sync::Mutex;

use chrono::{DateTime, Utc};

/// Console message level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleLevel {
    Info,
    Warn,
}

/// A single console message.
#[derive(Debug, Clone)]
pub struct ConsoleMessage {
    pub level: ConsoleLevel,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl ConsoleMessage {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: ConsoleLevel::Info,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn warn(message: impl Into<String>) -> Self {
        Self {
            level: ConsoleLevel::Warn,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Sink accepting console messages.
pub trait Console: Send + Sync {
    fn push(&self, message: ConsoleMessage);
}

/// Forwards messages to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingConsole;

impl Console for TracingConsole {
    fn push(&self, message: ConsoleMessage) {
        match message.level {
            ConsoleLevel::Info => tracing::info!("{}", message.message),
            ConsoleLevel::Warn => tracing::warn!("{}", message.message),
        }
    }
}

/// Records messages in memory.
#[derive(Debug, Default)]
pub struct MemoryConsole {
    messages: Mutex<Vec<ConsoleMessage>>,
}

impl MemoryConsole {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all recorded messages, oldest first.
    pub fn messages(&self) -> Vec<ConsoleMessage> {
        self.messages
            .lock()
            .map(|messages| messages.clone())
            .unwrap_or_default()
    }

    /// Number of recorded warnings.
    pub fn warning_count(&self) -> usize {
        self.messages()
            .iter()
            .filter(|m| m.level == ConsoleLevel::Warn)
            .count()
    }
}

impl Console for MemoryConsole {
    fn push(&self, message: ConsoleMessage) {
        if let Ok(mut messages) = self.messages.lock() {
            messages.push(message);
        }
    }
}
