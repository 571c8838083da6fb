//! User-facing run events.
//!
//! The core never prints. Progress, warnings and failures are handed to a
//! `RunLogger` supplied by the caller, which decides how (or whether) to
//! render them. Low-level diagnostics still go through the `log` facade.

use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventLevel {
    Info,
    Warn,
    Error,
    Success,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEvent {
    pub level: EventLevel,
    pub message: String,
}

pub trait RunLogger {
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
    fn error(&self, message: &str);
    fn success(&self, message: &str);
}

/// Records every event in memory. Used by tests and by embedders that want
/// to inspect a run after the fact.
#[derive(Debug, Default)]
pub struct MemoryLogger {
    events: Mutex<Vec<LogEvent>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, level: EventLevel, message: &str) {
        let mut events = self.events.lock().unwrap_or_else(|p| p.into_inner());
        events.push(LogEvent {
            level,
            message: message.to_string(),
        });
    }

    pub fn events(&self) -> Vec<LogEvent> {
        self.events
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }

    pub fn messages(&self, level: EventLevel) -> Vec<String> {
        self.events()
            .into_iter()
            .filter(|e| e.level == level)
            .map(|e| e.message)
            .collect()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.messages(EventLevel::Warn)
    }

    pub fn errors(&self) -> Vec<String> {
        self.messages(EventLevel::Error)
    }
}

impl RunLogger for MemoryLogger {
    fn info(&self, message: &str) {
        self.push(EventLevel::Info, message);
    }

    fn warn(&self, message: &str) {
        self.push(EventLevel::Warn, message);
    }

    fn error(&self, message: &str) {
        self.push(EventLevel::Error, message);
    }

    fn success(&self, message: &str) {
        self.push(EventLevel::Success, message);
    }
}
