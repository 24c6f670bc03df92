use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// How long the footer keeps showing the newest message
pub const STATUS_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone)]
pub struct StatusEntry {
    pub at: Instant,
    pub level: StatusLevel,
    pub text: String,
}

/// Ring buffer of user-facing status messages. Every entry is also logged.
pub struct StatusLog {
    entries: VecDeque<StatusEntry>,
    max_entries: usize,
}

impl StatusLog {
    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    pub fn with_capacity(max_entries: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            max_entries: max_entries.max(1),
        }
    }

    pub fn info(&mut self, text: impl Into<String>) {
        self.push(StatusLevel::Info, text, Instant::now());
    }

    pub fn warn(&mut self, text: impl Into<String>) {
        self.push(StatusLevel::Warn, text, Instant::now());
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.push(StatusLevel::Error, text, Instant::now());
    }

    pub fn push(&mut self, level: StatusLevel, text: impl Into<String>, at: Instant) {
        let text = text.into();
        match level {
            StatusLevel::Info => log::info!("{}", text),
            StatusLevel::Warn => log::warn!("{}", text),
            StatusLevel::Error => log::error!("{}", text),
        }

        self.entries.push_back(StatusEntry {
            at,
            level,
            text,
        });

        // Trim old entries
        while self.entries.len() > self.max_entries {
            self.entries.pop_front();
        }
    }

    pub fn latest(&self) -> Option<&StatusEntry> {
        self.entries.back()
    }

    /// Newest entry if it is younger than `within`
    pub fn recent(&self, within: Duration, now: Instant) -> Option<&StatusEntry> {
        self.latest()
            .filter(|e| now.saturating_duration_since(e.at) < within)
    }

    #[cfg(test)]
    pub(crate) fn texts(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.text.as_str()).collect()
    }
}

impl Default for StatusLog {
    fn default() -> Self {
        Self::new()
    }
}
