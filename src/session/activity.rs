use chrono::{DateTime, Local};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus {
    Info,
    Success,
    Error,
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EntryStatus::Info => "info",
            EntryStatus::Success => "success",
            EntryStatus::Error => "error",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone)]
pub struct ActivityEntry {
    pub time: DateTime<Local>,
    pub status: EntryStatus,
    pub message: String,
}

impl fmt::Display for ActivityEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] {}",
            self.time.format("%H:%M:%S"),
            self.status,
            self.message
        )
    }
}

/// Running on-screen history of the session
///
/// Independent of the persisted session log; every entry is also emitted
/// through tracing.
#[derive(Debug, Default)]
pub struct ActivityLog {
    entries: Vec<ActivityEntry>,
}

impl ActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(EntryStatus::Info, message.into());
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(EntryStatus::Success, message.into());
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(EntryStatus::Error, message.into());
    }

    pub fn entries(&self) -> &[ActivityEntry] {
        &self.entries
    }

    fn push(&mut self, status: EntryStatus, message: String) {
        match status {
            EntryStatus::Error => tracing::error!("{}", message),
            _ => tracing::info!("{}", message),
        }

        self.entries.push(ActivityEntry {
            time: Local::now(),
            status,
            message,
        });
    }
}
