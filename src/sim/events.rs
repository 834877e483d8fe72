//! Rolling log of discrete security events shown next to the scene

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::consts::MAX_LOG_ENTRIES;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Alert,
    Success,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Alert => "alert",
            Severity::Success => "success",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Simulation tick the event happened on
    pub tick: u64,
    pub severity: Severity,
    pub message: String,
}

/// Bounded log, newest entry first
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventLog {
    entries: VecDeque<LogEntry>,
}

impl EventLog {
    pub fn push(&mut self, tick: u64, severity: Severity, message: impl Into<String>) {
        let entry = LogEntry {
            tick,
            severity,
            message: message.into(),
        };
        log::debug!("[{}] t={} {}", entry.severity.as_str(), tick, entry.message);
        self.entries.push_front(entry);
        self.entries.truncate(MAX_LOG_ENTRIES);
    }

    /// Entries from newest to oldest
    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&LogEntry> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_is_capped_newest_first() {
        let mut log = EventLog::default();
        for i in 0..20 {
            log.push(i, Severity::Info, format!("event {i}"));
        }
        assert_eq!(log.len(), MAX_LOG_ENTRIES);
        assert_eq!(log.latest().map(|e| e.tick), Some(19));
        assert_eq!(log.entries().last().map(|e| e.tick), Some(20 - MAX_LOG_ENTRIES as u64));
    }

    #[test]
    fn test_severity_serializes_lowercase() {
        let json = serde_json::to_string(&Severity::Alert).unwrap();
        assert_eq!(json, "\"alert\"");
    }
}
