//! Speed transition audit trail.
//!
//! A bounded, append-only record of every accepted speed change (plus
//! rate-rise detections).  Holds up to [`LOG_CAPACITY`] entries in a
//! fixed-capacity deque; the oldest entry is evicted before a new one is
//! appended at capacity.  Entries live in RAM only and are lost on reboot.

use heapless::Deque;
use serde::{Deserialize, Serialize};

use crate::control::speed::Speed;

/// Maximum number of retained entries.
pub const LOG_CAPACITY: usize = 100;

/// Maximum stored length of [`LogEntry::details`] (bytes).
pub const DETAILS_CAP: usize = 96;

/// Why a speed change (or log record) happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Cause {
    /// Manual request through the HTTP/UI layer.
    Api,
    /// Contactless TAP or HOLD gesture.
    Gesture,
    /// Rate-of-change auto activation.
    Auto,
    /// Rate rise observed while already running (log only).
    Detect,
    /// Heartbeat webhook (never logged).
    Periodic,
}

impl Cause {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Api => "API",
            Self::Gesture => "GESTURE",
            Self::Auto => "AUTO",
            Self::Detect => "DETECT",
            Self::Periodic => "PERIODIC",
        }
    }
}

impl core::fmt::Display for Cause {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One audit record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    /// Milliseconds since boot.
    pub timestamp: u64,
    pub cause: Cause,
    pub from_speed: Speed,
    pub to_speed: Speed,
    pub details: heapless::String<DETAILS_CAP>,
}

impl LogEntry {
    /// Build an entry, truncating `details` on a char boundary if needed.
    pub fn new(timestamp: u64, cause: Cause, from_speed: Speed, to_speed: Speed, details: &str) -> Self {
        let mut end = details.len().min(DETAILS_CAP);
        while !details.is_char_boundary(end) {
            end -= 1;
        }
        let mut d = heapless::String::new();
        let _ = d.push_str(&details[..end]);
        Self {
            timestamp,
            cause,
            from_speed,
            to_speed,
            details: d,
        }
    }
}

/// FIFO-evicting transition log.
#[derive(Default)]
pub struct EventLog {
    entries: Deque<LogEntry, LOG_CAPACITY>,
}

impl EventLog {
    pub const fn new() -> Self {
        Self {
            entries: Deque::new(),
        }
    }

    /// Append an entry, evicting the oldest one first when full.
    pub fn append(&mut self, entry: LogEntry) {
        if self.entries.is_full() {
            let _ = self.entries.pop_front();
        }
        // Cannot fail: a slot was freed above.
        let _ = self.entries.push_back(entry);
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries, newest first.
    pub fn newest_first(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter().rev()
    }

    /// Most recent entry, if any.
    pub fn latest(&self) -> Option<&LogEntry> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render the log as a JSON array, newest first.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let view: Vec<&LogEntry> = self.newest_first().collect();
        serde_json::to_string(&view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(ts: u64) -> LogEntry {
        LogEntry::new(ts, Cause::Api, Speed::OFF, Speed::LOW, "test")
    }

    #[test]
    fn starts_empty() {
        let log = EventLog::new();
        assert!(log.is_empty());
        assert!(log.latest().is_none());
    }

    #[test]
    fn reads_newest_first() {
        let mut log = EventLog::new();
        for ts in 1..=3 {
            log.append(entry(ts));
        }
        let order: Vec<u64> = log.newest_first().map(|e| e.timestamp).collect();
        assert_eq!(order, vec![3, 2, 1]);
    }

    #[test]
    fn evicts_oldest_at_capacity() {
        let mut log = EventLog::new();
        for ts in 0..=LOG_CAPACITY as u64 {
            log.append(entry(ts));
        }
        assert_eq!(log.len(), LOG_CAPACITY);
        assert!(log.newest_first().all(|e| e.timestamp != 0));
        assert_eq!(log.latest().map(|e| e.timestamp), Some(LOG_CAPACITY as u64));
    }

    #[test]
    fn clear_empties() {
        let mut log = EventLog::new();
        log.append(entry(1));
        log.clear();
        assert!(log.is_empty());
    }

    #[test]
    fn details_truncate_on_char_boundary() {
        let long = "ż".repeat(DETAILS_CAP);
        let e = LogEntry::new(0, Cause::Gesture, Speed::OFF, Speed::LOW, &long);
        assert!(e.details.len() <= DETAILS_CAP);
        assert!(e.details.chars().all(|c| c == 'ż'));
    }

    #[test]
    fn json_uses_wire_names() {
        let mut log = EventLog::new();
        log.append(LogEntry::new(42, Cause::Auto, Speed::OFF, Speed::LOW, "rise"));
        let json = log.to_json().unwrap();
        assert!(json.contains("\"cause\":\"AUTO\""));
        assert!(json.contains("\"fromSpeed\":0"));
        assert!(json.contains("\"toSpeed\":1"));
        assert!(json.contains("\"timestamp\":42"));
    }
}
