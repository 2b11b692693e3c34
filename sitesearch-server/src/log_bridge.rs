//! Server log capture. env_logger does the filtering and stderr output; its
//! format hook also publishes every emitted record to a bounded in-memory ring
//! (served by `GET /logs`) and a broadcast channel (`GET /logs/stream`).

use env_logger::Target;
use log::{Level, Record, SetLoggerError};
use serde::Serialize;
use std::collections::VecDeque;
use std::io::Write;
use std::sync::{LazyLock, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::broadcast;

const RING_CAPACITY: usize = 2000;
const STREAM_CAPACITY: usize = 512;
const FALLBACK_TARGET: &str = "sitesearch.log_bridge";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRecord {
    pub timestamp_ms: u64,
    pub level: String,
    pub target: String,
    pub message: String,
}

impl LogRecord {
    fn new(level: Level, target: &str, message: String) -> Self {
        Self {
            timestamp_ms: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis() as u64)
                .unwrap_or_default(),
            level: level.as_str().to_ascii_lowercase(),
            target: target.to_string(),
            message,
        }
    }
}

impl From<&Record<'_>> for LogRecord {
    fn from(record: &Record<'_>) -> Self {
        Self::new(record.level(), record.target(), record.args().to_string())
    }
}

/// Oldest-first buffer that keeps at most `capacity` records.
struct LogRing {
    capacity: usize,
    records: Mutex<VecDeque<LogRecord>>,
}

impl LogRing {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            records: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    fn record(&self, entry: LogRecord) {
        let Ok(mut records) = self.records.lock() else {
            return;
        };
        if records.len() == self.capacity {
            records.pop_front();
        }
        records.push_back(entry);
    }

    fn snapshot(&self) -> Vec<LogRecord> {
        self.records
            .lock()
            .map(|records| records.iter().cloned().collect())
            .unwrap_or_default()
    }
}

static RING: LazyLock<LogRing> = LazyLock::new(|| LogRing::new(RING_CAPACITY));
static STREAM: LazyLock<broadcast::Sender<LogRecord>> =
    LazyLock::new(|| broadcast::channel(STREAM_CAPACITY).0);

fn publish(entry: LogRecord) {
    RING.record(entry.clone());
    // no subscribers is fine
    let _ = STREAM.send(entry);
}

/// Install the logger. RUST_LOG overrides the default `warn` filter.
pub fn init() -> Result<(), SetLoggerError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(Target::Stderr)
        .format(|buf, record| {
            publish(LogRecord::from(record));
            writeln!(
                buf,
                "[{} {:<5} {}] {}",
                buf.timestamp_millis(),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .try_init()
}

pub fn recent_entries() -> Vec<LogRecord> {
    RING.snapshot()
}

pub fn subscribe() -> broadcast::Receiver<LogRecord> {
    STREAM.subscribe()
}

/// Record a line even when the logger could not be installed.
pub fn write_fallback_line(message: &str) {
    publish(LogRecord::new(Level::Error, FALLBACK_TARGET, message.to_string()));
    eprintln!("{}", message);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(message: &str) -> LogRecord {
        LogRecord::new(Level::Info, "test", message.to_string())
    }

    #[test]
    fn test_ring_drops_oldest() {
        let ring = LogRing::new(2);
        ring.record(entry("one"));
        ring.record(entry("two"));
        ring.record(entry("three"));
        let messages: Vec<String> = ring.snapshot().into_iter().map(|e| e.message).collect();
        assert_eq!(messages, vec!["two", "three"]);
    }

    #[test]
    fn test_fallback_line_is_published() {
        let mut rx = subscribe();
        write_fallback_line("logger test line");

        let entries = recent_entries();
        let entry = entries
            .iter()
            .rev()
            .find(|e| e.message == "logger test line")
            .unwrap();
        assert_eq!(entry.level, "error");
        assert_eq!(entry.target, FALLBACK_TARGET);

        let streamed = std::iter::from_fn(|| rx.try_recv().ok())
            .find(|e| e.message == "logger test line");
        assert!(streamed.is_some());
    }

    #[test]
    fn test_entry_serializes_camel_case() {
        let json = serde_json::to_value(entry("m")).unwrap();
        assert!(json["timestampMs"].as_u64().unwrap() > 0);
        assert_eq!(json["level"], "info");
        assert_eq!(json["target"], "test");
    }
}
