//! Structured JSONL logging.
//!
//! The builder and store emit [`LogEvent`]s through a [`LogSink`] trait
//! object; hosts pick the sink. [`MemorySink`] exists for tests and
//! diagnostics capture, [`FileSink`] appends JSON lines to disk, and
//! [`NullSink`] swallows everything.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

pub type LogFields = Map<String, Value>;

pub type LoggingResult<T> = std::result::Result<T, LoggingError>;

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

/// One structured log line.
#[derive(Debug, Clone, Serialize)]
pub struct LogEvent {
    pub ts_ms: u128,
    pub level: LogLevel,
    pub target: String,
    pub message: String,
    #[serde(skip_serializing_if = "LogFields::is_empty")]
    pub fields: LogFields,
}

impl LogEvent {
    pub fn new(level: LogLevel, target: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            ts_ms: current_ms(),
            level,
            target: target.into(),
            message: message.into(),
            fields: LogFields::new(),
        }
    }

    pub fn with_fields(
        mut self,
        fields: impl IntoIterator<Item = (String, Value)>,
    ) -> Self {
        self.fields.extend(fields);
        self
    }
}

fn current_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

/// Shorthand for building a fields entry.
pub fn kv(key: &str, value: impl Into<Value>) -> (String, Value) {
    (key.to_string(), value.into())
}

pub trait LogSink: Send + Sync {
    fn log(&self, event: &LogEvent) -> LoggingResult<()>;
}

/// Cheap clonable handle over a shared sink. Sink failures are dropped on the
/// floor: logging must never take an editing session down.
#[derive(Clone)]
pub struct Logger {
    sink: Arc<dyn LogSink>,
}

impl Logger {
    pub fn new<S>(sink: S) -> Self
    where
        S: LogSink + 'static,
    {
        Self {
            sink: Arc::new(sink),
        }
    }

    pub fn log(&self, event: LogEvent) {
        let _ = self.sink.log(&event);
    }

    pub fn debug(&self, target: &str, message: &str) {
        self.log(LogEvent::new(LogLevel::Debug, target, message));
    }

    pub fn info(&self, target: &str, message: &str) {
        self.log(LogEvent::new(LogLevel::Info, target, message));
    }

    pub fn warn(&self, target: &str, message: &str) {
        self.log(LogEvent::new(LogLevel::Warn, target, message));
    }

    pub fn error(&self, target: &str, message: &str) {
        self.log(LogEvent::new(LogLevel::Error, target, message));
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl LogSink for NullSink {
    fn log(&self, _event: &LogEvent) -> LoggingResult<()> {
        Ok(())
    }
}

/// Captures events in memory. Intended for tests and in-session diagnostics.
#[derive(Clone, Default)]
pub struct MemorySink {
    events: Arc<Mutex<Vec<LogEvent>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<LogEvent> {
        self.events.lock().map(|guard| guard.clone()).unwrap_or_default()
    }

    pub fn contains_message(&self, needle: &str) -> bool {
        self.events().iter().any(|event| event.message.contains(needle))
    }
}

impl LogSink for MemorySink {
    fn log(&self, event: &LogEvent) -> LoggingResult<()> {
        if let Ok(mut guard) = self.events.lock() {
            guard.push(event.clone());
        }
        Ok(())
    }
}

/// Appends one JSON line per event.
pub struct FileSink {
    writer: Mutex<BufWriter<File>>,
}

impl FileSink {
    pub fn new(path: impl AsRef<Path>) -> LoggingResult<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path.as_ref())?;
        Ok(Self {
            writer: Mutex::new(BufWriter::new(file)),
        })
    }
}

impl LogSink for FileSink {
    fn log(&self, event: &LogEvent) -> LoggingResult<()> {
        let mut line = serde_json::to_string(event)?;
        line.push('\n');
        let mut guard = self.writer.lock().map_err(|_| {
            LoggingError::Io(std::io::Error::other("log writer poisoned"))
        })?;
        guard.write_all(line.as_bytes())?;
        guard.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn memory_sink_captures_events_in_order() {
        let sink = MemorySink::new();
        let logger = Logger::new(sink.clone());
        logger.info("store", "loaded");
        logger.log(
            LogEvent::new(LogLevel::Warn, "store", "save failed")
                .with_fields([kv("attempt", 2)]),
        );

        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].message, "loaded");
        assert_eq!(events[1].level, LogLevel::Warn);
        assert_eq!(events[1].fields["attempt"], json!(2));
        assert!(sink.contains_message("save failed"));
    }

    #[test]
    fn events_serialize_without_empty_fields() {
        let event = LogEvent::new(LogLevel::Info, "builder", "widget added");
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["level"], json!("info"));
        assert!(value.get("fields").is_none());
    }

    #[test]
    fn file_sink_appends_json_lines() {
        let path = std::env::temp_dir().join(format!("pageboard-log-{}.jsonl", uuid::Uuid::new_v4()));
        let logger = Logger::new(FileSink::new(&path).unwrap());
        logger.info("builder", "first");
        logger.warn("builder", "second");

        let body = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = body.lines().collect();
        assert_eq!(lines.len(), 2);
        let parsed: LogFields = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(parsed["message"], json!("second"));
        let _ = std::fs::remove_file(&path);
    }
}
