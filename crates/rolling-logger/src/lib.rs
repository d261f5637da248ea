//! Rolling Logger
//!
//! A `log` backend that keeps the most recent records in a fixed-size
//! circular buffer and forwards every record to a pluggable sink. The
//! buffer can be read back at runtime (e.g. for a debug panel).

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Mutex, OnceLock};

use chrono::{DateTime, Local};
use log::{Level, LevelFilter, Log, Metadata, Record};

/// One captured log line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub timestamp: DateTime<Local>,
    pub level: Level,
    pub target: String,
    pub message: String,
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:<5} [{}] {}",
            self.timestamp.format("%H:%M:%S%.3f"),
            self.level,
            self.target,
            self.message
        )
    }
}

/// Where formatted records go besides the buffer
pub trait Sink: Send + Sync {
    fn write(&self, entry: &Entry);
}

/// Drops everything; the buffer still records
pub struct NullSink;

impl Sink for NullSink {
    fn write(&self, _entry: &Entry) {}
}

/// Fixed-capacity buffer; the oldest entry is evicted first
#[derive(Debug)]
pub struct RingBuffer {
    entries: VecDeque<Entry>,
    capacity: usize,
}

impl RingBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, entry: Entry) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Oldest first
    pub fn snapshot(&self) -> Vec<Entry> {
        self.entries.iter().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

pub struct RollingLogger {
    level: LevelFilter,
    buffer: Mutex<RingBuffer>,
    sink: Box<dyn Sink>,
}

impl RollingLogger {
    pub fn new(level: LevelFilter, capacity: usize, sink: Box<dyn Sink>) -> Self {
        Self {
            level,
            buffer: Mutex::new(RingBuffer::new(capacity)),
            sink,
        }
    }

    pub fn recent(&self) -> Vec<Entry> {
        self.buffer.lock().map(|b| b.snapshot()).unwrap_or_default()
    }

    pub fn clear(&self) {
        if let Ok(mut buffer) = self.buffer.lock() {
            buffer.clear();
        }
    }
}

impl Log for RollingLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let entry = Entry {
            timestamp: Local::now(),
            level: record.level(),
            target: record.target().to_string(),
            message: record.args().to_string(),
        };
        self.sink.write(&entry);
        if let Ok(mut buffer) = self.buffer.lock() {
            buffer.push(entry);
        }
    }

    fn flush(&self) {}
}

static LOGGER: OnceLock<RollingLogger> = OnceLock::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("rolling logger already initialized")]
pub struct AlreadyInitialized;

/// Install the global logger. Only the first call wins.
pub fn init(level: LevelFilter, capacity: usize, sink: Box<dyn Sink>) -> Result<(), AlreadyInitialized> {
    if LOGGER.get().is_some() {
        return Err(AlreadyInitialized);
    }
    let logger = LOGGER.get_or_init(|| RollingLogger::new(level, capacity, sink));
    log::set_logger(logger).map_err(|_| AlreadyInitialized)?;
    log::set_max_level(level);
    Ok(())
}

/// Buffered entries of the global logger, oldest first
pub fn recent() -> Vec<Entry> {
    LOGGER.get().map(RollingLogger::recent).unwrap_or_default()
}

/// Parse a level name, falling back to `Info`
pub fn parse_level(raw: &str) -> LevelFilter {
    raw.trim().parse().unwrap_or(LevelFilter::Info)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    struct Collect(Arc<Mutex<Vec<String>>>);

    impl Sink for Collect {
        fn write(&self, entry: &Entry) {
            self.0.lock().unwrap().push(entry.message.clone());
        }
    }

    fn record_at(logger: &RollingLogger, level: Level, message: &str) {
        logger.log(
            &Record::builder()
                .level(level)
                .target("test")
                .args(format_args!("{}", message))
                .build(),
        );
    }

    #[test]
    fn test_ring_buffer_evicts_oldest() {
        let logger = RollingLogger::new(LevelFilter::Trace, 2, Box::new(NullSink));
        for msg in ["a", "b", "c"] {
            record_at(&logger, Level::Info, msg);
        }
        let kept: Vec<_> = logger.recent().into_iter().map(|e| e.message).collect();
        assert_eq!(kept, vec!["b", "c"]);
        logger.clear();
        assert!(logger.recent().is_empty());
    }

    #[test]
    fn test_level_filter_applies_to_sink_and_buffer() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let logger = RollingLogger::new(LevelFilter::Warn, 8, Box::new(Collect(seen.clone())));
        record_at(&logger, Level::Debug, "hidden");
        record_at(&logger, Level::Error, "shown");
        assert_eq!(seen.lock().unwrap().as_slice(), ["shown"]);
        assert_eq!(logger.recent().len(), 1);
    }

    #[test]
    fn test_entry_display() {
        let logger = RollingLogger::new(LevelFilter::Info, 1, Box::new(NullSink));
        record_at(&logger, Level::Warn, "[BOARD] move failed");
        let line = logger.recent()[0].to_string();
        assert!(line.ends_with("WARN  [test] [BOARD] move failed"), "{}", line);
    }

    #[test]
    fn test_second_init_is_refused() {
        let _ = init(LevelFilter::Info, 4, Box::new(NullSink));
        let err = init(LevelFilter::Debug, 4, Box::new(NullSink)).unwrap_err();
        assert_eq!(err, AlreadyInitialized);
        assert_eq!(err.to_string(), "rolling logger already initialized");
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("debug"), LevelFilter::Debug);
        assert_eq!(parse_level(" WARN "), LevelFilter::Warn);
        assert_eq!(parse_level("loud"), LevelFilter::Info);
    }
}
