//! Log capture - mirrors log records into the core `LogBuffer` for the
//! on-screen log panel and optionally echoes them to stderr (headless runs).

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use avv_core::log_buffer::{LogBuffer, LogEntry};
use log::{LevelFilter, Log, Metadata, Record};

static LOG_BUFFER: Mutex<LogBuffer> = Mutex::new(LogBuffer::new());
static ECHO_STDERR: AtomicBool = AtomicBool::new(false);

pub struct CaptureLogger;

impl Log for CaptureLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let message = record.args().to_string();
        if ECHO_STDERR.load(Ordering::Relaxed) {
            eprintln!("[{:<5}] {}: {}", record.level(), record.target(), message);
        }

        if let Ok(mut buffer) = LOG_BUFFER.lock() {
            buffer.push(LogEntry::new(record.level(), record.target(), &message));
        }
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger;

/// Install the capture logger. A second call only updates the level and
/// echo setting.
pub fn init(max_level: LevelFilter, echo_stderr: bool) {
    ECHO_STDERR.store(echo_stderr, Ordering::Relaxed);
    match log::set_logger(&LOGGER) {
        Ok(()) => log::set_max_level(max_level),
        Err(_) => {
            // Logger already set, keep it and just apply the new level
            log::set_max_level(max_level);
        }
    }
}

/// Most recent records, oldest first.
pub fn recent(count: usize) -> Vec<LogEntry> {
    LOG_BUFFER
        .lock()
        .ok()
        .map(|buffer| buffer.recent(count).cloned().collect())
        .unwrap_or_default()
}
