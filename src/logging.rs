//! Bootloader logging facility
//!
//! Routes `log` records to a board-supplied sink, usually a debug UART or
//! semihosting channel. Log levels are configured based on build
//! configuration (debug/release).

use core::fmt::Arguments;
use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};
use spin::Mutex;

/// Writes one formatted line to the debug channel
pub type Sink = fn(Arguments<'_>);

/// Global logger instance
pub static LOGGER: Logger = Logger::new();

/// Thread-safe logger implementation
pub struct Logger {
    sink: Mutex<Option<Sink>>,
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger {
    /// Creates a logger with no sink; records are dropped until one is set
    pub const fn new() -> Logger {
        Logger {
            sink: Mutex::new(None),
        }
    }

    pub fn set_sink(&self, sink: Sink) {
        *self.sink.lock() = Some(sink);
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    /// Formats messages as "[LEVEL] message"
    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let sink = self.sink.lock();
            if let Some(sink) = *sink {
                sink(format_args!("[{}] {}", record.level(), record.args()));
            }
        }
    }

    fn flush(&self) {}
}

/// Installs the global logger writing to `sink`
///
/// Sets different log levels for debug/release builds:
///   - Debug builds: LevelFilter::Debug
///   - Release builds: LevelFilter::Info
pub fn init(sink: Sink) -> Result<(), SetLoggerError> {
    LOGGER.set_sink(sink);
    log::set_logger(&LOGGER).map(|()| {
        log::set_max_level(
            #[cfg(debug_assertions)]
            LevelFilter::Debug,
            #[cfg(not(debug_assertions))]
            LevelFilter::Info,
        )
    })
}
