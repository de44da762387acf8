use std::fmt;
use std::sync::{Mutex, MutexGuard, OnceLock};

use log::{Level, LevelFilter, Log, Metadata, Record};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<Level> for LogLevel {
    fn from(level: Level) -> Self {
        match level {
            Level::Error => LogLevel::Error,
            Level::Warn => LogLevel::Warn,
            Level::Info => LogLevel::Info,
            Level::Debug => LogLevel::Debug,
            Level::Trace => LogLevel::Trace,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        };
        write!(f, "{}", label)
    }
}

type Sink = Box<dyn Fn(LogLevel, &str, &str) + Send + Sync + 'static>;

fn default_sink(level: LogLevel, target: &str, message: &str) {
    eprintln!("[{}] {}: {}", level, target, message);
}

fn sink_cell() -> &'static Mutex<Sink> {
    static SINK: OnceLock<Mutex<Sink>> = OnceLock::new();
    SINK.get_or_init(|| Mutex::new(Box::new(default_sink)))
}

fn lock_sink() -> MutexGuard<'static, Sink> {
    match sink_cell().lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Route every `log` record to `sink` (level, target, message).
pub fn set_sink(sink: impl Fn(LogLevel, &str, &str) + Send + Sync + 'static) {
    *lock_sink() = Box::new(sink);
}

pub fn reset_sink() {
    *lock_sink() = Box::new(default_sink);
}

struct SinkLogger;

impl Log for SinkLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let message = record.args().to_string();
        let guard = lock_sink();
        (guard)(record.level().into(), record.target(), &message);
    }

    fn flush(&self) {}
}

static LOGGER: SinkLogger = SinkLogger;

/// Register the sink logger with the `log` facade.
///
/// Returns false when another logger was installed first; the max level is
/// still applied.
pub fn init(max_level: LevelFilter) -> bool {
    let installed = log::set_logger(&LOGGER).is_ok();
    log::set_max_level(max_level);
    installed
}
