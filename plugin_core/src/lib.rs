#![forbid(unsafe_code)]

pub mod logging;
pub mod observability;

/// Install the shared logger and panic hook. Safe to call more than once.
pub fn init(max_level: log::LevelFilter) {
    logging::init(max_level);
    observability::install_panic_hook();
}
