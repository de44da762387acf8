use std::fmt;
use std::panic::{self, PanicHookInfo};
use std::sync::{Mutex, OnceLock};

/// Last fatal condition seen by the plugin, kept so the host can query it
/// after a failed load.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Failure {
    pub origin: String,
    pub message: String,
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.origin, self.message)
    }
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn failure_cell() -> &'static Mutex<Option<Failure>> {
    static FAILURE: OnceLock<Mutex<Option<Failure>>> = OnceLock::new();
    FAILURE.get_or_init(|| Mutex::new(None))
}

pub fn report_failure(origin: impl Into<String>, message: impl Into<String>) {
    let failure = Failure {
        origin: origin.into(),
        message: message.into(),
    };
    log::error!(target: "plugin_core", "{}", failure);
    *lock_unpoisoned(failure_cell()) = Some(failure);
}

pub fn clear_failure() {
    *lock_unpoisoned(failure_cell()) = None;
}

pub fn last_failure() -> Option<Failure> {
    lock_unpoisoned(failure_cell()).clone()
}

/// Record panics as the last failure before handing them to the previous hook.
pub fn install_panic_hook() {
    static INSTALLED: OnceLock<()> = OnceLock::new();
    if INSTALLED.set(()).is_err() {
        return;
    }
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        report_failure("panic", format_panic(info));
        default_hook(info);
    }));
}

fn format_panic(info: &PanicHookInfo<'_>) -> String {
    let payload = if let Some(text) = info.payload().downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = info.payload().downcast_ref::<String>() {
        text.clone()
    } else {
        "unknown panic payload".to_string()
    };
    let location = info
        .location()
        .map(|loc| format!("{}:{}", loc.file(), loc.line()))
        .unwrap_or_else(|| "<unknown>".to_string());
    format!("{} ({})", payload, location)
}

#[cfg(test)]
mod tests {
    use super::*;

    // One test: the failure slot and the panic hook are process-wide.
    #[test]
    fn failures_and_panics_are_recorded() {
        report_failure("hooks", "move site rejected");
        assert_eq!(
            last_failure(),
            Some(Failure {
                origin: "hooks".to_string(),
                message: "move site rejected".to_string(),
            })
        );
        clear_failure();
        assert_eq!(last_failure(), None);

        install_panic_hook();
        let result = panic::catch_unwind(|| panic!("tick exploded"));
        assert!(result.is_err());
        let failure = last_failure().unwrap();
        assert_eq!(failure.origin, "panic");
        assert!(failure.message.starts_with("tick exploded"));
        clear_failure();
    }
}
