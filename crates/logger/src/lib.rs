use std::{fmt::Display, sync::Arc, sync::Mutex};

use anyhow::anyhow;

/// Sink for progress and diagnostic messages.
///
/// Callers that share a logger between concurrently running fragment loads
/// add their own `Send + Sync` bounds.
pub trait Logger {
    fn log(&self, message: impl Display);
    fn warn(&self, message: impl Display) {
        self.log(format!("WARN: {}", message));
    }
    fn error(&self, message: impl Display) {
        self.log(format!("ERROR: {}", message));
    }
}

/// Logs only in debug builds.
#[macro_export]
macro_rules! debug_logf {
    ($logger:expr, $fmt:expr $(, $arg:expr)*) => {
        if cfg!(debug_assertions) {
            $logger.log(format!($fmt $(, $arg)*));
        }
    };
}

impl<T: Logger> Logger for &T {
    fn log(&self, message: impl Display) {
        (*self).log(message);
    }
    fn warn(&self, message: impl Display) {
        (*self).warn(message);
    }
    fn error(&self, message: impl Display) {
        (*self).error(message);
    }
}

impl<T: Logger> Logger for Arc<T> {
    fn log(&self, message: impl Display) {
        self.as_ref().log(message);
    }
    fn warn(&self, message: impl Display) {
        self.as_ref().warn(message);
    }
    fn error(&self, message: impl Display) {
        self.as_ref().error(message);
    }
}

/// Writes timestamped messages to stdout.
pub struct StdioLogger {
    zero_time: std::time::Instant,
}
impl Logger for StdioLogger {
    fn log(&self, message: impl Display) {
        let delta_time = std::time::Instant::now().duration_since(self.zero_time);
        println!("[{:.04}] {}", delta_time.as_secs_f64(), message);
    }
}
impl StdioLogger {
    pub fn new() -> Self {
        Self {
            zero_time: std::time::Instant::now(),
        }
    }
}
impl Default for StdioLogger {
    fn default() -> Self {
        Self::new()
    }
}

/// Drops every message.
#[derive(Clone, Copy, Default)]
pub struct NullLogger;
impl Logger for NullLogger {
    fn log(&self, _message: impl Display) {}
}

/// Collects messages in memory, for assertions in tests.
pub struct VecLogger {
    logs: Mutex<Vec<String>>,
}

impl Logger for VecLogger {
    fn log(&self, message: impl Display) {
        self.logs
            .lock()
            .expect("locking the logger array should not fail!")
            .push(format!("{}", message));
    }
}
impl VecLogger {
    pub fn new() -> Self {
        Self {
            logs: Mutex::new(Vec::new()),
        }
    }

    pub fn get_logs(self) -> Result<Vec<String>, anyhow::Error> {
        self.logs
            .into_inner()
            .map_err(|err| anyhow!("error unlocking VecLogger logs:{err}"))
    }

    /// Copies out the messages logged so far without consuming the logger.
    pub fn snapshot(&self) -> Vec<String> {
        match self.logs.lock() {
            Ok(logs) => logs.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}
impl Default for VecLogger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn vec_logger_prefixes_levels() {
        let logger = VecLogger::new();
        logger.log("plain");
        logger.warn("careful");
        (&logger).error("broken");
        assert_eq!(
            logger.get_logs().unwrap(),
            vec!["plain", "WARN: careful", "ERROR: broken"]
        );
    }

    #[test]
    fn shared_logger_forwards() {
        let logger = Arc::new(VecLogger::new());
        let shared = logger.clone();
        shared.warn("from a clone");
        assert_eq!(logger.snapshot(), vec!["WARN: from a clone"]);
    }
}
