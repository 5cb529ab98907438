//! Injected logging capability used by `RecordStore`.
//!
//! `GlobalLog` forwards to the `log` facade (and so to whatever backend
//! `init_logging` installed). `CapturedLog` keeps lines in memory.

use std::sync::{Mutex, PoisonError};

/// Leveled sink for operation events.
pub trait OperationLog: Send + Sync {
    fn info(&self, message: &str);
    fn error(&self, message: &str);
}

/// Forwards to the process-wide `log` facade under the `recordstore` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalLog;

impl OperationLog for GlobalLog {
    fn info(&self, message: &str) {
        log::info!(target: "recordstore", "{message}");
    }

    fn error(&self, message: &str) {
        log::error!(target: "recordstore", "{message}");
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapturedLevel {
    Info,
    Error,
}

/// In-memory sink that preserves emission order.
#[derive(Debug, Default)]
pub struct CapturedLog {
    lines: Mutex<Vec<(CapturedLevel, String)>>,
}

impl CapturedLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// All captured lines, oldest first.
    pub fn lines(&self) -> Vec<(CapturedLevel, String)> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.lines()
            .into_iter()
            .map(|(_, message)| message)
            .collect()
    }

    fn push(&self, level: CapturedLevel, message: &str) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((level, message.to_string()));
    }
}

impl OperationLog for CapturedLog {
    fn info(&self, message: &str) {
        self.push(CapturedLevel::Info, message);
    }

    fn error(&self, message: &str) {
        self.push(CapturedLevel::Error, message);
    }
}

#[cfg(test)]
mod tests {
    use super::{CapturedLevel, CapturedLog, OperationLog};

    #[test]
    fn captured_log_keeps_order_and_level() {
        let log = CapturedLog::new();
        log.info("first");
        log.error("second");

        assert_eq!(
            log.lines(),
            vec![
                (CapturedLevel::Info, "first".to_string()),
                (CapturedLevel::Error, "second".to_string()),
            ]
        );
    }
}
