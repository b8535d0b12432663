//! No-op logger implementation

use super::traits::Logger;

/// A logger that does nothing
///
/// Used by tests and by hosts that only care about events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpLogger;

impl NoOpLogger {
    pub fn new() -> Self {
        Self
    }
}

impl Logger for NoOpLogger {
    fn debug(&self, _message: &str) {}
    fn info(&self, _message: &str) {}
    fn warn(&self, _message: &str) {}
    fn error(&self, _message: &str) {}
}
