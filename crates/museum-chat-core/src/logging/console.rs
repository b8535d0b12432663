//! Console logger implementation

use super::traits::Logger;

/// A logger that writes to stdout/stderr
#[derive(Debug, Clone)]
pub struct ConsoleLogger {
    prefix: String,
    verbose: bool,
}

impl Default for ConsoleLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleLogger {
    /// Create a console logger with the default prefix
    ///
    /// Debug output is enabled when `MUSEUM_CHAT_DEBUG` is `1` or `true`.
    pub fn new() -> Self {
        let verbose = std::env::var("MUSEUM_CHAT_DEBUG")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        Self {
            prefix: "[MuseumChat]".to_string(),
            verbose,
        }
    }

    /// Create a console logger with a custom prefix
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            ..Self::new()
        }
    }

    /// Force debug output on or off
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

impl Logger for ConsoleLogger {
    fn debug(&self, message: &str) {
        if self.verbose {
            eprintln!("{} DEBUG: {}", self.prefix, message);
        }
    }

    fn info(&self, message: &str) {
        println!("{} INFO: {}", self.prefix, message);
    }

    fn warn(&self, message: &str) {
        eprintln!("{} WARN: {}", self.prefix, message);
    }

    fn error(&self, message: &str) {
        eprintln!("{} ERROR: {}", self.prefix, message);
    }
}
