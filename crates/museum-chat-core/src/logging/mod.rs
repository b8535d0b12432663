//! Logging abstractions shared by every component
//!
//! Components take an `Arc<dyn Logger>` so the host decides where output goes
//! (console, the desktop shell's devtools, nothing at all in tests).

mod traits;
mod noop;
mod console;

pub use traits::{Logger, LoggerExt, SharedLogger};
pub use noop::NoOpLogger;
pub use console::ConsoleLogger;
