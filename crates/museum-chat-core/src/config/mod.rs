//! App configuration
//!
//! - `AppConfig`: model backend and collection server settings
//! - `FileConfigProvider`: user-level YAML file
//! - `MemoryConfigProvider`: in-memory, for tests

mod traits;
mod settings;
mod memory;
mod file;

pub use traits::{ConfigError, ConfigProvider, ConfigResult};
pub use settings::{
    AppConfig, LlmSettings, McpSettings, McpTransportKind, COLLECTION_KEY_ENV, COLLECTION_SECRET,
    MODEL_ENV, PROVIDER_ENV,
};
pub use memory::MemoryConfigProvider;
pub use file::FileConfigProvider;
