//! Tool discovery and invocation
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  ToolRegistry                               │
//! │    - Fetches tools via MCP tools/list       │
//! │    - Keeps them in provider order           │
//! ├─────────────────────────────────────────────┤
//! │  ToolInvoker                                │
//! │    - tools/call with retry on status 500    │
//! │    - Parses the content-block envelope      │
//! └─────────────────────────────────────────────┘
//!           │
//!           │ ToolTransport (list_tools, call_tool)
//!           ▼
//! ┌─────────────────────────────────────────────┐
//! │  Museum collection MCP server               │
//! │    search_artwork, get_artwork_details,     │
//! │    get_artwork_image, get_user_sets, ...    │
//! └─────────────────────────────────────────────┘
//! ```

mod error;
mod transport;
mod registry;
mod invoker;
mod mock;

pub use error::{status_from_text, ToolError, ToolResult};
pub use transport::ToolTransport;
pub use registry::ToolRegistry;
pub use invoker::{RetryPolicy, ToolInvoker};
pub use mock::MockTransport;

/// Names of the tools exposed by the Rijksmuseum MCP server
pub mod names {
    pub const SEARCH_ARTWORK: &str = "search_artwork";
    pub const GET_ARTWORK_DETAILS: &str = "get_artwork_details";
    pub const GET_ARTWORK_IMAGE: &str = "get_artwork_image";
    pub const GET_USER_SETS: &str = "get_user_sets";
    pub const GET_USER_SET_DETAILS: &str = "get_user_set_details";
    pub const OPEN_IMAGE_IN_BROWSER: &str = "open_image_in_browser";
    pub const GET_ARTIST_TIMELINE: &str = "get_artist_timeline";
}
