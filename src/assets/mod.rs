//! Asset contract operations.
//!
//! # Data Flow
//! ```text
//! caller (CLI / HTTP)
//!     → service.rs (credentials → connection → session → contract call → close)
//!     → format.rs (asset records, pretty JSON)
//! ```

pub mod format;
pub mod service;

pub use format::{parse_assets, pretty_json, Asset};
pub use service::AssetService;
