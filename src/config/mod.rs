//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML) or built-in defaults
//!     → loader.rs (parse & deserialize, MSP_ID / CHANNEL_NAME / CHAINCODE_NAME overrides)
//!     → validation.rs (semantic checks)
//!     → ClientConfig (validated, immutable)
//!     → shared via Arc with every call
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; no call can change another call's binding
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_default_config, ConfigError};
pub use schema::ClientConfig;
pub use schema::{GatewayConfig, HttpConfig, IdentityConfig, NetworkConfig, TimeoutConfig};
