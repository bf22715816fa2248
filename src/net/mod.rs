//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Trusted TLS certificate + gateway settings
//!     → tls.rs (pinned root, authority override, endpoint)
//!     → channel.rs (connect, hand out RPC clients, close)
//!     → connection.rs (in-flight call tracking for bounded close)
//!
//! Channel States:
//!     Open → Closing (new calls refused, draining) → Closed
//! ```
//!
//! # Design Decisions
//! - Trust is pinned to one certificate, not a public CA bundle
//! - Close waits at most the shutdown grace, then drops the transport
//! - Connector/Connection traits let callers substitute the network

pub mod channel;
pub mod connection;
pub mod tls;

pub use channel::{Connection, Connector, SecureChannel, TlsConnector};
pub use connection::{CallGuard, CallTracker};
