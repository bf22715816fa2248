//! HTTP trigger subsystem.
//!
//! # Data Flow
//! ```text
//! HTTP request
//!     → server.rs (request ID, tracing, timeout, handler)
//!     → assets::AssetService (one gateway call)
//!     → response.rs (error mapping)
//!     → Send to client
//! ```

pub mod response;
pub mod server;

pub use response::ApiError;
pub use server::{router, HttpServer};
