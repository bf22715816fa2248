//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!
//! Consumers:
//!     → stdout via tracing-subscriber fmt layer
//! ```
//!
//! # Design Decisions
//! - Transaction ID, channel and chaincode travel as structured fields
//! - HTTP requests carry an `x-request-id` through the trace layer

pub mod logging;
