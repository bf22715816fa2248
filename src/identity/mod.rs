//! Credential loading subsystem.
//!
//! # Data Flow
//! ```text
//! crypto materials root
//!     → credentials.rs (identity certificate, trusted TLS certificate)
//!     → signer.rs (single key file → signing capability)
//!     → Gateway session (identity + signer)
//! ```
//!
//! # Security Constraints
//! - Private keys are read from disk once per call and never logged
//! - Malformed input is always an error, never an empty value
//! - Loading happens before any network I/O

pub mod credentials;
pub mod signer;

pub use credentials::{load_identity, load_trusted_server_cert, Certificate, Identity};
pub use signer::{load_signer, PrivateKeySigner, Signer};
