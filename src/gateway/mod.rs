//! Ledger gateway subsystem.
//!
//! # Data Flow
//! ```text
//! Identity + Signer + channel client + TimeoutPolicy
//!     → session.rs (Gateway: one session per call)
//!     → contract.rs (Network / Contract references borrowed from the session)
//!     → proposal.rs (PROPOSE: build and sign the proposal)
//!     → transaction.rs (ENDORSE → SUBMIT → COMMIT_STATUS, or EVALUATE)
//!     → client.rs (gRPC calls with per-phase deadlines)
//! ```
//!
//! # Error Constraints
//! - Every phase failure names its phase and transaction ID
//! - Timeouts are distinct from rejections
//! - Nothing is retried internally

pub mod client;
pub mod contract;
pub mod proposal;
pub mod protos;
pub mod session;
pub mod transaction;
pub mod types;

pub use client::{GatewayRpc, GrpcGateway, RpcError};
pub use contract::{Contract, Network, SubmittedTransaction};
pub use proposal::ProposalOptions;
pub use protos::TxValidationCode;
pub use session::Gateway;
pub use types::{CommitStatus, GatewayError, GatewayResult, Phase, PhaseFailure, TimeoutPolicy};
