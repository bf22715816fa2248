//! Gateway error taxonomy, timeout policy and commit status types.

use std::fmt;
use std::time::Duration;

use prost::Message;
use thiserror::Error;

use crate::gateway::protos::{rpc, ErrorDetail, TxValidationCode, ERROR_DETAIL_TYPE};

/// Default deadline for read-only evaluation.
pub const DEFAULT_EVALUATE_TIMEOUT: Duration = Duration::from_secs(5);
/// Default deadline for collecting endorsements.
pub const DEFAULT_ENDORSE_TIMEOUT: Duration = Duration::from_secs(15);
/// Default deadline for handing the transaction to the ordering service.
pub const DEFAULT_SUBMIT_TIMEOUT: Duration = Duration::from_secs(5);
/// Default deadline for the commit status wait.
pub const DEFAULT_COMMIT_STATUS_TIMEOUT: Duration = Duration::from_secs(60);
/// Upper bound accepted for any single phase deadline.
pub const MAX_PHASE_TIMEOUT: Duration = Duration::from_secs(3600);

/// A network round trip of the transaction lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Evaluate,
    Endorse,
    Submit,
    CommitStatus,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Evaluate => "evaluate",
            Phase::Endorse => "endorse",
            Phase::Submit => "submit",
            Phase::CommitStatus => "commit_status",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Independent deadlines for each lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutPolicy {
    pub evaluate: Duration,
    pub endorse: Duration,
    pub submit: Duration,
    pub commit_status: Duration,
}

impl Default for TimeoutPolicy {
    fn default() -> Self {
        Self {
            evaluate: DEFAULT_EVALUATE_TIMEOUT,
            endorse: DEFAULT_ENDORSE_TIMEOUT,
            submit: DEFAULT_SUBMIT_TIMEOUT,
            commit_status: DEFAULT_COMMIT_STATUS_TIMEOUT,
        }
    }
}

impl TimeoutPolicy {
    /// Deadline that governs the given phase.
    pub fn deadline(&self, phase: Phase) -> Duration {
        match phase {
            Phase::Evaluate => self.evaluate,
            Phase::Endorse => self.endorse,
            Phase::Submit => self.submit,
            Phase::CommitStatus => self.commit_status,
        }
    }

    /// Check every deadline is within [`MAX_PHASE_TIMEOUT`].
    ///
    /// A zero deadline is accepted; the phase it governs fails immediately.
    pub fn validate(&self) -> GatewayResult<()> {
        for phase in [Phase::Evaluate, Phase::Endorse, Phase::Submit, Phase::CommitStatus] {
            let deadline = self.deadline(phase);
            if deadline > MAX_PHASE_TIMEOUT {
                return Err(GatewayError::Config(format!(
                    "{} deadline {:?} exceeds maximum {:?}",
                    phase, deadline, MAX_PHASE_TIMEOUT
                )));
            }
        }
        Ok(())
    }
}

/// Why a lifecycle phase failed.
#[derive(Debug, Clone, PartialEq)]
pub enum PhaseFailure {
    /// The phase deadline elapsed before the remote side answered.
    Timeout(Duration),
    /// The gateway answered with an error status.
    Rejected {
        code: tonic::Code,
        message: String,
        details: Vec<ErrorDetail>,
    },
    /// The chaincode responded with an error status.
    Response { status: i32, message: String },
    /// The gateway answered with a payload that could not be interpreted.
    Malformed(String),
}

impl PhaseFailure {
    pub fn is_timeout(&self) -> bool {
        matches!(self, PhaseFailure::Timeout(_))
    }

    /// Build a rejection from a gRPC status, unpacking any peer error details.
    pub fn from_status(status: &tonic::Status) -> Self {
        PhaseFailure::Rejected {
            code: status.code(),
            message: status.message().to_string(),
            details: error_details(status),
        }
    }
}

impl fmt::Display for PhaseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhaseFailure::Timeout(deadline) => write!(f, "deadline of {:?} exceeded", deadline),
            PhaseFailure::Rejected { code, message, details } => {
                write!(f, "{:?}: {}", code, message)?;
                for detail in details {
                    write!(f, "; {} ({}): {}", detail.address, detail.msp_id, detail.message)?;
                }
                Ok(())
            }
            PhaseFailure::Response { status, message } => {
                write!(f, "chaincode returned status {}: {}", status, message)
            }
            PhaseFailure::Malformed(reason) => write!(f, "malformed response: {}", reason),
        }
    }
}

fn error_details(status: &tonic::Status) -> Vec<ErrorDetail> {
    if status.details().is_empty() {
        return Vec::new();
    }
    match rpc::Status::decode(status.details()) {
        Ok(rich) => rich
            .details
            .iter()
            .filter(|any| any.type_url.ends_with(ERROR_DETAIL_TYPE))
            .filter_map(|any| ErrorDetail::decode(any.value.as_slice()).ok())
            .collect(),
        Err(e) => {
            tracing::debug!(error = %e, "Ignoring undecodable status details");
            Vec::new()
        }
    }
}

/// Errors that can occur while talking to the ledger gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Key material missing, unreadable or malformed.
    #[error("Credential error: {0}")]
    Credential(String),

    /// Transport or TLS setup failed, or the channel is closed.
    #[error("Connection error: {0}")]
    Connection(String),

    /// The remote side rejected the identity/signer pairing.
    #[error("Session rejected: {0}")]
    Session(String),

    /// A timeout policy or other setting is out of range.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Peers did not endorse the proposal.
    #[error("Endorse failed for transaction {transaction_id}: {cause}")]
    Endorse {
        transaction_id: String,
        cause: PhaseFailure,
    },

    /// The ordering service did not accept the transaction.
    #[error("Submit failed for transaction {transaction_id}: {cause}")]
    Submit {
        transaction_id: String,
        cause: PhaseFailure,
    },

    /// The transaction was committed but marked invalid.
    #[error("Transaction {transaction_id} committed with status {code:?} in block {block_number}")]
    Commit {
        transaction_id: String,
        code: TxValidationCode,
        block_number: u64,
    },

    /// Commit confirmation was not observed; the outcome is unknown.
    #[error("Commit status unavailable for transaction {transaction_id}: {cause}")]
    CommitStatus {
        transaction_id: String,
        cause: PhaseFailure,
    },

    /// The query could not be evaluated.
    #[error("Evaluate failed for transaction {transaction_id}: {cause}")]
    Evaluate {
        transaction_id: String,
        cause: PhaseFailure,
    },

    /// A result payload arrived intact but is not in the expected format.
    #[error("Could not decode result: {0}")]
    Decode(String),
}

impl GatewayError {
    /// Wrap a phase failure in the error variant for that phase.
    pub fn phase(phase: Phase, transaction_id: impl Into<String>, cause: PhaseFailure) -> Self {
        let transaction_id = transaction_id.into();
        match phase {
            Phase::Evaluate => GatewayError::Evaluate { transaction_id, cause },
            Phase::Endorse => GatewayError::Endorse { transaction_id, cause },
            Phase::Submit => GatewayError::Submit { transaction_id, cause },
            Phase::CommitStatus => GatewayError::CommitStatus { transaction_id, cause },
        }
    }

    /// Stable short name of the error class.
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::Credential(_) => "credential",
            GatewayError::Connection(_) => "connection",
            GatewayError::Session(_) => "session",
            GatewayError::Config(_) => "config",
            GatewayError::Endorse { .. } => "endorse",
            GatewayError::Submit { .. } => "submit",
            GatewayError::Commit { .. } => "commit",
            GatewayError::CommitStatus { .. } => "commit_status",
            GatewayError::Evaluate { .. } => "evaluate",
            GatewayError::Decode(_) => "decode",
        }
    }

    /// Transaction the error relates to, if it was raised after PROPOSE.
    pub fn transaction_id(&self) -> Option<&str> {
        match self {
            GatewayError::Endorse { transaction_id, .. }
            | GatewayError::Submit { transaction_id, .. }
            | GatewayError::Commit { transaction_id, .. }
            | GatewayError::CommitStatus { transaction_id, .. }
            | GatewayError::Evaluate { transaction_id, .. } => Some(transaction_id),
            _ => None,
        }
    }

    /// True when a phase deadline elapsed.
    pub fn is_timeout(&self) -> bool {
        match self {
            GatewayError::Endorse { cause, .. }
            | GatewayError::Submit { cause, .. }
            | GatewayError::CommitStatus { cause, .. }
            | GatewayError::Evaluate { cause, .. } => cause.is_timeout(),
            _ => false,
        }
    }
}

/// Result type for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Outcome of the commit status phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitStatus {
    pub transaction_id: String,
    pub code: TxValidationCode,
    pub block_number: u64,
}

impl CommitStatus {
    /// True when validators accepted the transaction.
    pub fn is_successful(&self) -> bool {
        self.code == TxValidationCode::Valid
    }
}
