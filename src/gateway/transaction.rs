//! Transaction lifecycle phases.
//!
//! # State Machine
//! ```text
//! write: PROPOSE → ENDORSE → SUBMIT → COMMIT_STATUS
//! read:  PROPOSE → EVALUATE
//! ```
//!
//! Each network phase runs under its own deadline and fails with the error
//! variant of that phase. Nothing is retried; the first failure ends the run.

use std::future::Future;
use std::time::Duration;

use prost::Message;
use tonic::Code;

use crate::gateway::client::{GatewayRpc, RpcError};
use crate::gateway::proposal::PreparedProposal;
use crate::gateway::protos::common::{Envelope, Payload};
use crate::gateway::protos::gateway::{
    CommitStatusRequest, EndorseRequest, EvaluateRequest, SignedCommitStatusRequest, SubmitRequest,
};
use crate::gateway::protos::peer::{
    ChaincodeAction, ChaincodeActionPayload, ProposalResponsePayload, Transaction, TxValidationCode,
};
use crate::gateway::types::{CommitStatus, GatewayError, GatewayResult, Phase, PhaseFailure};
use crate::identity::Signer;

/// First chaincode status code treated as an error response.
const ERROR_STATUS_THRESHOLD: i32 = 400;

/// An endorsed transaction awaiting submission.
#[derive(Debug, Clone)]
pub struct EndorsedTransaction {
    pub transaction_id: String,
    pub channel_name: String,
    pub envelope: Envelope,
    pub result: Vec<u8>,
}

/// Run one RPC under the phase deadline and classify its failure.
async fn run_phase<T, F>(
    phase: Phase,
    transaction_id: &str,
    deadline: Duration,
    call: F,
) -> GatewayResult<T>
where
    F: Future<Output = Result<T, RpcError>>,
{
    // A zero budget is already spent; do not put the request on the wire.
    if deadline.is_zero() {
        return Err(GatewayError::phase(phase, transaction_id, PhaseFailure::Timeout(deadline)));
    }

    tracing::debug!(phase = %phase, transaction_id = %transaction_id, deadline = ?deadline, "Phase started");

    match tokio::time::timeout(deadline, call).await {
        Ok(Ok(response)) => Ok(response),
        Ok(Err(RpcError::ChannelClosed)) => Err(GatewayError::Connection(format!(
            "Channel closed before {} of transaction {}",
            phase, transaction_id
        ))),
        Ok(Err(RpcError::Status(status))) => {
            // After SUBMIT the orderer holds the transaction; the outcome stays open.
            if phase != Phase::CommitStatus
                && matches!(status.code(), Code::Unauthenticated | Code::PermissionDenied)
            {
                return Err(GatewayError::Session(format!(
                    "{} rejected by gateway: {}",
                    phase,
                    status.message()
                )));
            }
            if status.code() == Code::DeadlineExceeded {
                return Err(GatewayError::phase(phase, transaction_id, PhaseFailure::Timeout(deadline)));
            }
            Err(GatewayError::phase(phase, transaction_id, PhaseFailure::from_status(&status)))
        }
        Err(_) => {
            tracing::warn!(phase = %phase, transaction_id = %transaction_id, deadline = ?deadline, "Phase deadline exceeded");
            Err(GatewayError::phase(phase, transaction_id, PhaseFailure::Timeout(deadline)))
        }
    }
}

/// ENDORSE: collect endorsements and extract the chaincode result.
pub async fn endorse(
    client: &dyn GatewayRpc,
    proposal: PreparedProposal,
    deadline: Duration,
) -> GatewayResult<EndorsedTransaction> {
    let transaction_id = proposal.transaction_id.clone();
    let request = EndorseRequest {
        transaction_id: proposal.transaction_id,
        channel_id: proposal.channel_name.clone(),
        proposed_transaction: Some(proposal.signed),
        endorsing_organizations: proposal.endorsing_organizations,
    };

    let response = run_phase(
        Phase::Endorse,
        &transaction_id,
        deadline,
        client.endorse(request, deadline),
    )
    .await?;

    let envelope = response.prepared_transaction.ok_or_else(|| {
        GatewayError::phase(
            Phase::Endorse,
            &transaction_id,
            PhaseFailure::Malformed("no prepared transaction".to_string()),
        )
    })?;
    let result = transaction_result(&envelope).map_err(|reason| {
        GatewayError::phase(Phase::Endorse, &transaction_id, PhaseFailure::Malformed(reason))
    })?;

    Ok(EndorsedTransaction {
        transaction_id,
        channel_name: proposal.channel_name,
        envelope,
        result,
    })
}

/// SUBMIT: sign the endorsed envelope and hand it to the ordering service.
pub async fn submit(
    client: &dyn GatewayRpc,
    signer: &dyn Signer,
    endorsed: &EndorsedTransaction,
    deadline: Duration,
) -> GatewayResult<()> {
    let mut envelope = endorsed.envelope.clone();
    envelope.signature = signer.sign(&envelope.payload)?;

    let request = SubmitRequest {
        transaction_id: endorsed.transaction_id.clone(),
        channel_id: endorsed.channel_name.clone(),
        prepared_transaction: Some(envelope),
    };

    run_phase(
        Phase::Submit,
        &endorsed.transaction_id,
        deadline,
        client.submit(request, deadline),
    )
    .await?;
    Ok(())
}

/// COMMIT_STATUS: wait for the committing peers' verdict.
pub async fn commit_status(
    client: &dyn GatewayRpc,
    signer: &dyn Signer,
    creator: &[u8],
    transaction_id: &str,
    channel_name: &str,
    deadline: Duration,
) -> GatewayResult<CommitStatus> {
    let request = CommitStatusRequest {
        transaction_id: transaction_id.to_string(),
        channel_id: channel_name.to_string(),
        identity: creator.to_vec(),
    }
    .encode_to_vec();
    let signature = signer.sign(&request)?;

    let response = run_phase(
        Phase::CommitStatus,
        transaction_id,
        deadline,
        client.commit_status(SignedCommitStatusRequest { request, signature }, deadline),
    )
    .await?;

    let code = TxValidationCode::try_from(response.result).unwrap_or_else(|_| {
        tracing::warn!(transaction_id = %transaction_id, code = response.result, "Unknown validation code");
        TxValidationCode::InvalidOtherReason
    });

    Ok(CommitStatus {
        transaction_id: transaction_id.to_string(),
        code,
        block_number: response.block_number,
    })
}

/// EVALUATE: run the proposal on a single peer and return its result.
pub async fn evaluate(
    client: &dyn GatewayRpc,
    proposal: PreparedProposal,
    deadline: Duration,
) -> GatewayResult<Vec<u8>> {
    let transaction_id = proposal.transaction_id.clone();
    let request = EvaluateRequest {
        transaction_id: proposal.transaction_id,
        channel_id: proposal.channel_name,
        proposed_transaction: Some(proposal.signed),
        target_organizations: proposal.endorsing_organizations,
    };

    let response = run_phase(
        Phase::Evaluate,
        &transaction_id,
        deadline,
        client.evaluate(request, deadline),
    )
    .await?;

    let result = response.result.ok_or_else(|| {
        GatewayError::phase(
            Phase::Evaluate,
            &transaction_id,
            PhaseFailure::Malformed("no result".to_string()),
        )
    })?;
    if result.status >= ERROR_STATUS_THRESHOLD {
        return Err(GatewayError::phase(
            Phase::Evaluate,
            &transaction_id,
            PhaseFailure::Response {
                status: result.status,
                message: result.message,
            },
        ));
    }
    Ok(result.payload)
}

/// Dig the chaincode response payload out of a prepared transaction.
///
/// Envelope → Payload → Transaction → first action → ChaincodeActionPayload
/// → ProposalResponsePayload → ChaincodeAction → Response.
fn transaction_result(envelope: &Envelope) -> Result<Vec<u8>, String> {
    let payload = Payload::decode(envelope.payload.as_slice())
        .map_err(|e| format!("payload: {}", e))?;
    let transaction = Transaction::decode(payload.data.as_slice())
        .map_err(|e| format!("transaction: {}", e))?;
    let action = transaction
        .actions
        .first()
        .ok_or_else(|| "transaction has no actions".to_string())?;
    let action_payload = ChaincodeActionPayload::decode(action.payload.as_slice())
        .map_err(|e| format!("chaincode action payload: {}", e))?;
    let endorsed_action = action_payload
        .action
        .ok_or_else(|| "no endorsed action".to_string())?;
    let response_payload =
        ProposalResponsePayload::decode(endorsed_action.proposal_response_payload.as_slice())
            .map_err(|e| format!("proposal response payload: {}", e))?;
    let chaincode_action = ChaincodeAction::decode(response_payload.extension.as_slice())
        .map_err(|e| format!("chaincode action: {}", e))?;

    Ok(chaincode_action
        .response
        .map(|response| response.payload)
        .unwrap_or_default())
}
