//! Transaction proposal construction (the PROPOSE phase).

use std::collections::HashMap;
use std::time::SystemTime;

use prost::Message;
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::gateway::protos::common::{ChannelHeader, Header, SignatureHeader, ENDORSER_TRANSACTION};
use crate::gateway::protos::peer::{
    ChaincodeHeaderExtension, ChaincodeId, ChaincodeInput, ChaincodeInvocationSpec,
    ChaincodeProposalPayload, ChaincodeSpec, Proposal, SignedProposal,
};
use crate::gateway::types::GatewayResult;
use crate::identity::Signer;

/// Nonce length used for transaction IDs.
pub const NONCE_LENGTH: usize = 24;

/// Optional proposal settings beyond function name and arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProposalOptions {
    /// Private data passed to the chaincode but not recorded on the ledger.
    pub transient: HashMap<String, Vec<u8>>,
    /// Organizations that must endorse (write) or evaluate (read) the proposal.
    /// Empty lets the gateway choose.
    pub endorsing_organizations: Vec<String>,
}

/// A signed proposal ready to send to the gateway.
#[derive(Debug, Clone)]
pub struct PreparedProposal {
    pub transaction_id: String,
    pub channel_name: String,
    pub signed: SignedProposal,
    pub endorsing_organizations: Vec<String>,
}

/// Everything needed to describe one chaincode invocation.
#[derive(Debug, Clone, Copy)]
pub struct Invocation<'a> {
    pub channel_name: &'a str,
    pub chaincode_name: &'a str,
    pub function: &'a str,
    pub args: &'a [&'a str],
    pub options: &'a ProposalOptions,
}

/// Transaction ID derived from nonce and creator: hex(SHA-256(nonce ‖ creator)).
pub fn transaction_id(nonce: &[u8], creator: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(nonce);
    hasher.update(creator);
    hex::encode(hasher.finalize())
}

/// Build and sign a proposal with a fresh random nonce.
pub fn build_proposal(
    creator: &[u8],
    signer: &dyn Signer,
    invocation: Invocation<'_>,
) -> GatewayResult<PreparedProposal> {
    let mut nonce = vec![0u8; NONCE_LENGTH];
    rand::thread_rng().fill_bytes(&mut nonce);
    build_proposal_with_nonce(creator, signer, invocation, nonce)
}

fn build_proposal_with_nonce(
    creator: &[u8],
    signer: &dyn Signer,
    invocation: Invocation<'_>,
    nonce: Vec<u8>,
) -> GatewayResult<PreparedProposal> {
    let transaction_id = transaction_id(&nonce, creator);
    let chaincode_id = ChaincodeId {
        name: invocation.chaincode_name.to_string(),
        ..ChaincodeId::default()
    };

    let channel_header = ChannelHeader {
        r#type: ENDORSER_TRANSACTION,
        timestamp: Some(prost_types::Timestamp::from(SystemTime::now())),
        channel_id: invocation.channel_name.to_string(),
        tx_id: transaction_id.clone(),
        extension: ChaincodeHeaderExtension {
            chaincode_id: Some(chaincode_id.clone()),
        }
        .encode_to_vec(),
        ..ChannelHeader::default()
    };
    let signature_header = SignatureHeader {
        creator: creator.to_vec(),
        nonce,
    };
    let header = Header {
        channel_header: channel_header.encode_to_vec(),
        signature_header: signature_header.encode_to_vec(),
    };

    let mut args = Vec::with_capacity(invocation.args.len() + 1);
    args.push(invocation.function.as_bytes().to_vec());
    args.extend(invocation.args.iter().map(|arg| arg.as_bytes().to_vec()));

    let invocation_spec = ChaincodeInvocationSpec {
        chaincode_spec: Some(ChaincodeSpec {
            chaincode_id: Some(chaincode_id),
            input: Some(ChaincodeInput {
                args,
                ..ChaincodeInput::default()
            }),
            ..ChaincodeSpec::default()
        }),
    };
    let payload = ChaincodeProposalPayload {
        input: invocation_spec.encode_to_vec(),
        transient_map: invocation.options.transient.clone(),
    };

    let proposal_bytes = Proposal {
        header: header.encode_to_vec(),
        payload: payload.encode_to_vec(),
        extension: Vec::new(),
    }
    .encode_to_vec();
    let signature = signer.sign(&proposal_bytes)?;

    Ok(PreparedProposal {
        transaction_id,
        channel_name: invocation.channel_name.to_string(),
        signed: SignedProposal {
            proposal_bytes,
            signature,
        },
        endorsing_organizations: invocation.options.endorsing_organizations.clone(),
    })
}
