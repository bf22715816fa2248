//! Protobuf messages spoken by the ledger gateway service.
//!
//! A hand-maintained subset of the upstream `common`, `msp`, `peer`,
//! `gateway` and `google.rpc` packages. Only the messages the client builds
//! or inspects are declared; field tags follow the upstream `.proto` files
//! so the encodings are wire compatible.

/// `common` package: envelopes and headers.
pub mod common {
    /// Header type of an endorser transaction.
    pub const ENDORSER_TRANSACTION: i32 = 3;

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Envelope {
        #[prost(bytes = "vec", tag = "1")]
        pub payload: ::prost::alloc::vec::Vec<u8>,
        #[prost(bytes = "vec", tag = "2")]
        pub signature: ::prost::alloc::vec::Vec<u8>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Payload {
        #[prost(message, optional, tag = "1")]
        pub header: ::core::option::Option<Header>,
        #[prost(bytes = "vec", tag = "2")]
        pub data: ::prost::alloc::vec::Vec<u8>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Header {
        #[prost(bytes = "vec", tag = "1")]
        pub channel_header: ::prost::alloc::vec::Vec<u8>,
        #[prost(bytes = "vec", tag = "2")]
        pub signature_header: ::prost::alloc::vec::Vec<u8>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct ChannelHeader {
        #[prost(int32, tag = "1")]
        pub r#type: i32,
        #[prost(int32, tag = "2")]
        pub version: i32,
        #[prost(message, optional, tag = "3")]
        pub timestamp: ::core::option::Option<::prost_types::Timestamp>,
        #[prost(string, tag = "4")]
        pub channel_id: ::prost::alloc::string::String,
        #[prost(string, tag = "5")]
        pub tx_id: ::prost::alloc::string::String,
        #[prost(uint64, tag = "6")]
        pub epoch: u64,
        #[prost(bytes = "vec", tag = "7")]
        pub extension: ::prost::alloc::vec::Vec<u8>,
        #[prost(bytes = "vec", tag = "8")]
        pub tls_cert_hash: ::prost::alloc::vec::Vec<u8>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct SignatureHeader {
        #[prost(bytes = "vec", tag = "1")]
        pub creator: ::prost::alloc::vec::Vec<u8>,
        #[prost(bytes = "vec", tag = "2")]
        pub nonce: ::prost::alloc::vec::Vec<u8>,
    }
}

/// `msp` package: serialized client identity.
pub mod msp {
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct SerializedIdentity {
        #[prost(string, tag = "1")]
        pub mspid: ::prost::alloc::string::String,
        #[prost(bytes = "vec", tag = "2")]
        pub id_bytes: ::prost::alloc::vec::Vec<u8>,
    }
}

/// `protos` package: proposals, chaincode invocation and transactions.
pub mod peer {
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct SignedProposal {
        #[prost(bytes = "vec", tag = "1")]
        pub proposal_bytes: ::prost::alloc::vec::Vec<u8>,
        #[prost(bytes = "vec", tag = "2")]
        pub signature: ::prost::alloc::vec::Vec<u8>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Proposal {
        #[prost(bytes = "vec", tag = "1")]
        pub header: ::prost::alloc::vec::Vec<u8>,
        #[prost(bytes = "vec", tag = "2")]
        pub payload: ::prost::alloc::vec::Vec<u8>,
        #[prost(bytes = "vec", tag = "3")]
        pub extension: ::prost::alloc::vec::Vec<u8>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct ChaincodeHeaderExtension {
        #[prost(message, optional, tag = "2")]
        pub chaincode_id: ::core::option::Option<ChaincodeId>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct ChaincodeProposalPayload {
        #[prost(bytes = "vec", tag = "1")]
        pub input: ::prost::alloc::vec::Vec<u8>,
        #[prost(map = "string, bytes", tag = "2")]
        pub transient_map:
            ::std::collections::HashMap<::prost::alloc::string::String, ::prost::alloc::vec::Vec<u8>>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct ChaincodeId {
        #[prost(string, tag = "1")]
        pub path: ::prost::alloc::string::String,
        #[prost(string, tag = "2")]
        pub name: ::prost::alloc::string::String,
        #[prost(string, tag = "3")]
        pub version: ::prost::alloc::string::String,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct ChaincodeInput {
        #[prost(bytes = "vec", repeated, tag = "1")]
        pub args: ::prost::alloc::vec::Vec<::prost::alloc::vec::Vec<u8>>,
        #[prost(map = "string, bytes", tag = "2")]
        pub decorations:
            ::std::collections::HashMap<::prost::alloc::string::String, ::prost::alloc::vec::Vec<u8>>,
        #[prost(bool, tag = "3")]
        pub is_init: bool,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct ChaincodeSpec {
        #[prost(int32, tag = "1")]
        pub r#type: i32,
        #[prost(message, optional, tag = "2")]
        pub chaincode_id: ::core::option::Option<ChaincodeId>,
        #[prost(message, optional, tag = "3")]
        pub input: ::core::option::Option<ChaincodeInput>,
        #[prost(int32, tag = "4")]
        pub timeout: i32,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct ChaincodeInvocationSpec {
        #[prost(message, optional, tag = "1")]
        pub chaincode_spec: ::core::option::Option<ChaincodeSpec>,
    }

    /// Chaincode response returned by a peer.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Response {
        #[prost(int32, tag = "1")]
        pub status: i32,
        #[prost(string, tag = "2")]
        pub message: ::prost::alloc::string::String,
        #[prost(bytes = "vec", tag = "3")]
        pub payload: ::prost::alloc::vec::Vec<u8>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Transaction {
        #[prost(message, repeated, tag = "1")]
        pub actions: ::prost::alloc::vec::Vec<TransactionAction>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct TransactionAction {
        #[prost(bytes = "vec", tag = "1")]
        pub header: ::prost::alloc::vec::Vec<u8>,
        #[prost(bytes = "vec", tag = "2")]
        pub payload: ::prost::alloc::vec::Vec<u8>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct ChaincodeActionPayload {
        #[prost(bytes = "vec", tag = "1")]
        pub chaincode_proposal_payload: ::prost::alloc::vec::Vec<u8>,
        #[prost(message, optional, tag = "2")]
        pub action: ::core::option::Option<ChaincodeEndorsedAction>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct ChaincodeEndorsedAction {
        #[prost(bytes = "vec", tag = "1")]
        pub proposal_response_payload: ::prost::alloc::vec::Vec<u8>,
        #[prost(message, repeated, tag = "2")]
        pub endorsements: ::prost::alloc::vec::Vec<Endorsement>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Endorsement {
        #[prost(bytes = "vec", tag = "1")]
        pub endorser: ::prost::alloc::vec::Vec<u8>,
        #[prost(bytes = "vec", tag = "2")]
        pub signature: ::prost::alloc::vec::Vec<u8>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct ProposalResponsePayload {
        #[prost(bytes = "vec", tag = "1")]
        pub proposal_hash: ::prost::alloc::vec::Vec<u8>,
        #[prost(bytes = "vec", tag = "2")]
        pub extension: ::prost::alloc::vec::Vec<u8>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct ChaincodeAction {
        #[prost(bytes = "vec", tag = "1")]
        pub results: ::prost::alloc::vec::Vec<u8>,
        #[prost(bytes = "vec", tag = "2")]
        pub events: ::prost::alloc::vec::Vec<u8>,
        #[prost(message, optional, tag = "3")]
        pub response: ::core::option::Option<Response>,
        #[prost(message, optional, tag = "4")]
        pub chaincode_id: ::core::option::Option<ChaincodeId>,
    }

    /// Validation outcome assigned to a transaction by the committing peers.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum TxValidationCode {
        Valid = 0,
        NilEnvelope = 1,
        BadPayload = 2,
        BadCommonHeader = 3,
        BadCreatorSignature = 4,
        InvalidEndorserTransaction = 5,
        InvalidConfigTransaction = 6,
        UnsupportedTxPayload = 7,
        BadProposalTxid = 8,
        DuplicateTxid = 9,
        EndorsementPolicyFailure = 10,
        MvccReadConflict = 11,
        PhantomReadConflict = 12,
        UnknownTxType = 13,
        TargetChainNotFound = 14,
        MarshalTxError = 15,
        NilTxaction = 16,
        ExpiredChaincode = 17,
        ChaincodeVersionConflict = 18,
        BadHeaderExtension = 19,
        BadChannelHeader = 20,
        BadResponsePayload = 21,
        BadRwset = 22,
        IllegalWriteset = 23,
        InvalidWriteset = 24,
        InvalidChaincode = 25,
        NotValidated = 254,
        InvalidOtherReason = 255,
    }
}

/// `gateway` package: the gateway service requests and responses.
pub mod gateway {
    use super::common::Envelope;
    use super::peer::{Response, SignedProposal};

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct EndorseRequest {
        #[prost(string, tag = "1")]
        pub transaction_id: ::prost::alloc::string::String,
        #[prost(string, tag = "2")]
        pub channel_id: ::prost::alloc::string::String,
        #[prost(message, optional, tag = "3")]
        pub proposed_transaction: ::core::option::Option<SignedProposal>,
        #[prost(string, repeated, tag = "4")]
        pub endorsing_organizations: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct EndorseResponse {
        #[prost(message, optional, tag = "1")]
        pub prepared_transaction: ::core::option::Option<Envelope>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct SubmitRequest {
        #[prost(string, tag = "1")]
        pub transaction_id: ::prost::alloc::string::String,
        #[prost(string, tag = "2")]
        pub channel_id: ::prost::alloc::string::String,
        #[prost(message, optional, tag = "3")]
        pub prepared_transaction: ::core::option::Option<Envelope>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct SubmitResponse {}

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct SignedCommitStatusRequest {
        #[prost(bytes = "vec", tag = "1")]
        pub request: ::prost::alloc::vec::Vec<u8>,
        #[prost(bytes = "vec", tag = "2")]
        pub signature: ::prost::alloc::vec::Vec<u8>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct CommitStatusRequest {
        #[prost(string, tag = "1")]
        pub transaction_id: ::prost::alloc::string::String,
        #[prost(string, tag = "2")]
        pub channel_id: ::prost::alloc::string::String,
        #[prost(bytes = "vec", tag = "3")]
        pub identity: ::prost::alloc::vec::Vec<u8>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct CommitStatusResponse {
        #[prost(enumeration = "super::peer::TxValidationCode", tag = "1")]
        pub result: i32,
        #[prost(uint64, tag = "2")]
        pub block_number: u64,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct EvaluateRequest {
        #[prost(string, tag = "1")]
        pub transaction_id: ::prost::alloc::string::String,
        #[prost(string, tag = "2")]
        pub channel_id: ::prost::alloc::string::String,
        #[prost(message, optional, tag = "3")]
        pub proposed_transaction: ::core::option::Option<SignedProposal>,
        #[prost(string, repeated, tag = "4")]
        pub target_organizations: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct EvaluateResponse {
        #[prost(message, optional, tag = "1")]
        pub result: ::core::option::Option<Response>,
    }

    /// Per-peer failure detail attached to a gateway error status.
    #[derive(Clone, PartialEq, Eq, ::prost::Message)]
    pub struct ErrorDetail {
        #[prost(string, tag = "1")]
        pub address: ::prost::alloc::string::String,
        #[prost(string, tag = "2")]
        pub msp_id: ::prost::alloc::string::String,
        #[prost(string, tag = "3")]
        pub message: ::prost::alloc::string::String,
    }
}

/// `google.rpc` package: rich status carried in gRPC error details.
pub mod rpc {
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Status {
        #[prost(int32, tag = "1")]
        pub code: i32,
        #[prost(string, tag = "2")]
        pub message: ::prost::alloc::string::String,
        #[prost(message, repeated, tag = "3")]
        pub details: ::prost::alloc::vec::Vec<::prost_types::Any>,
    }
}

pub use gateway::ErrorDetail;
pub use peer::TxValidationCode;

/// Type URL suffix identifying an [`ErrorDetail`] packed in a `google.protobuf.Any`.
pub const ERROR_DETAIL_TYPE: &str = "gateway.ErrorDetail";

#[cfg(test)]
mod tests {
    use super::*;
    use prost::Message;

    #[test]
    fn test_commit_status_code_decoding() {
        let response = gateway::CommitStatusResponse {
            result: TxValidationCode::MvccReadConflict as i32,
            block_number: 7,
        };
        let decoded = gateway::CommitStatusResponse::decode(response.encode_to_vec().as_slice()).unwrap();
        assert_eq!(decoded.result(), TxValidationCode::MvccReadConflict);
        assert_eq!(TxValidationCode::try_from(255).unwrap(), TxValidationCode::InvalidOtherReason);
        assert!(TxValidationCode::try_from(99).is_err());
    }

    #[test]
    fn test_serialized_identity_field_layout() {
        let identity = msp::SerializedIdentity {
            mspid: "Org1MSP".into(),
            id_bytes: b"cert".to_vec(),
        };
        // tag 1 (string) then tag 2 (bytes)
        let bytes = identity.encode_to_vec();
        assert_eq!(bytes[0], 0x0a);
        assert_eq!(&bytes[2..9], b"Org1MSP");
        assert_eq!(bytes[9], 0x12);
    }
}
