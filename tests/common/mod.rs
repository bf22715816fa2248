//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use prost::Message;
use tonic::{Code, Status};

use ledger_gateway::config::ClientConfig;
use ledger_gateway::gateway::client::{GatewayRpc, RpcError};
use ledger_gateway::gateway::protos::gateway::{
    CommitStatusRequest, CommitStatusResponse, EndorseRequest, EndorseResponse, EvaluateRequest,
    EvaluateResponse, SignedCommitStatusRequest, SubmitRequest, SubmitResponse,
};
use ledger_gateway::gateway::protos::common::{Envelope, Payload};
use ledger_gateway::gateway::protos::peer::{
    ChaincodeAction, ChaincodeActionPayload, ChaincodeEndorsedAction, ProposalResponsePayload,
    Response, Transaction, TransactionAction,
};
use ledger_gateway::gateway::{Gateway, TimeoutPolicy, TxValidationCode};
use ledger_gateway::identity::{Certificate, Identity, PrivateKeySigner};
use ledger_gateway::net::channel::{Connection, Connector};
use ledger_gateway::GatewayResult;
use ledger_gateway::GatewayError;

pub const CERT_PEM: &str = include_str!("../fixtures/cert.pem");
pub const KEY_PEM: &str = include_str!("../fixtures/key.pem");

pub const LEDGER_JSON: &str = r#"[{"ID":"asset1","Color":"blue","Size":5,"Owner":"Tomoko","AppraisedValue":300},{"ID":"asset2","Color":"red","Size":5,"Owner":"Brad","AppraisedValue":400}]"#;

/// Scripted gateway peer recording every call it receives.
pub struct MockGateway {
    pub endorse_result: Vec<u8>,
    pub endorse_failure: Option<(Code, String)>,
    pub evaluate_payload: Vec<u8>,
    pub evaluate_status: i32,
    pub submit_failure: Option<(Code, String)>,
    pub commit_status_failure: Option<(Code, String)>,
    pub commit_code: TxValidationCode,
    pub commit_block: u64,
    pub evaluate_delay: Duration,

    pub endorse_calls: AtomicUsize,
    pub submit_calls: AtomicUsize,
    pub commit_status_calls: AtomicUsize,
    pub evaluate_calls: AtomicUsize,

    /// Transaction IDs seen by ENDORSE, in order.
    pub endorsed_ids: Mutex<Vec<String>>,
    /// Transaction IDs seen by COMMIT-STATUS, in order.
    pub commit_status_ids: Mutex<Vec<String>>,

    pub submit_requests: Mutex<Vec<SubmitRequest>>,
    pub commit_status_requests: Mutex<Vec<SignedCommitStatusRequest>>,
}

impl Default for MockGateway {
    fn default() -> Self {
        Self {
            endorse_result: Vec::new(),
            endorse_failure: None,
            evaluate_payload: LEDGER_JSON.as_bytes().to_vec(),
            evaluate_status: 200,
            submit_failure: None,
            commit_status_failure: None,
            commit_code: TxValidationCode::Valid,
            commit_block: 7,
            evaluate_delay: Duration::ZERO,
            endorse_calls: AtomicUsize::new(0),
            submit_calls: AtomicUsize::new(0),
            commit_status_calls: AtomicUsize::new(0),
            evaluate_calls: AtomicUsize::new(0),
            endorsed_ids: Mutex::new(Vec::new()),
            commit_status_ids: Mutex::new(Vec::new()),
            submit_requests: Mutex::new(Vec::new()),
            commit_status_requests: Mutex::new(Vec::new()),
        }
    }
}

impl MockGateway {
    pub fn endorse_calls(&self) -> usize {
        self.endorse_calls.load(Ordering::SeqCst)
    }

    pub fn submit_calls(&self) -> usize {
        self.submit_calls.load(Ordering::SeqCst)
    }

    pub fn commit_status_calls(&self) -> usize {
        self.commit_status_calls.load(Ordering::SeqCst)
    }

    pub fn evaluate_calls(&self) -> usize {
        self.evaluate_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GatewayRpc for MockGateway {
    async fn endorse(
        &self,
        request: EndorseRequest,
        _deadline: Duration,
    ) -> Result<EndorseResponse, RpcError> {
        self.endorse_calls.fetch_add(1, Ordering::SeqCst);
        self.endorsed_ids.lock().unwrap().push(request.transaction_id);
        if let Some((code, message)) = &self.endorse_failure {
            return Err(Status::new(*code, message.clone()).into());
        }
        Ok(EndorseResponse {
            prepared_transaction: Some(prepared_envelope(&self.endorse_result)),
        })
    }

    async fn submit(
        &self,
        request: SubmitRequest,
        _deadline: Duration,
    ) -> Result<SubmitResponse, RpcError> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        self.submit_requests.lock().unwrap().push(request);
        match &self.submit_failure {
            Some((code, message)) => Err(Status::new(*code, message.clone()).into()),
            None => Ok(SubmitResponse {}),
        }
    }

    async fn commit_status(
        &self,
        request: SignedCommitStatusRequest,
        _deadline: Duration,
    ) -> Result<CommitStatusResponse, RpcError> {
        self.commit_status_calls.fetch_add(1, Ordering::SeqCst);
        let inner = CommitStatusRequest::decode(request.request.as_slice())
            .map_err(|e| Status::invalid_argument(e.to_string()))?;
        self.commit_status_ids.lock().unwrap().push(inner.transaction_id);
        self.commit_status_requests.lock().unwrap().push(request);
        if let Some((code, message)) = &self.commit_status_failure {
            return Err(Status::new(*code, message.clone()).into());
        }
        Ok(CommitStatusResponse {
            result: self.commit_code as i32,
            block_number: self.commit_block,
        })
    }

    async fn evaluate(
        &self,
        _request: EvaluateRequest,
        _deadline: Duration,
    ) -> Result<EvaluateResponse, RpcError> {
        self.evaluate_calls.fetch_add(1, Ordering::SeqCst);
        if !self.evaluate_delay.is_zero() {
            tokio::time::sleep(self.evaluate_delay).await;
        }
        Ok(EvaluateResponse {
            result: Some(Response {
                status: self.evaluate_status,
                message: String::new(),
                payload: self.evaluate_payload.clone(),
            }),
        })
    }
}

/// Prepared transaction envelope carrying `result` as the chaincode
/// response, shaped like an ENDORSE reply.
pub fn prepared_envelope(result: &[u8]) -> Envelope {
    let chaincode_action = ChaincodeAction {
        response: Some(Response {
            status: 200,
            message: String::new(),
            payload: result.to_vec(),
        }),
        ..ChaincodeAction::default()
    };
    let response_payload = ProposalResponsePayload {
        proposal_hash: Vec::new(),
        extension: chaincode_action.encode_to_vec(),
    };
    let action_payload = ChaincodeActionPayload {
        chaincode_proposal_payload: Vec::new(),
        action: Some(ChaincodeEndorsedAction {
            proposal_response_payload: response_payload.encode_to_vec(),
            endorsements: Vec::new(),
        }),
    };
    let transaction = Transaction {
        actions: vec![TransactionAction {
            header: Vec::new(),
            payload: action_payload.encode_to_vec(),
        }],
    };
    Envelope {
        payload: Payload {
            header: None,
            data: transaction.encode_to_vec(),
        }
        .encode_to_vec(),
        signature: Vec::new(),
    }
}

/// Opened/closed counters shared by a connector and its connections.
#[derive(Debug, Default)]
pub struct ConnectionStats {
    pub opened: AtomicUsize,
    pub closed: AtomicUsize,
}

impl ConnectionStats {
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

pub struct MockConnection {
    gateway: Arc<MockGateway>,
    stats: Arc<ConnectionStats>,
    closed: bool,
}

#[async_trait]
impl Connection for MockConnection {
    fn endpoint(&self) -> &str {
        "mock:7051"
    }

    fn client(&self) -> GatewayResult<Arc<dyn GatewayRpc>> {
        if self.closed {
            return Err(GatewayError::Connection("mock connection closed".to_string()));
        }
        let client: Arc<dyn GatewayRpc> = self.gateway.clone();
        Ok(client)
    }

    fn is_closed(&self) -> bool {
        self.closed
    }

    async fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.stats.closed.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// Connector handing out connections to a [`MockGateway`].
#[derive(Clone)]
pub struct MockConnector {
    pub gateway: Arc<MockGateway>,
    pub stats: Arc<ConnectionStats>,
}

impl MockConnector {
    pub fn new(gateway: MockGateway) -> Self {
        Self {
            gateway: Arc::new(gateway),
            stats: Arc::new(ConnectionStats::default()),
        }
    }
}

#[async_trait]
impl Connector for MockConnector {
    async fn open(&self, _trusted: &Certificate) -> GatewayResult<Box<dyn Connection>> {
        self.stats.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockConnection {
            gateway: self.gateway.clone(),
            stats: self.stats.clone(),
            closed: false,
        }))
    }
}

/// Session over `rpc` using the fixture identity.
pub fn gateway_session(rpc: Arc<MockGateway>, timeouts: TimeoutPolicy) -> Gateway {
    let identity = Identity::new("Org1MSP", Certificate::from_pem(CERT_PEM).unwrap());
    let signer = Arc::new(PrivateKeySigner::from_pem(KEY_PEM.as_bytes()).unwrap());
    Gateway::connect(identity, signer, rpc, timeouts).unwrap()
}

/// Lay out crypto material under `root` the way the default config expects
/// it, and return a config pointing there.
pub fn write_crypto_material(root: &Path) -> ClientConfig {
    let mut config = ClientConfig::default();
    config.identity.crypto_path = root.display().to_string();

    let identity = &config.identity;
    let key_dir = identity.key_dir_path();
    fs::create_dir_all(&key_dir).unwrap();
    fs::write(key_dir.join("priv_sk"), KEY_PEM).unwrap();

    for path in [identity.cert_path(), identity.tls_cert_path()] {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, CERT_PEM).unwrap();
    }
    config
}
