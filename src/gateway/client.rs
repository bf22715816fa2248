//! Gateway service RPC client.
//!
//! # Responsibilities
//! - Define the RPC seam the transaction driver talks through
//! - Issue unary gRPC calls over a tracked channel
//! - Attach the phase deadline to every call (`grpc-timeout`)

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tonic::codegen::http::uri::PathAndQuery;
use tonic::transport::Channel;
use tonic::Status;

use crate::gateway::protos::gateway::{
    CommitStatusResponse, EndorseRequest, EndorseResponse, EvaluateRequest, EvaluateResponse,
    SignedCommitStatusRequest, SubmitRequest, SubmitResponse,
};
use crate::net::connection::CallTracker;

const ENDORSE_PATH: &str = "/gateway.Gateway/Endorse";
const SUBMIT_PATH: &str = "/gateway.Gateway/Submit";
const COMMIT_STATUS_PATH: &str = "/gateway.Gateway/CommitStatus";
const EVALUATE_PATH: &str = "/gateway.Gateway/Evaluate";

/// Failure of a single gateway RPC.
#[derive(Debug, Error)]
pub enum RpcError {
    /// The channel was closed before the call started.
    #[error("channel closed")]
    ChannelClosed,

    /// The gateway answered with an error status.
    #[error(transparent)]
    Status(#[from] Status),
}

/// The gateway service operations used by the transaction driver.
#[async_trait]
pub trait GatewayRpc: Send + Sync {
    async fn endorse(
        &self,
        request: EndorseRequest,
        deadline: Duration,
    ) -> Result<EndorseResponse, RpcError>;

    async fn submit(
        &self,
        request: SubmitRequest,
        deadline: Duration,
    ) -> Result<SubmitResponse, RpcError>;

    async fn commit_status(
        &self,
        request: SignedCommitStatusRequest,
        deadline: Duration,
    ) -> Result<CommitStatusResponse, RpcError>;

    async fn evaluate(
        &self,
        request: EvaluateRequest,
        deadline: Duration,
    ) -> Result<EvaluateResponse, RpcError>;
}

/// gRPC implementation of [`GatewayRpc`] over a TLS channel.
#[derive(Debug, Clone)]
pub struct GrpcGateway {
    channel: Channel,
    tracker: CallTracker,
}

impl GrpcGateway {
    pub fn new(channel: Channel, tracker: CallTracker) -> Self {
        Self { channel, tracker }
    }

    async fn unary<Req, Resp>(
        &self,
        path: &'static str,
        message: Req,
        deadline: Duration,
    ) -> Result<Resp, RpcError>
    where
        Req: prost::Message + Send + Sync + 'static,
        Resp: prost::Message + Default + Send + Sync + 'static,
    {
        let _guard = self.tracker.begin().ok_or(RpcError::ChannelClosed)?;

        let mut grpc = tonic::client::Grpc::new(self.channel.clone());
        grpc.ready()
            .await
            .map_err(|e| Status::unknown(format!("Service was not ready: {}", e)))?;

        let mut request = tonic::Request::new(message);
        request.set_timeout(deadline);
        let codec = tonic::codec::ProstCodec::<Req, Resp>::default();
        let response = grpc
            .unary(request, PathAndQuery::from_static(path), codec)
            .await?;
        Ok(response.into_inner())
    }
}

#[async_trait]
impl GatewayRpc for GrpcGateway {
    async fn endorse(
        &self,
        request: EndorseRequest,
        deadline: Duration,
    ) -> Result<EndorseResponse, RpcError> {
        self.unary(ENDORSE_PATH, request, deadline).await
    }

    async fn submit(
        &self,
        request: SubmitRequest,
        deadline: Duration,
    ) -> Result<SubmitResponse, RpcError> {
        self.unary(SUBMIT_PATH, request, deadline).await
    }

    async fn commit_status(
        &self,
        request: SignedCommitStatusRequest,
        deadline: Duration,
    ) -> Result<CommitStatusResponse, RpcError> {
        self.unary(COMMIT_STATUS_PATH, request, deadline).await
    }

    async fn evaluate(
        &self,
        request: EvaluateRequest,
        deadline: Duration,
    ) -> Result<EvaluateResponse, RpcError> {
        self.unary(EVALUATE_PATH, request, deadline).await
    }
}
