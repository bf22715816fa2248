//! Secure channel lifecycle.
//!
//! # Responsibilities
//! - Open a TLS gRPC channel pinned to the gateway's certificate
//! - Hand out RPC clients bound to the channel
//! - Close with a bounded wait for in-flight calls
//!
//! # Design Decisions
//! - One channel per call; no pooling or reuse
//! - After `close`, every operation fails with a connection error
//! - Dropping an unclosed channel closes it without waiting

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tonic::transport::Channel;

use crate::config::schema::GatewayConfig;
use crate::gateway::client::{GatewayRpc, GrpcGateway};
use crate::gateway::types::{GatewayError, GatewayResult};
use crate::identity::Certificate;
use crate::net::connection::CallTracker;
use crate::net::tls::{describe, gateway_endpoint};

/// An open link to the gateway endpoint.
#[async_trait]
pub trait Connection: Send + Sync {
    /// Address the connection was opened to.
    fn endpoint(&self) -> &str;

    /// RPC client bound to this connection.
    fn client(&self) -> GatewayResult<Arc<dyn GatewayRpc>>;

    fn is_closed(&self) -> bool;

    /// Release the connection. Idempotent.
    async fn close(&mut self);
}

/// Opens connections to the gateway endpoint.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn open(&self, trusted: &Certificate) -> GatewayResult<Box<dyn Connection>>;
}

/// TLS gRPC channel to one gateway endpoint.
pub struct SecureChannel {
    endpoint: String,
    channel: Option<Channel>,
    tracker: CallTracker,
    shutdown_grace: Duration,
}

impl SecureChannel {
    /// Connect to the configured endpoint, trusting only `trusted`.
    pub async fn open(config: &GatewayConfig, trusted: &Certificate) -> GatewayResult<Self> {
        let endpoint = gateway_endpoint(config, trusted)?;
        let channel = endpoint.connect().await.map_err(|e| {
            GatewayError::Connection(format!(
                "Cannot connect to gateway {}: {}",
                config.endpoint,
                describe(&e)
            ))
        })?;

        tracing::debug!(
            endpoint = %config.endpoint,
            authority = %config.override_authority,
            "Secure channel opened"
        );

        Ok(Self::from_channel(config, channel))
    }

    fn from_channel(config: &GatewayConfig, channel: Channel) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
            channel: Some(channel),
            tracker: CallTracker::new(),
            shutdown_grace: Duration::from_secs(config.shutdown_grace_secs),
        }
    }

    /// Number of calls currently using the channel.
    pub fn in_flight(&self) -> usize {
        self.tracker.in_flight()
    }
}

#[async_trait]
impl Connection for SecureChannel {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn client(&self) -> GatewayResult<Arc<dyn GatewayRpc>> {
        match &self.channel {
            Some(channel) if !self.tracker.is_closed() => Ok(Arc::new(GrpcGateway::new(
                channel.clone(),
                self.tracker.clone(),
            ))),
            _ => Err(GatewayError::Connection(format!(
                "Channel to {} is closed",
                self.endpoint
            ))),
        }
    }

    fn is_closed(&self) -> bool {
        self.tracker.is_closed()
    }

    async fn close(&mut self) {
        if self.channel.is_none() {
            return;
        }
        self.tracker.close();
        if !self.tracker.drain(self.shutdown_grace).await {
            tracing::warn!(
                endpoint = %self.endpoint,
                in_flight = self.tracker.in_flight(),
                grace_secs = self.shutdown_grace.as_secs(),
                "Calls still in flight after shutdown grace, closing anyway"
            );
        }
        self.channel = None;
        tracing::debug!(endpoint = %self.endpoint, "Secure channel closed");
    }
}

impl Drop for SecureChannel {
    fn drop(&mut self) {
        if self.channel.is_some() {
            self.tracker.close();
            tracing::warn!(endpoint = %self.endpoint, "Secure channel dropped without close");
        }
    }
}

impl std::fmt::Debug for SecureChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecureChannel")
            .field("endpoint", &self.endpoint)
            .field("closed", &self.tracker.is_closed())
            .field("in_flight", &self.tracker.in_flight())
            .finish()
    }
}

/// Opens a fresh [`SecureChannel`] per call.
#[derive(Debug, Clone)]
pub struct TlsConnector {
    config: GatewayConfig,
}

impl TlsConnector {
    pub fn new(config: GatewayConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Connector for TlsConnector {
    async fn open(&self, trusted: &Certificate) -> GatewayResult<Box<dyn Connection>> {
        let channel = SecureChannel::open(&self.config, trusted).await?;
        Ok(Box::new(channel))
    }
}
