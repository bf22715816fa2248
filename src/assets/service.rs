//! Per-call asset operations.
//!
//! # Responsibilities
//! - Load credentials before touching the network
//! - Open a fresh connection and session for every call
//! - Close the session and the connection on every exit path
//!
//! # Design Decisions
//! - Nothing is shared between calls except the immutable config
//! - The connector is generic so tests can stand in for the network

use std::sync::Arc;

use crate::assets::format::Asset;
use crate::config::schema::ClientConfig;
use crate::gateway::session::Gateway;
use crate::gateway::types::GatewayResult;
use crate::identity::{load_identity, load_signer, load_trusted_server_cert, Identity, Signer};
use crate::net::channel::{Connection, Connector, TlsConnector};

pub const INIT_LEDGER: &str = "InitLedger";
pub const GET_ALL_ASSETS: &str = "GetAllAssets";
pub const CREATE_ASSET: &str = "CreateAsset";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CallKind {
    Submit,
    Evaluate,
}

/// Runs asset contract calls, one connection per call.
#[derive(Debug, Clone)]
pub struct AssetService<C = TlsConnector> {
    config: Arc<ClientConfig>,
    connector: C,
}

impl AssetService<TlsConnector> {
    /// Service dialing the configured gateway over TLS.
    pub fn new(config: Arc<ClientConfig>) -> Self {
        let connector = TlsConnector::new(config.gateway.clone());
        Self { config, connector }
    }
}

impl<C: Connector> AssetService<C> {
    pub fn with_connector(config: Arc<ClientConfig>, connector: C) -> Self {
        Self { config, connector }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Populate the ledger with the contract's initial assets.
    pub async fn init_ledger(&self) -> GatewayResult<()> {
        self.call(CallKind::Submit, INIT_LEDGER, &[]).await?;
        Ok(())
    }

    /// Raw JSON payload of every asset on the ledger.
    pub async fn get_all_assets(&self) -> GatewayResult<Vec<u8>> {
        self.call(CallKind::Evaluate, GET_ALL_ASSETS, &[]).await
    }

    /// Create one asset and wait for it to commit.
    pub async fn create_asset(&self, asset: &Asset) -> GatewayResult<()> {
        let args = asset.to_args();
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        self.call(CallKind::Submit, CREATE_ASSET, &args).await?;
        Ok(())
    }

    async fn call(&self, kind: CallKind, function: &str, args: &[&str]) -> GatewayResult<Vec<u8>> {
        let identity_config = &self.config.identity;

        // Fail before any network I/O if the crypto material is unusable
        let identity = load_identity(&identity_config.cert_path(), &identity_config.msp_id)?;
        let signer: Arc<dyn Signer> = Arc::new(load_signer(&identity_config.key_dir_path())?);
        let trusted = load_trusted_server_cert(&identity_config.tls_cert_path())?;

        let mut connection = self.connector.open(&trusted).await?;
        tracing::debug!(endpoint = %connection.endpoint(), function = %function, "Connection opened");

        let result = self
            .execute(connection.as_ref(), identity, signer, kind, function, args)
            .await;

        connection.close().await;
        if let Err(e) = &result {
            tracing::warn!(function = %function, error = %e, kind = e.kind(), "Call failed");
        }
        result
    }

    async fn execute(
        &self,
        connection: &dyn Connection,
        identity: Identity,
        signer: Arc<dyn Signer>,
        kind: CallKind,
        function: &str,
        args: &[&str],
    ) -> GatewayResult<Vec<u8>> {
        let gateway = Gateway::connect(
            identity,
            signer,
            connection.client()?,
            self.config.timeouts.policy(),
        )?;

        let network = &self.config.network;
        let contract = gateway.get_contract(&network.channel_name, &network.chaincode_name);
        let result = match kind {
            CallKind::Submit => contract.submit(function, args).await,
            CallKind::Evaluate => contract.evaluate(function, args).await,
        };

        gateway.close();
        result
    }
}
