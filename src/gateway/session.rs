//! Gateway session: identity, signer and channel client bound together.

use std::sync::Arc;

use crate::gateway::client::GatewayRpc;
use crate::gateway::contract::{Contract, Network};
use crate::gateway::types::{GatewayResult, TimeoutPolicy};
use crate::identity::{Identity, Signer};

/// A logical session with the gateway for one identity.
///
/// Networks and contracts borrow the session and cannot outlive it. The
/// session never owns the channel: closing it leaves the channel to its
/// owner.
pub struct Gateway {
    identity: Identity,
    creator: Vec<u8>,
    signer: Arc<dyn Signer>,
    client: Arc<dyn GatewayRpc>,
    timeouts: TimeoutPolicy,
}

impl Gateway {
    /// Bind identity, signer and channel client into a session.
    ///
    /// The timeout policy is validated here, once. Whether the remote side
    /// accepts the identity is only known on first use.
    pub fn connect(
        identity: Identity,
        signer: Arc<dyn Signer>,
        client: Arc<dyn GatewayRpc>,
        timeouts: TimeoutPolicy,
    ) -> GatewayResult<Self> {
        timeouts.validate()?;
        let creator = identity.creator();

        tracing::debug!(msp_id = %identity.msp_id(), timeouts = ?timeouts, "Gateway session opened");

        Ok(Self {
            identity,
            creator,
            signer,
            client,
            timeouts,
        })
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn timeouts(&self) -> &TimeoutPolicy {
        &self.timeouts
    }

    /// Bind a ledger channel by name. Does not contact the network.
    pub fn get_network<'a>(&'a self, channel_name: &'a str) -> Network<'a> {
        Network::new(self, channel_name)
    }

    /// Bind a contract on a ledger channel. Does not contact the network.
    pub fn get_contract<'a>(
        &'a self,
        channel_name: &'a str,
        chaincode_name: &'a str,
    ) -> Contract<'a> {
        self.get_network(channel_name).get_contract(chaincode_name)
    }

    /// Release the session.
    pub fn close(self) {
        tracing::debug!(msp_id = %self.identity.msp_id(), "Gateway session closed");
    }

    pub(crate) fn creator(&self) -> &[u8] {
        &self.creator
    }

    pub(crate) fn signer(&self) -> &dyn Signer {
        self.signer.as_ref()
    }

    pub(crate) fn client(&self) -> &dyn GatewayRpc {
        self.client.as_ref()
    }
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("msp_id", &self.identity.msp_id())
            .field("timeouts", &self.timeouts)
            .finish()
    }
}
