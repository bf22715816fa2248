//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the client.
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::gateway::types::TimeoutPolicy;

/// Root configuration for the ledger gateway client.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ClientConfig {
    /// Gateway peer endpoint and channel settings.
    pub gateway: GatewayConfig,

    /// Crypto material locations and MSP ID.
    pub identity: IdentityConfig,

    /// Ledger channel and contract names.
    pub network: NetworkConfig,

    /// Per-phase deadlines.
    pub timeouts: TimeoutConfig,

    /// HTTP trigger surface.
    pub http: HttpConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Gateway endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct GatewayConfig {
    /// Gateway peer address (e.g., "localhost:7051").
    pub endpoint: String,

    /// Name the peer's TLS certificate is verified against.
    pub override_authority: String,

    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,

    /// Maximum wait for in-flight calls when closing the channel.
    pub shutdown_grace_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            endpoint: "localhost:7051".to_string(),
            override_authority: "peer0.org1.example.com".to_string(),
            connect_timeout_secs: 10,
            shutdown_grace_secs: 5,
        }
    }
}

/// Identity and crypto material configuration.
///
/// Certificate and key paths are relative to `crypto_path`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct IdentityConfig {
    /// Membership service provider ID of the client identity.
    pub msp_id: String,

    /// Root of the organization's crypto materials.
    pub crypto_path: String,

    /// Client certificate (PEM).
    pub cert_path: String,

    /// Directory holding the client's single private key file.
    pub key_dir_path: String,

    /// Gateway peer TLS certificate (PEM).
    pub tls_cert_path: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            msp_id: "Org1MSP".to_string(),
            crypto_path: "../../test-network/organizations/peerOrganizations/org1.example.com"
                .to_string(),
            cert_path: "users/User1@org1.example.com/msp/signcerts/cert.pem".to_string(),
            key_dir_path: "users/User1@org1.example.com/msp/keystore".to_string(),
            tls_cert_path: "peers/peer0.org1.example.com/tls/ca.crt".to_string(),
        }
    }
}

impl IdentityConfig {
    pub fn cert_path(&self) -> PathBuf {
        PathBuf::from(&self.crypto_path).join(&self.cert_path)
    }

    pub fn key_dir_path(&self) -> PathBuf {
        PathBuf::from(&self.crypto_path).join(&self.key_dir_path)
    }

    pub fn tls_cert_path(&self) -> PathBuf {
        PathBuf::from(&self.crypto_path).join(&self.tls_cert_path)
    }
}

/// Ledger channel and contract selection.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct NetworkConfig {
    pub channel_name: String,
    pub chaincode_name: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            channel_name: "mychannel".to_string(),
            chaincode_name: "basic".to_string(),
        }
    }
}

/// Deadlines for the transaction lifecycle phases.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Read-only evaluation deadline in seconds.
    pub evaluate_secs: u64,

    /// Endorsement deadline in seconds.
    pub endorse_secs: u64,

    /// Ordering service submission deadline in seconds.
    pub submit_secs: u64,

    /// Commit status wait deadline in seconds.
    pub commit_status_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            evaluate_secs: 5,
            endorse_secs: 15,
            submit_secs: 5,
            commit_status_secs: 60,
        }
    }
}

impl TimeoutConfig {
    pub fn policy(&self) -> TimeoutPolicy {
        TimeoutPolicy {
            evaluate: Duration::from_secs(self.evaluate_secs),
            endorse: Duration::from_secs(self.endorse_secs),
            submit: Duration::from_secs(self.submit_secs),
            commit_status: Duration::from_secs(self.commit_status_secs),
        }
    }

    /// Worst-case duration of a write: endorse + submit + commit status.
    pub fn write_path_secs(&self) -> u64 {
        self.endorse_secs
            .saturating_add(self.submit_secs)
            .saturating_add(self.commit_status_secs)
    }
}

/// HTTP trigger surface configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct HttpConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Request timeout in seconds; must cover a full write.
    pub request_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 90,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log filter used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_filter: "ledger_gateway=info,tower_http=info".to_string(),
        }
    }
}
