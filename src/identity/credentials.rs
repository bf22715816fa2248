//! X.509 identity and trusted certificate loading.

use std::fs;
use std::path::Path;

use prost::Message;
use x509_cert::der::Decode;

use crate::gateway::protos::msp::SerializedIdentity;
use crate::gateway::types::{GatewayError, GatewayResult};

/// A PEM-encoded X.509 certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    pem: Vec<u8>,
    der: Vec<u8>,
}

impl Certificate {
    /// Parse a certificate from PEM bytes.
    ///
    /// The first `CERTIFICATE` block is kept as DER; the PEM text is kept as
    /// read because the ledger identifies clients by their PEM bytes.
    pub fn from_pem(pem: impl Into<Vec<u8>>) -> GatewayResult<Self> {
        let pem = pem.into();
        let der = {
            let mut reader = pem.as_slice();
            let first = rustls_pemfile::certs(&mut reader)
                .next()
                .ok_or_else(|| GatewayError::Credential("No PEM certificate found".to_string()))?
                .map_err(|e| GatewayError::Credential(format!("Malformed PEM certificate: {}", e)))?;
            first.as_ref().to_vec()
        };

        x509_cert::Certificate::from_der(&der).map_err(|e| {
            GatewayError::Credential(format!("Certificate block is not valid X.509: {}", e))
        })?;

        Ok(Self { pem, der })
    }

    /// Certificate as PEM text.
    pub fn pem(&self) -> &[u8] {
        &self.pem
    }

    /// First certificate block as DER.
    pub fn der(&self) -> &[u8] {
        &self.der
    }
}

/// Client identity: membership service provider ID plus certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    msp_id: String,
    certificate: Certificate,
}

impl Identity {
    pub fn new(msp_id: impl Into<String>, certificate: Certificate) -> Self {
        Self {
            msp_id: msp_id.into(),
            certificate,
        }
    }

    pub fn msp_id(&self) -> &str {
        &self.msp_id
    }

    pub fn certificate(&self) -> &Certificate {
        &self.certificate
    }

    /// Serialized identity placed in signature headers and commit status requests.
    pub fn creator(&self) -> Vec<u8> {
        SerializedIdentity {
            mspid: self.msp_id.clone(),
            id_bytes: self.certificate.pem.clone(),
        }
        .encode_to_vec()
    }
}

/// Load the client identity from a PEM certificate file.
pub fn load_identity(cert_path: &Path, msp_id: &str) -> GatewayResult<Identity> {
    let certificate = load_certificate(cert_path)?;
    tracing::debug!(msp_id = %msp_id, path = ?cert_path, "Identity loaded");
    Ok(Identity::new(msp_id, certificate))
}

/// Load the TLS certificate the gateway channel is pinned to.
pub fn load_trusted_server_cert(tls_cert_path: &Path) -> GatewayResult<Certificate> {
    load_certificate(tls_cert_path)
}

fn load_certificate(path: &Path) -> GatewayResult<Certificate> {
    let pem = fs::read(path).map_err(|e| {
        GatewayError::Credential(format!("Cannot read certificate {:?}: {}", path, e))
    })?;
    Certificate::from_pem(pem)
        .map_err(|e| GatewayError::Credential(format!("{:?}: {}", path, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CERT_PEM: &str = include_str!("../../tests/fixtures/cert.pem");

    #[test]
    fn test_load_identity() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cert.pem");
        fs::write(&path, CERT_PEM).unwrap();

        let identity = load_identity(&path, "Org1MSP").unwrap();
        assert_eq!(identity.msp_id(), "Org1MSP");
        assert_eq!(identity.certificate().pem(), CERT_PEM.as_bytes());
        assert!(x509_cert::Certificate::from_der(identity.certificate().der()).is_ok());

        // Re-loading yields the same value
        assert_eq!(load_identity(&path, "Org1MSP").unwrap(), identity);
    }

    #[test]
    fn test_creator_embeds_msp_and_pem() {
        let identity = Identity::new("Org1MSP", Certificate::from_pem(CERT_PEM).unwrap());
        let decoded = SerializedIdentity::decode(identity.creator().as_slice()).unwrap();
        assert_eq!(decoded.mspid, "Org1MSP");
        assert_eq!(decoded.id_bytes, CERT_PEM.as_bytes());
    }

    #[test]
    fn test_missing_certificate() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_trusted_server_cert(&dir.path().join("ca.crt")).unwrap_err();
        assert!(matches!(err, GatewayError::Credential(_)));
    }

    #[test]
    fn test_malformed_certificates() {
        assert!(matches!(
            Certificate::from_pem("not a certificate"),
            Err(GatewayError::Credential(_))
        ));
        assert!(matches!(
            Certificate::from_pem("-----BEGIN CERTIFICATE-----\n!!!!\n-----END CERTIFICATE-----\n"),
            Err(GatewayError::Credential(_))
        ));
        // Valid base64 but not a DER SEQUENCE
        assert!(matches!(
            Certificate::from_pem("-----BEGIN CERTIFICATE-----\naGVsbG8=\n-----END CERTIFICATE-----\n"),
            Err(GatewayError::Credential(_))
        ));
        assert!(matches!(Certificate::from_pem(""), Err(GatewayError::Credential(_))));
    }

    #[test]
    fn test_sequence_that_is_not_a_certificate() {
        // Empty SEQUENCE
        let empty = "-----BEGIN CERTIFICATE-----\nMAA=\n-----END CERTIFICATE-----\n";
        assert!(matches!(Certificate::from_pem(empty), Err(GatewayError::Credential(_))));

        // First half of the fixture certificate
        let truncated = "-----BEGIN CERTIFICATE-----\nMIIBzzCCAXWgAwIBAgIUccbTBvj7zKOdbafWsroRLzyfbRUwCgYIKoZIzj0EAwIw\nPDEfMB0GA1UEAwwWVXNlcjFAb3JnMS5leGFtcGxlLmNvbTEZMBcGA1UECgwQb3Jn\nMS5leGFtcGxlLmNvbTAgFw0yNjEwMTgwMDI2NDlaGA8yMTI2MDkyNDAwMjY0OVow\nPDEfMB0GA1UEAwwWVXNlcjFAb3JnMS5leGFtcGxlLmNvbTEZMBcGA1UECgwQb3Jn\nMS5leGFtcGxlLmNvbTBZMBMGByqGSM49AgEGCCqGSM49AwEHA0IABEQ=\n-----END CERTIFICATE-----\n";
        assert!(matches!(Certificate::from_pem(truncated), Err(GatewayError::Credential(_))));
    }
}
