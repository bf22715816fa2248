//! Private key loading and request signing.
//!
//! # Security
//! - The key is read once from the key directory and never logged
//! - Only the signing capability leaves this module

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use p256::ecdsa::signature::Signer as _;
use p256::ecdsa::{Signature, SigningKey, VerifyingKey};
use p256::pkcs8::DecodePrivateKey;
use rustls_pki_types::PrivateKeyDer;

use crate::gateway::types::{GatewayError, GatewayResult};

/// Signing capability used to authenticate requests.
pub trait Signer: Send + Sync {
    /// Sign the message, returning the encoded signature.
    fn sign(&self, message: &[u8]) -> GatewayResult<Vec<u8>>;
}

/// ECDSA P-256 signer over SHA-256 digests.
///
/// Signatures are DER-encoded and normalized to low-S form, which the
/// ledger requires.
#[derive(Clone)]
pub struct PrivateKeySigner {
    key: SigningKey,
}

impl PrivateKeySigner {
    /// Parse a PKCS#8 or SEC1 PEM private key.
    pub fn from_pem(pem: &[u8]) -> GatewayResult<Self> {
        let mut reader = pem;
        let parsed = rustls_pemfile::private_key(&mut reader)
            .map_err(|e| GatewayError::Credential(format!("Malformed PEM private key: {}", e)))?
            .ok_or_else(|| GatewayError::Credential("No PEM private key found".to_string()))?;

        let key = match parsed {
            PrivateKeyDer::Pkcs8(der) => SigningKey::from_pkcs8_der(der.secret_pkcs8_der())
                .map_err(|e| {
                    GatewayError::Credential(format!("Private key is not a P-256 ECDSA key: {}", e))
                })?,
            PrivateKeyDer::Sec1(der) => p256::SecretKey::from_sec1_der(der.secret_sec1_der())
                .map(SigningKey::from)
                .map_err(|e| {
                    GatewayError::Credential(format!("Private key is not a P-256 ECDSA key: {}", e))
                })?,
            PrivateKeyDer::Pkcs1(_) => {
                return Err(GatewayError::Credential(
                    "Unsupported private key algorithm: RSA".to_string(),
                ))
            }
            _ => {
                return Err(GatewayError::Credential(
                    "Unsupported private key encoding".to_string(),
                ))
            }
        };

        Ok(Self { key })
    }

    /// Public half of the key.
    pub fn verifying_key(&self) -> &VerifyingKey {
        self.key.verifying_key()
    }
}

impl Signer for PrivateKeySigner {
    fn sign(&self, message: &[u8]) -> GatewayResult<Vec<u8>> {
        let signature: Signature = self.key.sign(message);
        let signature = signature.normalize_s().unwrap_or(signature);
        Ok(signature.to_der().as_bytes().to_vec())
    }
}

impl fmt::Debug for PrivateKeySigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKeySigner")
            .field("key", &"<redacted>")
            .finish()
    }
}

/// Load the signer from a key directory holding exactly one key file.
pub fn load_signer(key_dir: &Path) -> GatewayResult<PrivateKeySigner> {
    let key_path = private_key_path(key_dir)?;
    let pem = fs::read(&key_path).map_err(|e| {
        GatewayError::Credential(format!("Cannot read private key {:?}: {}", key_path, e))
    })?;
    let signer = PrivateKeySigner::from_pem(&pem)
        .map_err(|e| GatewayError::Credential(format!("{:?}: {}", key_path, e)))?;

    tracing::debug!(path = ?key_path, "Signer loaded");
    Ok(signer)
}

/// Resolve the single key file in `key_dir`.
///
/// Zero or several candidate files are both errors; directory listing
/// order is not defined, so no file is preferred over another.
fn private_key_path(key_dir: &Path) -> GatewayResult<PathBuf> {
    let entries = fs::read_dir(key_dir).map_err(|e| {
        GatewayError::Credential(format!("Cannot list key directory {:?}: {}", key_dir, e))
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| {
            GatewayError::Credential(format!("Cannot list key directory {:?}: {}", key_dir, e))
        })?;
        if entry.path().is_file() {
            files.push(entry.path());
        }
    }

    match files.len() {
        1 => Ok(files.remove(0)),
        0 => Err(GatewayError::Credential(format!(
            "No private key file in {:?}",
            key_dir
        ))),
        n => Err(GatewayError::Credential(format!(
            "Expected exactly one private key file in {:?}, found {}",
            key_dir, n
        ))),
    }
}
