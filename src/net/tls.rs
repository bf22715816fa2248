//! TLS configuration for the gateway channel.

use std::error::Error as StdError;
use std::time::Duration;

use tonic::codegen::http::Uri;
use tonic::transport::{ClientTlsConfig, Endpoint};

use crate::config::schema::GatewayConfig;
use crate::gateway::types::{GatewayError, GatewayResult};
use crate::identity::Certificate;

/// Build a TLS client configuration trusting only `trusted`.
///
/// `override_authority` is the name the server certificate is verified
/// against, which may differ from the host used to dial.
pub fn client_tls_config(trusted: &Certificate, override_authority: &str) -> ClientTlsConfig {
    ClientTlsConfig::new()
        .ca_certificate(tonic::transport::Certificate::from_pem(trusted.pem()))
        .domain_name(override_authority)
}

/// Build the endpoint for the configured gateway peer.
pub fn gateway_endpoint(config: &GatewayConfig, trusted: &Certificate) -> GatewayResult<Endpoint> {
    let target = format!("https://{}", config.endpoint);
    let origin: Uri = format!("https://{}", config.override_authority)
        .parse()
        .map_err(|e| {
            GatewayError::Connection(format!(
                "Invalid override authority '{}': {}",
                config.override_authority, e
            ))
        })?;

    Endpoint::from_shared(target)
        .map_err(|e| {
            GatewayError::Connection(format!("Invalid gateway endpoint '{}': {}", config.endpoint, e))
        })?
        .tls_config(client_tls_config(trusted, &config.override_authority))
        .map_err(|e| GatewayError::Connection(format!("TLS configuration rejected: {}", describe(&e))))
        .map(|endpoint| {
            endpoint
                .origin(origin)
                .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        })
}

/// Render an error together with its source chain.
///
/// Transport errors carry the useful part (refused, handshake failure) in
/// their sources.
pub fn describe(err: &(dyn StdError + 'static)) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}
