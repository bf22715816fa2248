//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts, endpoint shape)
//! - Check the HTTP request timeout covers a full write
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ClientConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;

use crate::config::schema::ClientConfig;
use crate::gateway::types::MAX_PHASE_TIMEOUT;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &ClientConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let non_empty = [
        ("gateway.endpoint", &config.gateway.endpoint),
        ("gateway.override_authority", &config.gateway.override_authority),
        ("identity.msp_id", &config.identity.msp_id),
        ("identity.cert_path", &config.identity.cert_path),
        ("identity.key_dir_path", &config.identity.key_dir_path),
        ("identity.tls_cert_path", &config.identity.tls_cert_path),
        ("network.channel_name", &config.network.channel_name),
        ("network.chaincode_name", &config.network.chaincode_name),
    ];
    for (field, value) in non_empty {
        if value.trim().is_empty() {
            errors.push(ValidationError::new(field, "must not be empty"));
        }
    }

    if !config.gateway.endpoint.is_empty() && !has_port(&config.gateway.endpoint) {
        errors.push(ValidationError::new(
            "gateway.endpoint",
            format!("'{}' must be host:port", config.gateway.endpoint),
        ));
    }

    if config.gateway.connect_timeout_secs == 0 {
        errors.push(ValidationError::new("gateway.connect_timeout_secs", "must be greater than 0"));
    }

    let max = MAX_PHASE_TIMEOUT.as_secs();
    let deadlines = [
        ("timeouts.evaluate_secs", config.timeouts.evaluate_secs),
        ("timeouts.endorse_secs", config.timeouts.endorse_secs),
        ("timeouts.submit_secs", config.timeouts.submit_secs),
        ("timeouts.commit_status_secs", config.timeouts.commit_status_secs),
    ];
    for (field, secs) in deadlines {
        if secs > max {
            errors.push(ValidationError::new(field, format!("{}s exceeds maximum {}s", secs, max)));
        }
    }

    if config.http.request_timeout_secs < config.timeouts.write_path_secs() {
        errors.push(ValidationError::new(
            "http.request_timeout_secs",
            format!(
                "{}s is shorter than a full write ({}s)",
                config.http.request_timeout_secs,
                config.timeouts.write_path_secs()
            ),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn has_port(endpoint: &str) -> bool {
    endpoint
        .rsplit_once(':')
        .map(|(host, port)| !host.is_empty() && port.parse::<u16>().is_ok())
        .unwrap_or(false)
}
