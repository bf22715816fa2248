//! Error responses.
//!
//! # Responsibilities
//! - Map gateway failures to HTTP status codes
//! - Render a JSON error body with a stable error kind
//!
//! # Design Decisions
//! - Any phase deadline exceeded results in 504 Gateway Timeout
//! - Remote rejections and undecodable results are 502; an invalid commit is a 409 conflict
//! - Local setup problems (credentials, config) are 500

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::gateway::types::GatewayError;

/// JSON body returned for every failed request.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}

/// A gateway failure surfaced over HTTP.
#[derive(Debug)]
pub struct ApiError(pub GatewayError);

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        if self.0.is_timeout() {
            return StatusCode::GATEWAY_TIMEOUT;
        }
        match &self.0 {
            GatewayError::Credential(_) | GatewayError::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            GatewayError::Session(_) => StatusCode::UNAUTHORIZED,
            GatewayError::Connection(_) => StatusCode::SERVICE_UNAVAILABLE,
            GatewayError::Commit { .. } => StatusCode::CONFLICT,
            // Outcome unknown: the transaction may still commit
            GatewayError::CommitStatus { .. } => StatusCode::GATEWAY_TIMEOUT,
            GatewayError::Endorse { .. }
            | GatewayError::Submit { .. }
            | GatewayError::Evaluate { .. }
            | GatewayError::Decode(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        tracing::warn!(
            status = status.as_u16(),
            error = %self.0,
            transaction_id = self.0.transaction_id().unwrap_or("-"),
            "Request failed"
        );

        let body = ErrorBody {
            error: self.0.kind(),
            message: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::protos::TxValidationCode;
    use crate::gateway::types::PhaseFailure;
    use std::time::Duration;

    fn status(err: GatewayError) -> StatusCode {
        ApiError(err).status_code()
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(status(GatewayError::Credential("x".into())), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(status(GatewayError::Session("x".into())), StatusCode::UNAUTHORIZED);
        assert_eq!(status(GatewayError::Connection("x".into())), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            status(GatewayError::Submit {
                transaction_id: "tx".into(),
                cause: PhaseFailure::Malformed("duplicate".into()),
            }),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status(GatewayError::Commit {
                transaction_id: "tx".into(),
                code: TxValidationCode::MvccReadConflict,
                block_number: 3,
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(status(GatewayError::Decode("x".into())), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_timeouts_are_gateway_timeout() {
        let err = GatewayError::Endorse {
            transaction_id: "tx".into(),
            cause: PhaseFailure::Timeout(Duration::ZERO),
        };
        assert_eq!(status(err), StatusCode::GATEWAY_TIMEOUT);
    }
}
