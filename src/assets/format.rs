//! Asset records and result formatting.

use serde::{Deserialize, Serialize};

use crate::gateway::types::{GatewayError, GatewayResult};

/// An asset record as stored by the asset contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Asset {
    #[serde(rename = "ID")]
    pub id: String,
    pub color: String,
    pub size: u32,
    pub owner: String,
    pub appraised_value: u64,
}

impl Asset {
    /// Arguments for the `CreateAsset` contract function, in order.
    pub fn to_args(&self) -> [String; 5] {
        [
            self.id.clone(),
            self.color.clone(),
            self.size.to_string(),
            self.owner.clone(),
            self.appraised_value.to_string(),
        ]
    }
}

/// Re-indent a JSON payload with two-space indentation.
pub fn pretty_json(payload: &[u8]) -> GatewayResult<String> {
    let value: serde_json::Value = serde_json::from_slice(payload)
        .map_err(|e| GatewayError::Decode(format!("result is not valid JSON: {}", e)))?;
    serde_json::to_string_pretty(&value).map_err(|e| GatewayError::Decode(e.to_string()))
}

/// Decode a `GetAllAssets` payload, preserving ledger order.
pub fn parse_assets(payload: &[u8]) -> GatewayResult<Vec<Asset>> {
    // An empty world state comes back as an empty payload
    if payload.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }
    serde_json::from_slice(payload)
        .map_err(|e| GatewayError::Decode(format!("asset list is not valid JSON: {}", e)))
}
