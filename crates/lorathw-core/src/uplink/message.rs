use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use super::UplinkError;

/// Application uplink as delivered by the TTN v2 handler.
///
/// Only the fields the decoder needs are kept; unknown keys are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UplinkMessage {
    pub dev_id: String,
    #[serde(default)]
    pub port: u8,
    /// Base64 encoded device payload.
    pub payload_raw: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<UplinkMetadata>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UplinkMetadata {
    /// Gateway-side receive time (RFC3339).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
}

impl UplinkMessage {
    pub fn from_json_str(text: &str) -> Result<Self, UplinkError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn payload_bytes(&self) -> Result<Vec<u8>, UplinkError> {
        Ok(STANDARD.decode(self.payload_raw.trim())?)
    }

    /// Receive time, if the uplink carries one.
    pub fn received_at(&self) -> Result<Option<OffsetDateTime>, UplinkError> {
        let Some(value) = self.metadata.as_ref().and_then(|meta| meta.time.as_deref()) else {
            return Ok(None);
        };
        OffsetDateTime::parse(value, &Rfc3339)
            .map(Some)
            .map_err(|source| UplinkError::InvalidTime {
                value: value.to_string(),
                source,
            })
    }
}
