//! The message schema between the control surface and a document.

use serde::{Deserialize, Serialize};

use crate::{DesiredConfig, EqualizerSetting};

/// A message sent from the control surface to a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Request {
    SetVolume(SetVolume),
}

impl Request {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Apply a volume (and optionally an equalizer) to every media element
/// in the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetVolume {
    /// The volume in percent, where `100` is unity gain.
    pub volume: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equalizer: Option<EqualizerPayload>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EqualizerPayload {
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<f32>>,
}

impl SetVolume {
    pub fn desired_config(&self) -> DesiredConfig {
        let equalizer = match &self.equalizer {
            Some(EqualizerPayload {
                enabled: true,
                values,
            }) => EqualizerSetting::enabled(values.as_deref().unwrap_or_default()),
            _ => EqualizerSetting::Disabled,
        };

        DesiredConfig {
            volume_percent: self.volume,
            equalizer,
        }
    }
}

/// The reply sent back to the control surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub success: bool,
    pub message: String,
    pub elements_processed: u32,
}
