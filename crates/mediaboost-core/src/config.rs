use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use crate::{param::range::percent_volume_to_gain, NUM_EQ_BANDS};

/// Per-band equalizer gains in decibels, in band order.
///
/// This may hold fewer than [`NUM_EQ_BANDS`] values. Missing bands are
/// treated as 0 dB when applied.
pub type BandGains = ArrayVec<f32, NUM_EQ_BANDS>;

/// Whether the equalizer stage is present in a processing chain.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum EqualizerSetting {
    #[default]
    Disabled,
    Enabled { gains: BandGains },
}

impl EqualizerSetting {
    /// Enable the equalizer with the given per-band gains.
    ///
    /// Values past the last band are ignored.
    pub fn enabled(values: &[f32]) -> Self {
        Self::Enabled {
            gains: values.iter().copied().take(NUM_EQ_BANDS).collect(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Enabled { .. })
    }

    /// The per-band gains, or `None` if the equalizer is disabled.
    pub fn gains(&self) -> Option<&[f32]> {
        match self {
            Self::Disabled => None,
            Self::Enabled { gains } => Some(gains.as_slice()),
        }
    }
}

/// The volume and equalizer settings a processing chain should have.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesiredConfig {
    /// `100` is unity gain. Values above `100` amplify.
    pub volume_percent: u32,
    #[serde(default)]
    pub equalizer: EqualizerSetting,
}

impl DesiredConfig {
    pub fn new(volume_percent: u32) -> Self {
        Self {
            volume_percent,
            equalizer: EqualizerSetting::Disabled,
        }
    }

    pub fn with_equalizer(mut self, values: &[f32]) -> Self {
        self.equalizer = EqualizerSetting::enabled(values);
        self
    }

    /// The raw (linear) gain corresponding to [`DesiredConfig::volume_percent`].
    pub fn gain(&self) -> f32 {
        percent_volume_to_gain(self.volume_percent)
    }
}

impl Default for DesiredConfig {
    fn default() -> Self {
        Self::new(100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extra_band_values_are_dropped() {
        let eq = EqualizerSetting::enabled(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
        assert_eq!(eq.gains(), Some(&[1.0, 2.0, 3.0, 4.0, 5.0][..]));
    }

    #[test]
    fn short_band_values_are_kept_short() {
        let eq = EqualizerSetting::enabled(&[4.0, -2.0]);
        assert_eq!(eq.gains(), Some(&[4.0, -2.0][..]));
        assert!(eq.is_enabled());
    }

    #[test]
    fn gain_is_linear_in_percent() {
        assert_eq!(DesiredConfig::new(150).gain(), 1.5);
        assert_eq!(DesiredConfig::new(80).gain(), 0.8);
        assert_eq!(DesiredConfig::new(0).gain(), 0.0);
        assert_eq!(DesiredConfig::default().gain(), 1.0);
    }

    #[test]
    fn session_json_shape() {
        let config = DesiredConfig::new(250).with_equalizer(&[6.0, 3.0, -2.0, 3.0, 5.0]);
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(
            json,
            r#"{"volumePercent":250,"equalizer":{"mode":"enabled","gains":[6.0,3.0,-2.0,3.0,5.0]}}"#
        );
        let back: DesiredConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
