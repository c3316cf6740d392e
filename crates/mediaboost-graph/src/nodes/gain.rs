use mediaboost_core::param::{range::LinearRange, AudioParam};

use crate::node::{AudioNode, AudioNodeInfo};

const GAIN_RANGE: LinearRange = LinearRange::new(0.0, f32::MAX);

/// Scales its input by a raw (linear) gain factor.
pub struct GainNode {
    gain: AudioParam,
}

impl GainNode {
    pub fn new(raw_gain: f32) -> Self {
        Self {
            gain: AudioParam::new(raw_gain, GAIN_RANGE),
        }
    }

    pub fn gain(&self) -> &AudioParam {
        &self.gain
    }

    /// Returns the gain that was actually stored.
    pub fn set_gain(&self, raw_gain: f32) -> f32 {
        self.gain.set_value(raw_gain)
    }
}

impl AudioNode for GainNode {
    fn debug_name(&self) -> &'static str {
        "gain"
    }

    fn info(&self) -> AudioNodeInfo {
        AudioNodeInfo {
            num_inputs: 1,
            num_outputs: 1,
        }
    }
}
