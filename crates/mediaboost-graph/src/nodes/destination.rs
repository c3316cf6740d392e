use crate::node::{AudioNode, AudioNodeInfo};

/// The final output of an audio context, i.e. the output device.
pub struct DestinationNode;

impl AudioNode for DestinationNode {
    fn debug_name(&self) -> &'static str {
        "destination"
    }

    fn info(&self) -> AudioNodeInfo {
        AudioNodeInfo {
            num_inputs: 1,
            num_outputs: 0,
        }
    }
}
