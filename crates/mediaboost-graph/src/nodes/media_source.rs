use mediaboost_core::ElementId;

use crate::node::{AudioNode, AudioNodeInfo};

/// The native audio output of a media element.
///
/// Created through
/// [`AudioGraph::create_media_element_source`](crate::graph::AudioGraph::create_media_element_source).
pub struct MediaElementSourceNode {
    element: ElementId,
}

impl MediaElementSourceNode {
    pub(crate) fn new(element: ElementId) -> Self {
        Self { element }
    }

    pub fn element(&self) -> ElementId {
        self.element
    }
}

impl AudioNode for MediaElementSourceNode {
    fn debug_name(&self) -> &'static str {
        "media_source"
    }

    fn info(&self) -> AudioNodeInfo {
        AudioNodeInfo {
            num_inputs: 0,
            num_outputs: 1,
        }
    }
}
