use mediaboost_graph::{graph::AudioGraph, nodes::GainNode, FilterBank, NodeID};

/// The nodes owned by one media element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessingChain {
    pub(crate) source: NodeID,
    pub(crate) gain: NodeID,
    pub(crate) equalizer: Option<FilterBank>,
}

impl ProcessingChain {
    /// The node wrapping the element's native output.
    pub fn source(&self) -> NodeID {
        self.source
    }

    pub fn gain(&self) -> NodeID {
        self.gain
    }

    pub fn equalizer(&self) -> Option<&FilterBank> {
        self.equalizer.as_ref()
    }

    pub fn equalizer_enabled(&self) -> bool {
        self.equalizer.is_some()
    }

    /// The raw gain currently set on the chain's gain node.
    pub fn gain_value(&self, graph: &AudioGraph) -> Option<f32> {
        graph
            .node::<GainNode>(self.gain)
            .map(|node| node.gain().value())
    }

    /// Every node in the chain in signal order.
    pub fn nodes(&self) -> Vec<NodeID> {
        let mut nodes = vec![self.source];
        if let Some(bank) = &self.equalizer {
            nodes.extend_from_slice(bank.filters());
        }
        nodes.push(self.gain);
        nodes
    }
}
