use downcast_rs::{impl_downcast, Downcast};

/// A node in an [`AudioGraph`](crate::graph::AudioGraph).
///
/// Nodes only describe their parameters and port layout. Rendering is done
/// by the platform.
pub trait AudioNode: Downcast {
    fn debug_name(&self) -> &'static str;

    fn info(&self) -> AudioNodeInfo;
}

impl_downcast!(AudioNode);

/// Additional information about an [`AudioNode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioNodeInfo {
    /// The number of input ports on this node
    pub num_inputs: u32,
    /// The number of output ports on this node
    pub num_outputs: u32,
}
