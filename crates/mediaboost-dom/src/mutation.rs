use mediaboost_core::ElementId;
use smallvec::SmallVec;

bitflags::bitflags! {
    /// Which changes an observer is notified about.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ObserveOptions: u32 {
        /// Children added to or removed from the target.
        const CHILD_LIST = 0b01;
        /// Extend observation to every descendant of the target.
        const SUBTREE = 0b10;
    }
}

impl Default for ObserveOptions {
    fn default() -> Self {
        Self::CHILD_LIST | Self::SUBTREE
    }
}

/// A single change to the children of a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    /// The node whose children changed.
    pub target: ElementId,
    pub added_nodes: SmallVec<[ElementId; 2]>,
    pub removed_nodes: SmallVec<[ElementId; 2]>,
}
