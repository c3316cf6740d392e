use mediaboost_core::ElementId;

use super::{InPortIdx, NodeID, OutPortIdx};

/// An error occurred while attempting to add an edge to the graph.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddEdgeError {
    /// The given source node was not found in the graph.
    #[error("Could not add edge: could not find source node with ID {0:?}")]
    SrcNodeNotFound(NodeID),
    /// The given destination node was not found in the graph.
    #[error("Could not add edge: could not find destination node with ID {0:?}")]
    DstNodeNotFound(NodeID),
    /// The given input port index is out of range.
    #[error("Input port idx {port_idx:?} is out of range on node {node:?} with {num_in_ports} input ports")]
    InPortOutOfRange {
        node: NodeID,
        port_idx: InPortIdx,
        num_in_ports: u32,
    },
    /// The given output port index is out of range.
    #[error("Output port idx {port_idx:?} is out of range on node {node:?} with {num_out_ports} output ports")]
    OutPortOutOfRange {
        node: NodeID,
        port_idx: OutPortIdx,
        num_out_ports: u32,
    },
    /// The edge already exists in the graph.
    #[error("Could not add edge: edge already exists in the graph")]
    EdgeAlreadyExists,
    /// This edge would have created a cycle in the graph.
    #[error("Could not add edge: cycle was detected")]
    CycleDetected,
}

/// An error occurred while attempting to disconnect a node.
///
/// Some platforms treat disconnecting a node with no outgoing connections
/// as a no-op and others as an error. This graph reports it so callers can
/// decide.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DisconnectError {
    #[error("Could not disconnect: could not find node with ID {0:?}")]
    NodeNotFound(NodeID),
    #[error("Could not disconnect: node with ID {0:?} has no outgoing connections")]
    NotConnected(NodeID),
}

/// An error occurred while attempting to remove a node.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoveNodeError {
    #[error("Could not remove node: could not find node with ID {0:?}")]
    NodeNotFound(NodeID),
    #[error("Could not remove node: the destination node cannot be removed")]
    IsDestination,
}

/// An error occurred while attempting to wrap a media element as a source.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WrapError {
    /// A media element can only ever be wrapped once.
    #[error("Media element {element:?} is already wrapped by source node {source_node:?}")]
    AlreadyWrapped {
        element: ElementId,
        source_node: NodeID,
    },
}
