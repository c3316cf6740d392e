mod error;

use std::fmt::Debug;
use std::hash::Hash;

use ahash::{AHashMap, AHashSet};
use mediaboost_core::ElementId;
use smallvec::SmallVec;
use thunderdome::Arena;

use crate::node::AudioNode;
use crate::nodes::{DestinationNode, MediaElementSourceNode};

pub use self::error::{AddEdgeError, DisconnectError, RemoveNodeError, WrapError};

/// A globally unique identifier for a node.
#[derive(Clone, Copy)]
pub struct NodeID {
    pub idx: thunderdome::Index,
    pub debug_name: &'static str,
}

impl NodeID {
    pub const DANGLING: Self = Self {
        idx: thunderdome::Index::DANGLING,
        debug_name: "dangling",
    };
}

impl Default for NodeID {
    fn default() -> Self {
        Self::DANGLING
    }
}

impl PartialEq for NodeID {
    fn eq(&self, other: &Self) -> bool {
        self.idx == other.idx
    }
}

impl Eq for NodeID {}

impl Ord for NodeID {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.idx.cmp(&other.idx)
    }
}

impl PartialOrd for NodeID {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Hash for NodeID {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.idx.hash(state);
    }
}

impl Debug for NodeID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}-{}-{}",
            self.debug_name,
            self.idx.slot(),
            self.idx.generation()
        )
    }
}

/// The index for an input port on a particular node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InPortIdx(pub u32);

impl From<u32> for InPortIdx {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// The index for an output port on a particular node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OutPortIdx(pub u32);

impl From<u32> for OutPortIdx {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// A globally unique identifier for an [Edge].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EdgeID(thunderdome::Index);

/// An [Edge] is a connection from source node and port to a
/// destination node and port.
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
pub struct Edge {
    pub id: EdgeID,
    /// The ID of the source node used by this edge.
    pub src_node: NodeID,
    /// The ID of the source port used by this edge.
    pub src_port: OutPortIdx,
    /// The ID of the destination node used by this edge.
    pub dst_node: NodeID,
    /// The ID of the destination port used by this edge.
    pub dst_port: InPortIdx,
}

pub struct NodeEntry {
    pub id: NodeID,
    /// The number of input ports used by the node
    pub num_inputs: u32,
    /// The number of output ports used by the node
    pub num_outputs: u32,
    pub node: Box<dyn AudioNode>,
    /// The edges connected to this node's output ports.
    outgoing: SmallVec<[EdgeID; 4]>,
}

impl NodeEntry {
    /// The edges leaving this node.
    pub fn outgoing(&self) -> &[EdgeID] {
        &self.outgoing
    }
}

#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
struct EdgeHash {
    pub src_node: NodeID,
    pub src_port: OutPortIdx,
    pub dst_node: NodeID,
    pub dst_port: InPortIdx,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GraphConfig {
    pub initial_node_capacity: usize,
    pub initial_edge_capacity: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            initial_node_capacity: 64,
            initial_edge_capacity: 256,
        }
    }
}

/// The node graph of one audio context.
///
/// Input ports sum every connection made to them, so any number of chains
/// may feed the destination node.
pub struct AudioGraph {
    nodes: Arena<NodeEntry>,
    edges: Arena<Edge>,
    existing_edges: AHashMap<EdgeHash, EdgeID>,
    wrapped_elements: AHashMap<ElementId, NodeID>,

    destination_id: NodeID,
}

impl AudioGraph {
    pub fn new(config: &GraphConfig) -> Self {
        let mut graph = Self {
            nodes: Arena::with_capacity(config.initial_node_capacity),
            edges: Arena::with_capacity(config.initial_edge_capacity),
            existing_edges: AHashMap::with_capacity(config.initial_edge_capacity),
            wrapped_elements: AHashMap::new(),
            destination_id: NodeID::DANGLING,
        };

        graph.destination_id = graph.add_node(DestinationNode);

        graph
    }

    /// The ID of the node representing the output device
    pub fn destination(&self) -> NodeID {
        self.destination_id
    }

    /// Add a new node to the audio graph.
    ///
    /// This will return the globally unique ID assigned to this node.
    pub fn add_node(&mut self, node: impl AudioNode) -> NodeID {
        let node: Box<dyn AudioNode> = Box::new(node);
        let info = node.info();
        let debug_name = node.debug_name();

        let idx = self.nodes.insert(NodeEntry {
            id: NodeID::DANGLING,
            num_inputs: info.num_inputs,
            num_outputs: info.num_outputs,
            node,
            outgoing: SmallVec::new(),
        });
        let new_id = NodeID { idx, debug_name };
        self.nodes[idx].id = new_id;

        new_id
    }

    /// Wrap the native output of a media element as a source node.
    ///
    /// A media element can only be wrapped once for the lifetime of the
    /// graph, even if its source node is later removed.
    pub fn create_media_element_source(
        &mut self,
        element: ElementId,
    ) -> Result<NodeID, WrapError> {
        if let Some(&source_node) = self.wrapped_elements.get(&element) {
            return Err(WrapError::AlreadyWrapped {
                element,
                source_node,
            });
        }

        let id = self.add_node(MediaElementSourceNode::new(element));
        self.wrapped_elements.insert(element, id);

        Ok(id)
    }

    /// Whether the given media element has ever been wrapped.
    pub fn is_wrapped(&self, element: ElementId) -> bool {
        self.wrapped_elements.contains_key(&element)
    }

    /// Get a typed reference to the node.
    ///
    /// This will return `None` if a node with the given ID does not
    /// exist in the graph or if it is not of type `T`.
    pub fn node<T: AudioNode>(&self, node_id: NodeID) -> Option<&T> {
        self.nodes
            .get(node_id.idx)
            .and_then(|n| n.node.downcast_ref::<T>())
    }

    /// Get info about a node.
    ///
    /// This will return `None` if a node with the given ID does not
    /// exist in the graph.
    pub fn node_info(&self, node_id: NodeID) -> Option<&NodeEntry> {
        self.nodes.get(node_id.idx)
    }

    pub fn contains_node(&self, node_id: NodeID) -> bool {
        self.nodes.contains(node_id.idx)
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Remove the given node from the graph.
    ///
    /// This will automatically remove all edges from the graph that
    /// were connected to this node.
    ///
    /// On success, this returns a list of all edges that were removed
    /// from the graph as a result of removing this node.
    pub fn remove_node(&mut self, node_id: NodeID) -> Result<Vec<EdgeID>, RemoveNodeError> {
        if node_id == self.destination_id {
            return Err(RemoveNodeError::IsDestination);
        }
        if !self.nodes.contains(node_id.idx) {
            return Err(RemoveNodeError::NodeNotFound(node_id));
        }

        let removed_edges: Vec<EdgeID> = self
            .edges
            .iter()
            .filter(|(_, e)| e.src_node == node_id || e.dst_node == node_id)
            .map(|(idx, _)| EdgeID(idx))
            .collect();

        for edge_id in removed_edges.iter() {
            self.disconnect_by_edge_id(*edge_id);
        }

        self.nodes.remove(node_id.idx);

        Ok(removed_edges)
    }

    /// Get a list of all the existing nodes in the graph.
    pub fn nodes<'a>(&'a self) -> impl Iterator<Item = &'a NodeEntry> {
        self.nodes.iter().map(|(_, n)| n)
    }

    /// Get a list of all the existing edges in the graph.
    pub fn edges<'a>(&'a self) -> impl Iterator<Item = &'a Edge> {
        self.edges.iter().map(|(_, e)| e)
    }

    /// Get information about the given [Edge]
    pub fn edge(&self, edge_id: EdgeID) -> Option<&Edge> {
        self.edges.get(edge_id.0)
    }

    /// Add a connection (edge) to the graph.
    ///
    /// * `src_node` - The ID of the source node.
    /// * `src_port` - The index of the source port. This must be an output
    /// port on the source node.
    /// * `dst_node` - The ID of the destination node.
    /// * `dst_port` - The index of the destination port. This must be an
    /// input port on the destination node.
    /// * `check_for_cycles` - If `true`, then this will run a check to
    /// see if adding this edge will create a cycle in the graph, and
    /// return an error if it does.
    ///
    /// If successful, this returns the globally unique identifier assigned
    /// to this edge.
    ///
    /// If this returns an error, then the audio graph has not been
    /// modified.
    pub fn connect(
        &mut self,
        src_node: NodeID,
        src_port: impl Into<OutPortIdx>,
        dst_node: NodeID,
        dst_port: impl Into<InPortIdx>,
        check_for_cycles: bool,
    ) -> Result<EdgeID, AddEdgeError> {
        let src_port: OutPortIdx = src_port.into();
        let dst_port: InPortIdx = dst_port.into();

        let src_node_entry = self
            .nodes
            .get(src_node.idx)
            .ok_or(AddEdgeError::SrcNodeNotFound(src_node))?;
        let dst_node_entry = self
            .nodes
            .get(dst_node.idx)
            .ok_or(AddEdgeError::DstNodeNotFound(dst_node))?;

        if src_port.0 >= src_node_entry.num_outputs {
            return Err(AddEdgeError::OutPortOutOfRange {
                node: src_node,
                port_idx: src_port,
                num_out_ports: src_node_entry.num_outputs,
            });
        }
        if dst_port.0 >= dst_node_entry.num_inputs {
            return Err(AddEdgeError::InPortOutOfRange {
                node: dst_node,
                port_idx: dst_port,
                num_in_ports: dst_node_entry.num_inputs,
            });
        }

        if src_node.idx == dst_node.idx {
            return Err(AddEdgeError::CycleDetected);
        }

        let edge_hash = EdgeHash {
            src_node,
            src_port,
            dst_node,
            dst_port,
        };

        if self.existing_edges.contains_key(&edge_hash) {
            return Err(AddEdgeError::EdgeAlreadyExists);
        }

        // The new edge closes a cycle if the source is already reachable
        // from the destination.
        if check_for_cycles && self.is_reachable(dst_node, src_node) {
            return Err(AddEdgeError::CycleDetected);
        }

        let new_edge_id = EdgeID(self.edges.insert(Edge {
            id: EdgeID(thunderdome::Index::DANGLING),
            src_node,
            src_port,
            dst_node,
            dst_port,
        }));
        self.edges[new_edge_id.0].id = new_edge_id;
        self.existing_edges.insert(edge_hash, new_edge_id);
        self.nodes[src_node.idx].outgoing.push(new_edge_id);

        Ok(new_edge_id)
    }

    /// Remove a connection (edge) from the graph.
    ///
    /// If the edge did not exist in the graph, then `false` will be
    /// returned.
    pub fn disconnect(
        &mut self,
        src_node: NodeID,
        src_port: impl Into<OutPortIdx>,
        dst_node: NodeID,
        dst_port: impl Into<InPortIdx>,
    ) -> bool {
        let edge_id = self
            .existing_edges
            .get(&EdgeHash {
                src_node,
                src_port: src_port.into(),
                dst_node,
                dst_port: dst_port.into(),
            })
            .copied();

        if let Some(edge_id) = edge_id {
            self.disconnect_by_edge_id(edge_id)
        } else {
            false
        }
    }

    /// Remove a connection (edge) from the graph by the [EdgeID].
    ///
    /// If the edge did not exist in the graph, then `false` will be
    /// returned.
    pub fn disconnect_by_edge_id(&mut self, edge_id: EdgeID) -> bool {
        if let Some(edge) = self.edges.remove(edge_id.0) {
            self.existing_edges.remove(&EdgeHash {
                src_node: edge.src_node,
                src_port: edge.src_port,
                dst_node: edge.dst_node,
                dst_port: edge.dst_port,
            });
            if let Some(src_entry) = self.nodes.get_mut(edge.src_node.idx) {
                src_entry.outgoing.retain(|id| *id != edge_id);
            }

            true
        } else {
            false
        }
    }

    /// Remove every outgoing connection of a node.
    ///
    /// On success, this returns the edges that were removed. A node with
    /// no outgoing connections is reported as
    /// [`DisconnectError::NotConnected`].
    pub fn disconnect_all(&mut self, node_id: NodeID) -> Result<Vec<EdgeID>, DisconnectError> {
        let entry = self
            .nodes
            .get(node_id.idx)
            .ok_or(DisconnectError::NodeNotFound(node_id))?;

        if entry.outgoing.is_empty() {
            return Err(DisconnectError::NotConnected(node_id));
        }

        let removed: Vec<EdgeID> = entry.outgoing.to_vec();
        for edge_id in removed.iter() {
            self.disconnect_by_edge_id(*edge_id);
        }

        Ok(removed)
    }

    /// The nodes directly fed by the given node.
    pub fn outputs_of<'a>(&'a self, node_id: NodeID) -> impl Iterator<Item = NodeID> + 'a {
        self.nodes
            .get(node_id.idx)
            .into_iter()
            .flat_map(|entry| entry.outgoing.iter())
            .filter_map(move |edge_id| self.edges.get(edge_id.0))
            .map(|edge| edge.dst_node)
    }

    /// Count the distinct directed paths from one node to another.
    pub fn count_paths(&self, from: NodeID, to: NodeID) -> usize {
        let mut memo: AHashMap<NodeID, usize> = AHashMap::new();
        self.count_paths_inner(from, to, &mut memo)
    }

    fn count_paths_inner(
        &self,
        current: NodeID,
        to: NodeID,
        memo: &mut AHashMap<NodeID, usize>,
    ) -> usize {
        if current == to {
            return 1;
        }
        if let Some(&n) = memo.get(&current) {
            return n;
        }

        // Mark as visited before recursing so a malformed cyclic graph
        // terminates.
        memo.insert(current, 0);

        let next: SmallVec<[NodeID; 4]> = self.outputs_of(current).collect();
        let n = next
            .into_iter()
            .map(|dst| self.count_paths_inner(dst, to, memo))
            .sum();

        memo.insert(current, n);
        n
    }

    fn is_reachable(&self, from: NodeID, to: NodeID) -> bool {
        let mut visited: AHashSet<NodeID> = AHashSet::new();
        let mut stack = vec![from];

        while let Some(node_id) = stack.pop() {
            if node_id == to {
                return true;
            }
            if visited.insert(node_id) {
                stack.extend(self.outputs_of(node_id));
            }
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::GainNode;

    //  ┌─────┐  ┌──────┐  ┌──────┐  ┌─────┐
    //  │ src ┼──► gain ┼──► gain ┼──► dst │
    //  └─────┘  └──────┘  └──────┘  └─────┘
    #[test]
    fn simple_chain() {
        let mut graph = AudioGraph::new(&GraphConfig::default());
        let element = ElementId(thunderdome::Arena::<()>::new().insert(()));

        let src = graph.create_media_element_source(element).unwrap();
        let g0 = graph.add_node(GainNode::new(1.0));
        let g1 = graph.add_node(GainNode::new(1.0));
        let dst = graph.destination();

        graph.connect(src, 0, g0, 0, true).unwrap();
        graph.connect(g0, 0, g1, 0, true).unwrap();
        graph.connect(g1, 0, dst, 0, true).unwrap();

        assert_eq!(graph.count_paths(src, dst), 1);
        assert_eq!(graph.num_edges(), 3);
        assert_eq!(graph.outputs_of(g0).collect::<Vec<_>>(), vec![g1]);

        // A bypass edge adds a second path.
        graph.connect(g0, 0, dst, 0, true).unwrap();
        assert_eq!(graph.count_paths(src, dst), 2);
    }

    #[test]
    fn connect_errors() {
        let mut graph = AudioGraph::new(&GraphConfig::default());
        let g0 = graph.add_node(GainNode::new(1.0));
        let g1 = graph.add_node(GainNode::new(1.0));
        let dst = graph.destination();

        graph.connect(g0, 0, g1, 0, true).unwrap();

        assert_eq!(
            graph.connect(g0, 0, g1, 0, true),
            Err(AddEdgeError::EdgeAlreadyExists)
        );
        assert_eq!(
            graph.connect(g1, 0, g0, 0, true),
            Err(AddEdgeError::CycleDetected)
        );
        assert_eq!(
            graph.connect(g0, 0, g0, 0, false),
            Err(AddEdgeError::CycleDetected)
        );
        assert!(matches!(
            graph.connect(dst, 0, g0, 0, true),
            Err(AddEdgeError::OutPortOutOfRange { .. })
        ));
        assert!(matches!(
            graph.connect(g0, 0, g1, 1, true),
            Err(AddEdgeError::InPortOutOfRange { .. })
        ));
        assert_eq!(graph.num_edges(), 1);
    }

    #[test]
    fn destination_accepts_many_inputs() {
        let mut graph = AudioGraph::new(&GraphConfig::default());
        let g0 = graph.add_node(GainNode::new(1.0));
        let g1 = graph.add_node(GainNode::new(1.0));
        let dst = graph.destination();

        graph.connect(g0, 0, dst, 0, true).unwrap();
        graph.connect(g1, 0, dst, 0, true).unwrap();

        assert_eq!(graph.count_paths(g0, dst), 1);
        assert_eq!(graph.count_paths(g1, dst), 1);
    }

    #[test]
    fn disconnect_all_reports_unconnected_nodes() {
        let mut graph = AudioGraph::new(&GraphConfig::default());
        let g0 = graph.add_node(GainNode::new(1.0));
        let dst = graph.destination();

        assert_eq!(
            graph.disconnect_all(g0),
            Err(DisconnectError::NotConnected(g0))
        );

        graph.connect(g0, 0, dst, 0, true).unwrap();
        assert_eq!(graph.disconnect_all(g0).unwrap().len(), 1);
        assert_eq!(graph.count_paths(g0, dst), 0);
        assert_eq!(
            graph.disconnect_all(g0),
            Err(DisconnectError::NotConnected(g0))
        );

        graph.remove_node(g0).unwrap();
        assert_eq!(
            graph.disconnect_all(g0),
            Err(DisconnectError::NodeNotFound(g0))
        );
    }

    #[test]
    fn remove_node_drops_its_edges() {
        let mut graph = AudioGraph::new(&GraphConfig::default());
        let g0 = graph.add_node(GainNode::new(1.0));
        let g1 = graph.add_node(GainNode::new(1.0));
        let dst = graph.destination();

        graph.connect(g0, 0, g1, 0, true).unwrap();
        graph.connect(g1, 0, dst, 0, true).unwrap();

        assert_eq!(graph.remove_node(g1).unwrap().len(), 2);
        assert_eq!(graph.num_edges(), 0);
        assert!(graph.node_info(g0).unwrap().outgoing().is_empty());
        assert_eq!(graph.remove_node(dst), Err(RemoveNodeError::IsDestination));
        assert_eq!(graph.remove_node(g1), Err(RemoveNodeError::NodeNotFound(g1)));
    }

    #[test]
    fn elements_are_wrapped_once() {
        let mut graph = AudioGraph::new(&GraphConfig::default());
        let element = ElementId(thunderdome::Arena::<()>::new().insert(()));

        let src = graph.create_media_element_source(element).unwrap();
        assert!(graph.is_wrapped(element));
        assert_eq!(
            graph.create_media_element_source(element),
            Err(WrapError::AlreadyWrapped {
                element,
                source_node: src,
            })
        );

        // Removing the source does not make the element wrappable again.
        graph.remove_node(src).unwrap();
        assert!(graph.create_media_element_source(element).is_err());
    }

    #[test]
    fn typed_node_access() {
        let mut graph = AudioGraph::new(&GraphConfig::default());
        let g0 = graph.add_node(GainNode::new(0.5));

        assert_eq!(graph.node::<GainNode>(g0).unwrap().gain().value(), 0.5);
        assert!(graph.node::<DestinationNode>(g0).is_none());
        assert!(graph.node::<DestinationNode>(graph.destination()).is_some());
    }
}
