use mediaboost_core::ElementId;
use smallvec::{smallvec, SmallVec};
use thunderdome::Arena;

use crate::{media::MediaKind, mutation::MutationRecord, ObserveOptions};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    Element { tag: String },
    Text(String),
}

struct DocNode {
    data: NodeData,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    #[error("Node {0:?} does not exist in the document")]
    NodeNotFound(ElementId),
    #[error("Node {child:?} cannot be inserted into {parent:?}")]
    HierarchyRequest { parent: ElementId, child: ElementId },
    #[error("The document root cannot be removed")]
    RemoveRoot,
}

struct Observer {
    target: ElementId,
    options: ObserveOptions,
}

/// A tree of elements and text, with mutation observation.
///
/// A new document has an `html` root with a single `body` child.
pub struct Document {
    nodes: Arena<DocNode>,
    root: ElementId,
    body: ElementId,

    observer: Option<Observer>,
    pending_records: Vec<MutationRecord>,
}

impl Document {
    pub fn new() -> Self {
        let mut nodes = Arena::new();

        let root = ElementId(nodes.insert(DocNode {
            data: NodeData::Element { tag: "html".into() },
            parent: None,
            children: Vec::new(),
        }));
        let body = ElementId(nodes.insert(DocNode {
            data: NodeData::Element { tag: "body".into() },
            parent: Some(root),
            children: Vec::new(),
        }));
        nodes[root.0].children.push(body);

        Self {
            nodes,
            root,
            body,
            observer: None,
            pending_records: Vec::new(),
        }
    }

    pub fn root(&self) -> ElementId {
        self.root
    }

    pub fn body(&self) -> ElementId {
        self.body
    }

    /// Create a detached element.
    pub fn create_element(&mut self, tag: &str) -> ElementId {
        self.create_node(NodeData::Element { tag: tag.into() })
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: &str) -> ElementId {
        self.create_node(NodeData::Text(text.into()))
    }

    fn create_node(&mut self, data: NodeData) -> ElementId {
        ElementId(self.nodes.insert(DocNode {
            data,
            parent: None,
            children: Vec::new(),
        }))
    }

    pub fn data(&self, id: ElementId) -> Option<&NodeData> {
        self.nodes.get(id.0).map(|n| &n.data)
    }

    /// The tag name of an element, or `None` for text nodes and unknown
    /// nodes.
    pub fn tag(&self, id: ElementId) -> Option<&str> {
        match self.data(id)? {
            NodeData::Element { tag } => Some(tag),
            NodeData::Text(_) => None,
        }
    }

    pub fn is_element(&self, id: ElementId) -> bool {
        self.tag(id).is_some()
    }

    /// The media kind of a node, or `None` if it does not produce audio.
    pub fn media_kind(&self, id: ElementId) -> Option<MediaKind> {
        self.tag(id).and_then(MediaKind::from_tag)
    }

    pub fn is_media(&self, id: ElementId) -> bool {
        self.media_kind(id).is_some()
    }

    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.nodes.get(id.0).and_then(|n| n.parent)
    }

    pub fn children(&self, id: ElementId) -> &[ElementId] {
        self.nodes
            .get(id.0)
            .map(|n| n.children.as_slice())
            .unwrap_or_default()
    }

    /// Whether the node is `ancestor` or one of its descendants.
    pub fn is_inclusive_descendant(&self, id: ElementId, ancestor: ElementId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    /// Whether the node is attached to this document's tree.
    pub fn is_connected(&self, id: ElementId) -> bool {
        self.nodes.contains(id.0) && self.is_inclusive_descendant(id, self.root)
    }

    /// Append `child` as the last child of `parent`, moving it from its
    /// current parent if it has one.
    pub fn append_child(&mut self, parent: ElementId, child: ElementId) -> Result<(), DomError> {
        if !self.nodes.contains(parent.0) {
            return Err(DomError::NodeNotFound(parent));
        }
        if !self.nodes.contains(child.0) {
            return Err(DomError::NodeNotFound(child));
        }
        if !self.is_element(parent) || self.is_inclusive_descendant(parent, child) {
            return Err(DomError::HierarchyRequest { parent, child });
        }

        if self.parent(child).is_some() {
            self.remove(child)?;
        }

        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);

        self.queue_record(MutationRecord {
            target: parent,
            added_nodes: smallvec![child],
            removed_nodes: SmallVec::new(),
        });

        Ok(())
    }

    /// Detach a node (and its subtree) from its parent.
    ///
    /// The node stays valid and may be appended again. Removing a node
    /// that is already detached does nothing.
    pub fn remove(&mut self, id: ElementId) -> Result<(), DomError> {
        if id == self.root {
            return Err(DomError::RemoveRoot);
        }

        let node = self.nodes.get_mut(id.0).ok_or(DomError::NodeNotFound(id))?;
        let Some(parent) = node.parent.take() else {
            return Ok(());
        };

        if let Some(parent_node) = self.nodes.get_mut(parent.0) {
            parent_node.children.retain(|c| *c != id);
        }

        self.queue_record(MutationRecord {
            target: parent,
            added_nodes: SmallVec::new(),
            removed_nodes: smallvec![id],
        });

        Ok(())
    }

    /// Every media element that is a descendant of `id` (not including
    /// `id` itself), in document order.
    pub fn descendant_media(&self, id: ElementId) -> Vec<ElementId> {
        let mut found = Vec::new();
        let mut stack: Vec<ElementId> = self.children(id).iter().rev().copied().collect();

        while let Some(node) = stack.pop() {
            if self.is_media(node) {
                found.push(node);
            }
            stack.extend(self.children(node).iter().rev());
        }

        found
    }

    /// Every media element in the document, in document order.
    pub fn media_elements(&self) -> Vec<ElementId> {
        self.descendant_media(self.root)
    }

    /// Start queueing [`MutationRecord`]s for changes under `target`.
    ///
    /// This replaces any previous observation.
    pub fn observe(&mut self, target: ElementId, options: ObserveOptions) {
        self.observer = Some(Observer { target, options });
    }

    /// Stop observing and drop any records that were not taken yet.
    pub fn disconnect_observer(&mut self) {
        self.observer = None;
        self.pending_records.clear();
    }

    /// Take every mutation record queued since the last call.
    pub fn take_records(&mut self) -> Vec<MutationRecord> {
        std::mem::take(&mut self.pending_records)
    }

    pub fn has_pending_records(&self) -> bool {
        !self.pending_records.is_empty()
    }

    fn queue_record(&mut self, record: MutationRecord) {
        let Some(observer) = &self.observer else {
            return;
        };

        if !observer.options.contains(ObserveOptions::CHILD_LIST) {
            return;
        }

        let observed = if observer.options.contains(ObserveOptions::SUBTREE) {
            self.is_inclusive_descendant(record.target, observer.target)
        } else {
            record.target == observer.target
        };

        if observed {
            self.pending_records.push(record);
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
