use std::fmt::Debug;

/// The identity of a node in a document.
///
/// This is the key used to track which media elements already have a
/// processing chain, and which have already been wrapped by the audio
/// context.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementId(pub thunderdome::Index);

impl ElementId {
    pub const DANGLING: Self = Self(thunderdome::Index::DANGLING);
}

impl Debug for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "element-{}-{}", self.0.slot(), self.0.generation())
    }
}
