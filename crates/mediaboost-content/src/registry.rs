use std::collections::hash_map::Entry;

use ahash::AHashMap;
use mediaboost_core::ElementId;

use crate::chain::ProcessingChain;

/// The processing chain of every media element seen in a document.
///
/// Entries are never removed. A chain whose element has left the document
/// stays registered so the element keeps its chain if it is inserted again.
#[derive(Debug, Default)]
pub struct Registry {
    chains: AHashMap<ElementId, ProcessingChain>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, element: ElementId) -> Option<&ProcessingChain> {
        self.chains.get(&element)
    }

    pub fn contains(&self, element: ElementId) -> bool {
        self.chains.contains_key(&element)
    }

    /// The slot of an element, for registering it on first sight.
    pub(crate) fn entry(&mut self, element: ElementId) -> Entry<'_, ElementId, ProcessingChain> {
        self.chains.entry(element)
    }

    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ElementId, &ProcessingChain)> {
        self.chains.iter().map(|(element, chain)| (*element, chain))
    }
}
