use ahash::AHashSet;
use mediaboost_core::ElementId;
use mediaboost_dom::{Document, MutationRecord, ObserveOptions};

/// Finds media elements that were inserted into a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementWatcher {
    options: ObserveOptions,
}

impl ElementWatcher {
    pub fn new(options: ObserveOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> ObserveOptions {
        self.options
    }

    /// Start observing the body of the document.
    pub fn observe(&self, document: &mut Document) {
        document.observe(document.body(), self.options);
    }

    /// The media elements inserted by a batch of mutation records, in the
    /// order they were inserted.
    ///
    /// An inserted node counts if it is a media element itself, or for every
    /// media element in its subtree. Each element is listed once, and nodes
    /// that have left the document again by the time the batch is handled
    /// are skipped.
    pub fn collect(&self, document: &Document, records: &[MutationRecord]) -> Vec<ElementId> {
        let mut seen = AHashSet::new();
        let mut found = Vec::new();

        let added = records.iter().flat_map(|record| record.added_nodes.iter());

        for &node in added {
            if !document.is_element(node) || !document.is_connected(node) {
                continue;
            }

            let candidates = document
                .is_media(node)
                .then_some(node)
                .into_iter()
                .chain(document.descendant_media(node));

            for element in candidates {
                if seen.insert(element) {
                    found.push(element);
                }
            }
        }

        found
    }
}

impl Default for ElementWatcher {
    fn default() -> Self {
        Self::new(ObserveOptions::default())
    }
}
