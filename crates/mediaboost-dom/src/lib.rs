mod document;
mod media;
mod mutation;

pub use document::{Document, DomError, NodeData};
pub use media::MediaKind;
pub use mutation::{MutationRecord, ObserveOptions};

pub use mediaboost_core::ElementId;
