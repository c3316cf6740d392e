pub mod backend;
mod context;
pub mod equalizer;
pub mod graph;
pub mod node;
pub mod nodes;

pub use backend::{AudioBackend, ContextInfo, ContextState, HeadlessBackend};
pub use context::{AudioContext, ContextCell, ContextConfig, ContextError};
pub use equalizer::FilterBank;
pub use graph::{AudioGraph, GraphConfig, NodeID};
