//! The per-document audio graph manager.
//!
//! Every media element in a document gets its own processing chain:
//!
//! ```text
//! source -> [low shelf -> peaking x3 -> high shelf] -> gain -> destination
//! ```
//!
//! where the bracketed equalizer stage is only present while the equalizer
//! is enabled. [`DocumentAudioManager`] discovers elements, keeps the last
//! applied [`DesiredConfig`](mediaboost_core::DesiredConfig) for the
//! session, and brings every chain in line with it.

mod chain;
mod manager;
mod reconciler;
mod registry;
mod session;
mod watcher;

pub use chain::ProcessingChain;
pub use manager::{BatchReport, DocumentAudioManager, ManagerConfig};
pub use reconciler::{ReconcileError, ReconcileOutcome, Reconciler};
pub use registry::Registry;
pub use session::SessionStore;
pub use watcher::ElementWatcher;
