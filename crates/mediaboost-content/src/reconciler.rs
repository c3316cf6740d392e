use std::collections::hash_map::Entry;

use mediaboost_core::{DesiredConfig, ElementId};
use mediaboost_graph::{
    graph::{AddEdgeError, AudioGraph, WrapError},
    nodes::GainNode,
    AudioBackend, AudioContext, ContextCell, FilterBank, NodeID,
};

use crate::{chain::ProcessingChain, registry::Registry};

/// What a successful reconciliation did to an element's chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReconcileOutcome {
    /// The element was seen for the first time and a chain was built.
    Created,
    /// Only parameter values changed. The signal path was not interrupted.
    ParamsUpdated,
    /// The equalizer was added or removed, so the chain was rewired.
    Rebuilt,
}

/// A reconciliation of a single element failed.
///
/// None of these are fatal to the document. Other elements are unaffected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReconcileError {
    #[error("No audio context is available")]
    ContextUnavailable,
    /// The element was wrapped through another path before it was
    /// registered here.
    #[error(transparent)]
    AlreadyWrapped(#[from] WrapError),
    #[error("Failed to wire processing chain: {0}")]
    Graph(#[from] AddEdgeError),
}

/// Brings the processing chain of an element in line with a
/// [`DesiredConfig`].
pub struct Reconciler<'a, B: AudioBackend> {
    contexts: &'a mut ContextCell<B>,
    registry: &'a mut Registry,
}

impl<'a, B: AudioBackend> Reconciler<'a, B> {
    pub fn new(contexts: &'a mut ContextCell<B>, registry: &'a mut Registry) -> Self {
        Self { contexts, registry }
    }

    /// Build the chain of an unregistered element, or update the chain of a
    /// registered one.
    ///
    /// Volume and per-band gain changes are applied in place. The chain is
    /// only rewired when the equalizer is switched on or off.
    pub fn reconcile(
        &mut self,
        element: ElementId,
        config: &DesiredConfig,
    ) -> Result<ReconcileOutcome, ReconcileError> {
        let cx = self
            .contexts
            .get_or_create()
            .map_err(|_| ReconcileError::ContextUnavailable)?;

        let slot = match self.registry.entry(element) {
            Entry::Occupied(mut entry) => return update_chain(cx, entry.get_mut(), config),
            Entry::Vacant(slot) => slot,
        };

        let chain = build_chain(cx, element, config)?;
        slot.insert(chain);

        log::debug!(
            "Built processing chain for {:?} at {}% (equalizer: {})",
            element,
            config.volume_percent,
            config.equalizer.is_enabled()
        );

        Ok(ReconcileOutcome::Created)
    }
}

fn build_chain(
    cx: &mut AudioContext,
    element: ElementId,
    config: &DesiredConfig,
) -> Result<ProcessingChain, ReconcileError> {
    let destination = cx.destination();
    let graph = cx.graph_mut();

    let source = graph.create_media_element_source(element)?;
    let gain = graph.add_node(GainNode::new(config.gain()));
    let equalizer = config
        .equalizer
        .gains()
        .map(|values| build_bank(graph, values));

    let chain = ProcessingChain {
        source,
        gain,
        equalizer,
    };

    if let Err(e) = wire(graph, &chain, destination) {
        // The source stays wrapped. The platform has no way to undo that.
        tear_down(graph, &chain);
        return Err(e.into());
    }

    Ok(chain)
}

fn update_chain(
    cx: &mut AudioContext,
    chain: &mut ProcessingChain,
    config: &DesiredConfig,
) -> Result<ReconcileOutcome, ReconcileError> {
    let destination = cx.destination();
    let graph = cx.graph_mut();

    match graph.node::<GainNode>(chain.gain) {
        Some(gain) => {
            gain.set_gain(config.gain());
        }
        None => log::warn!("Gain node {:?} is missing from the graph", chain.gain),
    }

    match (chain.equalizer, config.equalizer.gains()) {
        (Some(bank), Some(values)) => {
            bank.apply_gains(graph, values);
            Ok(ReconcileOutcome::ParamsUpdated)
        }
        (None, None) => Ok(ReconcileOutcome::ParamsUpdated),
        (_, values) => {
            rebuild(graph, chain, values, destination)?;
            Ok(ReconcileOutcome::Rebuilt)
        }
    }
}

/// Rewire a chain whose equalizer was switched on or off.
///
/// All old edges are torn down first, then the new path is connected. If
/// the new path cannot be connected, the chain falls back to the plain
/// `source -> gain -> destination` path before the error is returned.
fn rebuild(
    graph: &mut AudioGraph,
    chain: &mut ProcessingChain,
    values: Option<&[f32]>,
    destination: NodeID,
) -> Result<(), ReconcileError> {
    disconnect_chain(graph, chain);

    if let Some(old_bank) = chain.equalizer.take() {
        old_bank.remove(graph);
    }

    chain.equalizer = values.map(|values| build_bank(graph, values));

    if let Err(e) = wire(graph, chain, destination) {
        log::error!("Failed to rewire processing chain: {}", e);

        disconnect_chain(graph, chain);
        if let Some(bank) = chain.equalizer.take() {
            bank.remove(graph);
        }
        wire(graph, chain, destination)?;

        return Err(e.into());
    }

    log::debug!(
        "Rewired processing chain of {:?} (equalizer: {})",
        chain.source,
        chain.equalizer_enabled()
    );

    Ok(())
}

fn build_bank(graph: &mut AudioGraph, values: &[f32]) -> FilterBank {
    let bank = FilterBank::build(graph);
    bank.apply_gains(graph, values);
    bank
}

/// Connect `source -> [bank] -> gain -> destination`.
fn wire(
    graph: &mut AudioGraph,
    chain: &ProcessingChain,
    destination: NodeID,
) -> Result<(), AddEdgeError> {
    match &chain.equalizer {
        Some(bank) => bank.connect_chain(graph, chain.source, chain.gain)?,
        None => {
            graph.connect(chain.source, 0, chain.gain, 0, true)?;
        }
    }

    graph.connect(chain.gain, 0, destination, 0, true)?;

    Ok(())
}

/// Disconnect every node of the chain from all of its outputs.
fn disconnect_chain(graph: &mut AudioGraph, chain: &ProcessingChain) {
    let mut errors = chain
        .equalizer
        .map(|bank| bank.disconnect_all(graph))
        .unwrap_or_default();

    for node_id in [chain.source, chain.gain] {
        if let Err(e) = graph.disconnect_all(node_id) {
            errors.push(e);
        }
    }

    for e in errors {
        log::debug!("Ignoring disconnect failure: {}", e);
    }
}

/// Remove every node of a chain except its source.
fn tear_down(graph: &mut AudioGraph, chain: &ProcessingChain) {
    disconnect_chain(graph, chain);
    if let Some(bank) = chain.equalizer {
        bank.remove(graph);
    }
    if let Err(e) = graph.remove_node(chain.gain) {
        log::debug!("Ignoring failure to remove gain node: {}", e);
    }
}
