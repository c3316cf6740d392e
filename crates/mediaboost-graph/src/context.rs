use crate::{
    backend::{AudioBackend, ContextInfo, ContextState},
    graph::{AddEdgeError, AudioGraph, GraphConfig, NodeID},
    nodes::GainNode,
};

pub const DEFAULT_SAMPLE_RATE: u32 = 48_000;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContextConfig {
    /// The sample rate to request from the backend.
    pub sample_rate: u32,
    pub graph: GraphConfig,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            graph: GraphConfig::default(),
        }
    }
}

/// An error occurred while opening an audio context.
#[derive(Debug, thiserror::Error)]
pub enum ContextError<E: std::error::Error + 'static> {
    #[error("Failed to open audio context: {0}")]
    Backend(#[source] E),
    #[error("Failed to wire audio context anchor: {0}")]
    Graph(#[from] AddEdgeError),
}

/// A realtime audio-processing context and its node graph.
pub struct AudioContext {
    graph: AudioGraph,
    info: ContextInfo,
    anchor: NodeID,
}

impl AudioContext {
    fn new(info: ContextInfo, graph_config: &GraphConfig) -> Result<Self, AddEdgeError> {
        let mut graph = AudioGraph::new(graph_config);

        let anchor = graph.add_node(GainNode::new(1.0));
        graph.connect(anchor, 0, graph.destination(), 0, false)?;

        Ok(Self {
            graph,
            info,
            anchor,
        })
    }

    pub fn graph(&self) -> &AudioGraph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut AudioGraph {
        &mut self.graph
    }

    pub fn destination(&self) -> NodeID {
        self.graph.destination()
    }

    /// The context-wide unity gain node connected to the destination.
    pub fn anchor(&self) -> NodeID {
        self.anchor
    }

    pub fn sample_rate(&self) -> u32 {
        self.info.sample_rate
    }

    pub fn state(&self) -> ContextState {
        self.info.state
    }
}

/// Lazily opens exactly one [`AudioContext`] for a document.
pub struct ContextCell<B: AudioBackend> {
    backend: B,
    config: ContextConfig,
    context: Option<AudioContext>,
}

impl<B: AudioBackend> ContextCell<B> {
    pub fn new(backend: B, config: ContextConfig) -> Self {
        Self {
            backend,
            config,
            context: None,
        }
    }

    /// Get the context, opening it on first use.
    ///
    /// A failed attempt is not cached, so the next call will try to open
    /// the context again.
    pub fn get_or_create(&mut self) -> Result<&mut AudioContext, ContextError<B::Error>> {
        let cx = match self.context.take() {
            Some(cx) => cx,
            None => {
                let info = self.backend.open(&self.config).map_err(|e| {
                    log::warn!("Failed to open audio context: {}", e);
                    ContextError::Backend(e)
                })?;

                let cx = AudioContext::new(info, &self.config.graph)?;

                log::info!(
                    "Opened audio context: {} Hz, {:?}",
                    info.sample_rate,
                    info.state
                );

                cx
            }
        };

        Ok(self.context.insert(cx))
    }

    /// Get the context if it has already been opened.
    pub fn get(&self) -> Option<&AudioContext> {
        self.context.as_ref()
    }

    pub fn get_mut(&mut self) -> Option<&mut AudioContext> {
        self.context.as_mut()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}
