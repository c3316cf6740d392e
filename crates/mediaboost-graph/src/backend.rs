use std::error::Error;

use crate::context::ContextConfig;

/// The platform that realtime audio contexts are opened on.
pub trait AudioBackend {
    type Error: Error + 'static;

    /// Open the device side of a new audio context.
    fn open(&mut self, config: &ContextConfig) -> Result<ContextInfo, Self::Error>;
}

/// Whether the platform is currently rendering a context.
///
/// Some platforms only start rendering after a user gesture. Contexts are
/// usable for building graphs in either state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextState {
    Running,
    Suspended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextInfo {
    pub sample_rate: u32,
    pub state: ContextState,
}

/// A backend with no audio device that always succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeadlessBackend {
    pub state: ContextState,
}

impl Default for HeadlessBackend {
    fn default() -> Self {
        Self {
            state: ContextState::Running,
        }
    }
}

impl AudioBackend for HeadlessBackend {
    type Error = std::convert::Infallible;

    fn open(&mut self, config: &ContextConfig) -> Result<ContextInfo, Self::Error> {
        Ok(ContextInfo {
            sample_rate: config.sample_rate,
            state: self.state,
        })
    }
}
