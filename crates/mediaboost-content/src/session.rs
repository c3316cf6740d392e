use mediaboost_core::{ConfigError, DesiredConfig};

/// The configuration most recently applied to a document.
///
/// The store lives as long as the document. A host that wants the
/// configuration to survive a reload serializes it with
/// [`SessionStore::to_json`] and hands the restored value to the next
/// document.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SessionStore {
    current: Option<DesiredConfig>,
}

impl SessionStore {
    pub fn new(current: Option<DesiredConfig>) -> Self {
        Self { current }
    }

    pub fn get(&self) -> Option<&DesiredConfig> {
        self.current.as_ref()
    }

    pub fn set(&mut self, config: DesiredConfig) {
        self.current = Some(config);
    }

    /// Forget the configuration, e.g. on navigation.
    pub fn clear(&mut self) {
        self.current = None;
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string(&self.current)?)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            current: serde_json::from_str(json)?,
        })
    }
}
