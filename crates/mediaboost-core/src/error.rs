/// An error occurred while reading or writing a persisted configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to parse persisted configuration: {0}")]
    Parse(#[from] serde_json::Error),
}
