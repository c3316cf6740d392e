pub mod badge;
pub mod config;
mod element;
mod error;
pub mod message;
pub mod param;
pub mod prefs;

pub use config::{DesiredConfig, EqualizerSetting};
pub use element::ElementId;
pub use error::ConfigError;

/// The number of bands in the equalizer.
pub const NUM_EQ_BANDS: usize = 5;
