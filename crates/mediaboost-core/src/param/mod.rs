mod audio_param;
pub mod range;

pub use audio_param::AudioParam;
