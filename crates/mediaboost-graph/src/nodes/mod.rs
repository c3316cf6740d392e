mod biquad;
mod destination;
mod gain;
mod media_source;

pub use biquad::{BiquadFilterNode, BiquadFilterType};
pub use destination::DestinationNode;
pub use gain::GainNode;
pub use media_source::MediaElementSourceNode;
