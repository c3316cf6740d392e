use std::sync::{atomic::Ordering, Arc};

use atomic_float::AtomicF32;

use super::range::LinearRange;

/// A single automatable value on an audio node, such as a gain or a
/// filter frequency.
///
/// The value lives behind an atomic so that a realtime thread can read it
/// through [`AudioParam::handle`] while the owning thread changes it.
/// Changing a value never touches the topology of the graph.
#[derive(Debug)]
pub struct AudioParam {
    value: Arc<AtomicF32>,
    default_value: f32,
    range: LinearRange,
}

impl AudioParam {
    pub fn new(default_value: f32, range: LinearRange) -> Self {
        let default_value = range.clamp(default_value);

        Self {
            value: Arc::new(AtomicF32::new(default_value)),
            default_value,
            range,
        }
    }

    pub fn value(&self) -> f32 {
        self.value.load(Ordering::Relaxed)
    }

    /// Set the value, clamped to the range of this parameter.
    ///
    /// Returns the value that was actually stored.
    pub fn set_value(&self, value: f32) -> f32 {
        let value = self.range.clamp(value);
        self.value.store(value, Ordering::Relaxed);
        value
    }

    pub fn default_value(&self) -> f32 {
        self.default_value
    }

    pub fn range(&self) -> LinearRange {
        self.range
    }

    /// A shared handle to the underlying value for use in a realtime
    /// context.
    pub fn handle(&self) -> Arc<AtomicF32> {
        Arc::clone(&self.value)
    }
}
