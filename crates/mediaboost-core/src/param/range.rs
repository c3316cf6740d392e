/// A parameter range with a linear mapping
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearRange {
    pub min: f32,
    pub max: f32,
}

impl LinearRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Clamp a value into this range.
    pub fn clamp(&self, val: f32) -> f32 {
        if self.min > self.max {
            val.min(self.min).max(self.max)
        } else {
            val.min(self.max).max(self.min)
        }
    }
}

impl Default for LinearRange {
    fn default() -> Self {
        Self { min: 0.0, max: 1.0 }
    }
}

/// Map a percent value (where `0` means mute and `100` means unity
/// gain) to the corresponding raw gain value (not decibels). Values
/// above `100` are allowed and amplify the signal.
///
/// Unlike a perceptual volume curve, this mapping is linear so that
/// `150` always means exactly `1.5`.
pub fn percent_volume_to_gain(percent_volume: u32) -> f32 {
    percent_volume as f32 / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_handles_inverted_ranges() {
        let range = LinearRange::new(1.0, -1.0);
        assert_eq!(range.clamp(2.0), 1.0);
        assert_eq!(range.clamp(-2.0), -1.0);
        assert_eq!(range.clamp(0.5), 0.5);
    }

    #[test]
    fn percent_to_gain() {
        assert_eq!(percent_volume_to_gain(100), 1.0);
        assert_eq!(percent_volume_to_gain(400), 4.0);
        assert_eq!(percent_volume_to_gain(25), 0.25);
    }
}
