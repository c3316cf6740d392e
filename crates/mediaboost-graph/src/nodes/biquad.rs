use std::f64::consts::PI;

use mediaboost_core::param::{range::LinearRange, AudioParam};

use crate::node::{AudioNode, AudioNodeInfo};

const FREQUENCY_RANGE: LinearRange = LinearRange::new(10.0, 24_000.0);
const Q_RANGE: LinearRange = LinearRange::new(0.0001, 1000.0);
/// `40 * log10(f32::MAX)`, the widest gain whose linear amplitude is
/// still representable.
const MAX_GAIN_DB: f32 = 1541.2736;
const GAIN_DB_RANGE: LinearRange = LinearRange::new(-MAX_GAIN_DB, MAX_GAIN_DB);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BiquadFilterType {
    /// Boosts or cuts everything below the frequency.
    LowShelf,
    /// Boosts or cuts a band centered on the frequency.
    Peaking,
    /// Boosts or cuts everything above the frequency.
    HighShelf,
}

/// A second-order IIR filter section.
pub struct BiquadFilterNode {
    filter_type: BiquadFilterType,
    frequency: AudioParam,
    q: AudioParam,
    gain_db: AudioParam,
}

impl BiquadFilterNode {
    pub fn new(filter_type: BiquadFilterType, frequency_hz: f32, q: f32) -> Self {
        Self {
            filter_type,
            frequency: AudioParam::new(frequency_hz, FREQUENCY_RANGE),
            q: AudioParam::new(q, Q_RANGE),
            gain_db: AudioParam::new(0.0, GAIN_DB_RANGE),
        }
    }

    pub fn filter_type(&self) -> BiquadFilterType {
        self.filter_type
    }

    pub fn frequency(&self) -> &AudioParam {
        &self.frequency
    }

    pub fn q(&self) -> &AudioParam {
        &self.q
    }

    /// The boost (positive) or cut (negative) in decibels.
    pub fn gain_db(&self) -> &AudioParam {
        &self.gain_db
    }

    /// Returns the gain that was actually stored.
    pub fn set_gain_db(&self, gain_db: f32) -> f32 {
        self.gain_db.set_value(gain_db)
    }

    /// The magnitude response of this filter at the given frequency, in
    /// decibels.
    pub fn magnitude_response_db(&self, freq_hz: f64, sample_rate: u32) -> f64 {
        let coeffs = self.coefficients(sample_rate);

        let w = 2.0 * PI * freq_hz / f64::from(sample_rate);
        let (cos1, sin1) = (w.cos(), w.sin());
        let (cos2, sin2) = ((2.0 * w).cos(), (2.0 * w).sin());

        let num_re = coeffs.b0 + coeffs.b1 * cos1 + coeffs.b2 * cos2;
        let num_im = -(coeffs.b1 * sin1 + coeffs.b2 * sin2);
        let den_re = coeffs.a0 + coeffs.a1 * cos1 + coeffs.a2 * cos2;
        let den_im = -(coeffs.a1 * sin1 + coeffs.a2 * sin2);

        let num = (num_re * num_re + num_im * num_im).sqrt();
        let den = (den_re * den_re + den_im * den_im).sqrt();

        20.0 * (num / den).log10()
    }

    // Audio EQ Cookbook (R. Bristow-Johnson), with a shelf slope of 1.
    fn coefficients(&self, sample_rate: u32) -> Coefficients {
        let a = 10f64.powf(f64::from(self.gain_db.value()) / 40.0);
        let w0 = 2.0 * PI * f64::from(self.frequency.value()) / f64::from(sample_rate);
        let (cos_w0, sin_w0) = (w0.cos(), w0.sin());

        match self.filter_type {
            BiquadFilterType::Peaking => {
                let alpha = sin_w0 / (2.0 * f64::from(self.q.value()));

                Coefficients {
                    b0: 1.0 + alpha * a,
                    b1: -2.0 * cos_w0,
                    b2: 1.0 - alpha * a,
                    a0: 1.0 + alpha / a,
                    a1: -2.0 * cos_w0,
                    a2: 1.0 - alpha / a,
                }
            }
            BiquadFilterType::LowShelf => {
                let two_sqrt_a_alpha = sin_w0 * a.sqrt() * std::f64::consts::SQRT_2;

                Coefficients {
                    b0: a * ((a + 1.0) - (a - 1.0) * cos_w0 + two_sqrt_a_alpha),
                    b1: 2.0 * a * ((a - 1.0) - (a + 1.0) * cos_w0),
                    b2: a * ((a + 1.0) - (a - 1.0) * cos_w0 - two_sqrt_a_alpha),
                    a0: (a + 1.0) + (a - 1.0) * cos_w0 + two_sqrt_a_alpha,
                    a1: -2.0 * ((a - 1.0) + (a + 1.0) * cos_w0),
                    a2: (a + 1.0) + (a - 1.0) * cos_w0 - two_sqrt_a_alpha,
                }
            }
            BiquadFilterType::HighShelf => {
                let two_sqrt_a_alpha = sin_w0 * a.sqrt() * std::f64::consts::SQRT_2;

                Coefficients {
                    b0: a * ((a + 1.0) + (a - 1.0) * cos_w0 + two_sqrt_a_alpha),
                    b1: -2.0 * a * ((a - 1.0) + (a + 1.0) * cos_w0),
                    b2: a * ((a + 1.0) + (a - 1.0) * cos_w0 - two_sqrt_a_alpha),
                    a0: (a + 1.0) - (a - 1.0) * cos_w0 + two_sqrt_a_alpha,
                    a1: 2.0 * ((a - 1.0) - (a + 1.0) * cos_w0),
                    a2: (a + 1.0) - (a - 1.0) * cos_w0 - two_sqrt_a_alpha,
                }
            }
        }
    }
}

impl AudioNode for BiquadFilterNode {
    fn debug_name(&self) -> &'static str {
        match self.filter_type {
            BiquadFilterType::LowShelf => "lowshelf",
            BiquadFilterType::Peaking => "peaking",
            BiquadFilterType::HighShelf => "highshelf",
        }
    }

    fn info(&self) -> AudioNodeInfo {
        AudioNodeInfo {
            num_inputs: 1,
            num_outputs: 1,
        }
    }
}

struct Coefficients {
    b0: f64,
    b1: f64,
    b2: f64,
    a0: f64,
    a1: f64,
    a2: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: u32 = 48_000;

    #[test]
    fn flat_filters_are_transparent() {
        for filter_type in [
            BiquadFilterType::LowShelf,
            BiquadFilterType::Peaking,
            BiquadFilterType::HighShelf,
        ] {
            let filter = BiquadFilterNode::new(filter_type, 1000.0, 1.0);
            for freq in [20.0, 440.0, 1000.0, 9000.0] {
                assert!(filter.magnitude_response_db(freq, SAMPLE_RATE).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn peaking_hits_gain_at_center() {
        let filter = BiquadFilterNode::new(BiquadFilterType::Peaking, 910.0, 1.0);
        filter.set_gain_db(-6.0);
        let db = filter.magnitude_response_db(910.0, SAMPLE_RATE);
        assert!((db + 6.0).abs() < 1e-6, "{db}");
    }

    #[test]
    fn shelves_hit_gain_at_extremes() {
        let low = BiquadFilterNode::new(BiquadFilterType::LowShelf, 60.0, 1.0);
        low.set_gain_db(9.0);
        assert!((low.magnitude_response_db(0.0, SAMPLE_RATE) - 9.0).abs() < 1e-6);
        assert!(low.magnitude_response_db(10_000.0, SAMPLE_RATE).abs() < 0.1);

        let high = BiquadFilterNode::new(BiquadFilterType::HighShelf, 14_000.0, 1.0);
        high.set_gain_db(4.0);
        let nyquist = f64::from(SAMPLE_RATE) / 2.0;
        assert!((high.magnitude_response_db(nyquist, SAMPLE_RATE) - 4.0).abs() < 1e-6);
        assert!(high.magnitude_response_db(100.0, SAMPLE_RATE).abs() < 0.1);
    }

    #[test]
    fn gain_is_only_clamped_at_the_representable_limit() {
        let filter = BiquadFilterNode::new(BiquadFilterType::Peaking, 230.0, 1.0);
        assert_eq!(filter.set_gain_db(48.0), 48.0);
        assert_eq!(filter.set_gain_db(-60.0), -60.0);
        assert_eq!(filter.gain_db().value(), -60.0);

        assert_eq!(filter.set_gain_db(5000.0), MAX_GAIN_DB);
        assert_eq!(filter.set_gain_db(-5000.0), -MAX_GAIN_DB);
    }
}
