//! Adaptive per-band gain control.
//!
//! Each band owns a multiplier nudged once per cycle: down when the scaled
//! level saturates, up when it sits below the target, untouched in between.
//! The scaled bands are then normalized so the loudest one reaches 1.0.

use super::frame::{BandSpectrum, NormalizedBars};
use crate::params::GainConfig;

/// Gain controller holding one multiplier per band across cycles
#[derive(Debug, Clone)]
pub struct AdaptiveGain {
    config: GainConfig,
    gains: Vec<f32>,
}

impl AdaptiveGain {
    /// Every band starts at unity gain (clamped into the configured range)
    pub fn new(band_count: usize, config: GainConfig) -> Self {
        let initial = 1.0f32.clamp(config.min_gain, config.max_gain);
        Self {
            config,
            gains: vec![initial; band_count],
        }
    }

    pub fn band_count(&self) -> usize {
        self.gains.len()
    }

    /// Current gain vector, always within `[min_gain, max_gain]`
    pub fn gains(&self) -> &[f32] {
        &self.gains
    }

    pub fn config(&self) -> &GainConfig {
        &self.config
    }

    /// Adapt gains to `spectrum`, then return the gained bands normalized to `[0, 1]`
    ///
    /// # Panics
    /// If `spectrum` does not have one value per band.
    pub fn apply(&mut self, spectrum: &BandSpectrum) -> NormalizedBars {
        assert_eq!(
            spectrum.len(),
            self.gains.len(),
            "spectrum has {} bands, controller has {}",
            spectrum.len(),
            self.gains.len()
        );

        let GainConfig {
            adapt_speed,
            min_gain,
            max_gain,
            saturation_threshold,
            target_level,
        } = self.config;

        for (gain, &amp) in self.gains.iter_mut().zip(spectrum.iter()) {
            let scaled = amp * *gain;
            if scaled > saturation_threshold {
                *gain = (*gain * (1.0 - adapt_speed)).max(min_gain);
            } else if scaled < target_level {
                *gain = (*gain * (1.0 + adapt_speed)).min(max_gain);
            }
        }

        let mut scaled: Vec<f32> = spectrum
            .iter()
            .zip(self.gains.iter())
            .map(|(amp, gain)| amp * gain)
            .collect();

        let peak = scaled.iter().copied().fold(0.0f32, f32::max);
        if peak > 0.0 {
            for value in scaled.iter_mut() {
                *value /= peak;
            }
        }

        NormalizedBars::new(scaled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller(bands: usize) -> AdaptiveGain {
        AdaptiveGain::new(bands, GainConfig::default())
    }

    #[test]
    fn test_starts_at_unity() {
        let gain = controller(7);
        assert_eq!(gain.band_count(), 7);
        assert!(gain.gains().iter().all(|&g| g == 1.0));
    }

    #[test]
    fn test_initial_gain_respects_bounds() {
        let config = GainConfig {
            min_gain: 2.0,
            max_gain: 4.0,
            ..GainConfig::default()
        };
        let gain = AdaptiveGain::new(3, config);
        assert!(gain.gains().iter().all(|&g| g == 2.0));
    }

    #[test]
    fn test_single_step_directions() {
        let mut gain = controller(3);
        // below target, dead band, saturated
        let spectrum = BandSpectrum::new(vec![0.2, 0.8, 2.0]);
        gain.apply(&spectrum);

        let gains = gain.gains();
        assert!((gains[0] - 1.1).abs() < 1e-6);
        assert_eq!(gains[1], 1.0);
        assert!((gains[2] - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_silence_stays_zero_and_gains_clamp_high() {
        let mut gain = controller(7);
        let silence = BandSpectrum::zeros(7);

        for _ in 0..1000 {
            let bars = gain.apply(&silence);
            assert!(bars.iter().all(|&b| b == 0.0));
        }
        assert!(gain.gains().iter().all(|&g| g == 10.0));
    }

    #[test]
    fn test_saturation_clamps_gains_low() {
        let mut gain = controller(7);
        let loud = BandSpectrum::new(vec![5.0; 7]);

        for _ in 0..1000 {
            gain.apply(&loud);
        }
        assert!(gain.gains().iter().all(|&g| g == 0.5));
    }

    #[test]
    fn test_output_normalized_with_unit_peak() {
        let mut gain = controller(4);
        let spectrum = BandSpectrum::new(vec![0.3, 1.2, 0.0, 0.6]);

        for _ in 0..50 {
            let bars = gain.apply(&spectrum);
            assert!(bars.iter().all(|&b| (0.0..=1.0).contains(&b)));
            let peak = bars.iter().copied().fold(0.0f32, f32::max);
            assert!((peak - 1.0).abs() < 1e-6);
            assert_eq!(bars[2], 0.0);
        }
    }

    #[test]
    fn test_converges_into_dead_band_from_below() {
        let mut gain = controller(1);
        let spectrum = BandSpectrum::new(vec![0.1]);

        for _ in 0..100 {
            gain.apply(&spectrum);
        }
        let scaled = 0.1 * gain.gains()[0];
        assert!((0.7..=0.95).contains(&scaled), "scaled = {}", scaled);
        // One step past the target at most
        assert!(scaled <= 0.7 * 1.1 + 1e-5);
    }

    #[test]
    fn test_converges_into_dead_band_from_above() {
        let mut gain = controller(1);
        let spectrum = BandSpectrum::new(vec![1.5]);

        let mut history = Vec::new();
        for _ in 0..100 {
            gain.apply(&spectrum);
            history.push(1.5 * gain.gains()[0]);
        }
        let settled = *history.last().unwrap();
        assert!((0.7..=0.95).contains(&settled), "scaled = {}", settled);
        // Monotone descent, no oscillation
        assert!(history.windows(2).all(|w| w[1] <= w[0]));
    }

    #[test]
    fn test_gains_stay_in_bounds_for_varied_input() {
        let mut gain = controller(5);
        for cycle in 0..500 {
            let values = (0..5)
                .map(|band| ((cycle * 7 + band * 13) % 17) as f32 / 4.0)
                .collect();
            gain.apply(&BandSpectrum::new(values));
            assert!(gain.gains().iter().all(|&g| (0.5..=10.0).contains(&g)));
        }
    }

    #[test]
    #[should_panic(expected = "spectrum has 3 bands")]
    fn test_wrong_length_panics() {
        let mut gain = controller(7);
        gain.apply(&BandSpectrum::zeros(3));
    }
}
