//! Audio analysis configuration and constants.

use std::time::Duration;

use crate::error::{Result, VisualizerError};

/// Spectral analysis configuration
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    /// Audio sample rate (Hz)
    /// Default: 44100
    pub sample_rate_hz: u32,

    /// Number of equal-width frequency bands between 0 Hz and Nyquist
    /// Default: 7 (one per rainbow colour)
    pub band_count: usize,

    /// Duration of one analysis block (seconds)
    /// Default: 0.05 (= 2205 samples @ 44.1kHz)
    pub block_duration_s: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: audio_constants::DEFAULT_SAMPLE_RATE_HZ,
            band_count: audio_constants::DEFAULT_BAND_COUNT,
            block_duration_s: audio_constants::DEFAULT_BLOCK_DURATION_S,
        }
    }
}

impl AnalysisConfig {
    /// Samples per block: `round(sample_rate * block_duration)`
    pub fn block_size(&self) -> usize {
        (self.sample_rate_hz as f64 * self.block_duration_s).round() as usize
    }

    /// Wall-clock length of one block, used to self-pace non-blocking sources
    pub fn block_duration(&self) -> Duration {
        Duration::from_secs_f64(self.block_duration_s)
    }

    /// Upper analysis frequency (Hz), integer half of the sample rate
    pub fn nyquist_hz(&self) -> f64 {
        (self.sample_rate_hz / 2) as f64
    }

    /// Band boundaries: `band_count + 1` evenly spaced edges from 0 to Nyquist
    pub fn band_edges_hz(&self) -> Vec<f64> {
        band_edges(self.sample_rate_hz, self.band_count)
    }

    /// Centre frequency of FFT bin `bin` for a frame of `frame_len` samples
    pub fn bin_frequency_hz(&self, bin: usize, frame_len: usize) -> f64 {
        bin_frequency(bin, self.sample_rate_hz, frame_len)
    }

    /// Validate configuration (positive rate, at least one band, etc.)
    pub fn validate(&self) -> Result<()> {
        if self.sample_rate_hz == 0 {
            return Err(VisualizerError::InvalidConfig(
                "Sample rate must be > 0".to_string(),
            ));
        }
        if self.band_count == 0 {
            return Err(VisualizerError::InvalidConfig(
                "Band count must be >= 1".to_string(),
            ));
        }
        if !self.block_duration_s.is_finite() || self.block_duration_s <= 0.0 {
            return Err(VisualizerError::InvalidConfig(format!(
                "Block duration must be > 0 seconds, got {}",
                self.block_duration_s
            )));
        }
        if self.block_size() == 0 {
            return Err(VisualizerError::InvalidConfig(format!(
                "Block duration {}s is shorter than one sample at {} Hz",
                self.block_duration_s, self.sample_rate_hz
            )));
        }
        Ok(())
    }
}

/// Evenly spaced band edges over `[0, sample_rate / 2]`
pub(crate) fn band_edges(sample_rate_hz: u32, band_count: usize) -> Vec<f64> {
    let nyquist = (sample_rate_hz / 2) as f64;
    (0..=band_count)
        .map(|i| {
            if i == band_count {
                nyquist
            } else {
                nyquist * i as f64 / band_count as f64
            }
        })
        .collect()
}

/// Frequency of FFT bin `bin`: `bin * sample_rate / frame_len`
pub(crate) fn bin_frequency(bin: usize, sample_rate_hz: u32, frame_len: usize) -> f64 {
    bin as f64 * sample_rate_hz as f64 / frame_len as f64
}

/// Audio constants (defaults and capture tuning)
pub mod audio_constants {
    use std::time::Duration;

    /// Default sample rate (Hz)
    pub const DEFAULT_SAMPLE_RATE_HZ: u32 = 44100;

    /// Default band count, one per rainbow colour
    pub const DEFAULT_BAND_COUNT: usize = 7;

    /// Default block duration (seconds)
    pub const DEFAULT_BLOCK_DURATION_S: f64 = 0.05;

    /// Capture chunks buffered between the device callback and the analysis loop.
    /// When full, the callback drops the newest chunk instead of blocking.
    pub const CAPTURE_CHANNEL_CAPACITY: usize = 64;

    /// No capture data for this long counts as a failed read
    pub const CAPTURE_STALL_TIMEOUT: Duration = Duration::from_secs(2);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_block_size() {
        let config = AnalysisConfig::default();

        // 44100 Hz * 0.05 s = 2205 samples
        assert_eq!(config.block_size(), 2205);
        assert_eq!(config.block_duration(), Duration::from_millis(50));
    }

    #[test]
    fn test_block_size_rounds() {
        let config = AnalysisConfig {
            sample_rate_hz: 44100,
            band_count: 7,
            block_duration_s: 0.1,
        };
        assert_eq!(config.block_size(), 4410);

        let config = AnalysisConfig {
            sample_rate_hz: 1000,
            band_count: 7,
            block_duration_s: 0.0126,
        };
        assert_eq!(config.block_size(), 13);
    }

    #[test]
    fn test_band_edges() {
        let config = AnalysisConfig::default();
        let edges = config.band_edges_hz();

        assert_eq!(edges.len(), 8);
        assert_eq!(edges[0], 0.0);
        assert!((edges[1] - 3150.0).abs() < 1e-9);
        assert_eq!(edges[7], 22050.0);
    }

    #[test]
    fn test_nyquist_uses_integer_half() {
        let config = AnalysisConfig {
            sample_rate_hz: 44101,
            ..AnalysisConfig::default()
        };
        assert_eq!(config.nyquist_hz(), 22050.0);
    }

    #[test]
    fn test_bin_frequency() {
        let config = AnalysisConfig::default();

        // 44100 / 2205 = 20 Hz per bin
        assert_eq!(config.bin_frequency_hz(0, 2205), 0.0);
        assert!((config.bin_frequency_hz(22, 2205) - 440.0).abs() < 1e-9);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let valid = AnalysisConfig::default();
        assert!(valid.validate().is_ok());

        let zero_rate = AnalysisConfig {
            sample_rate_hz: 0,
            ..valid.clone()
        };
        assert!(zero_rate.validate().is_err());

        let no_bands = AnalysisConfig {
            band_count: 0,
            ..valid.clone()
        };
        assert!(no_bands.validate().is_err());

        let negative_duration = AnalysisConfig {
            block_duration_s: -0.05,
            ..valid.clone()
        };
        assert!(negative_duration.validate().is_err());

        let nan_duration = AnalysisConfig {
            block_duration_s: f64::NAN,
            ..valid.clone()
        };
        assert!(nan_duration.validate().is_err());

        let sub_sample = AnalysisConfig {
            block_duration_s: 1e-9,
            ..valid
        };
        assert!(sub_sample.validate().is_err());
    }
}
