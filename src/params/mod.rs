//! Parameter definitions with physical units and documented semantics.
//!
//! All magic numbers are extracted here with:
//! - Physical units (Hz, seconds, samples)
//! - Documented ranges and meanings
//! - A `validate` gate run before any processing starts

mod audio;
mod gain;
mod render;

// Re-export all types
pub use audio::{audio_constants, AnalysisConfig};
pub(crate) use audio::{band_edges, bin_frequency};
pub use gain::GainConfig;
pub use render::{RecordingConfig, RenderConfig, RenderStyle};

use crate::error::Result;

/// Complete configuration of one visualizer session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisualizerConfig {
    pub analysis: AnalysisConfig,
    pub gain: GainConfig,
}

impl VisualizerConfig {
    /// Reject malformed configuration before the processing loop starts
    pub fn validate(&self) -> Result<()> {
        self.analysis.validate()?;
        self.gain.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(VisualizerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_checks_both_halves() {
        let mut config = VisualizerConfig::default();
        config.analysis.band_count = 0;
        assert!(config.validate().is_err());

        let mut config = VisualizerConfig::default();
        config.gain.min_gain = 0.0;
        assert!(config.validate().is_err());
    }
}
