//! Rendering and recording configuration.

use std::path::PathBuf;

/// How normalized bars are drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderStyle {
    /// One coloured bar per band
    #[default]
    Bars,
    /// A single bar showing the mean level across bands
    Level,
}

/// Terminal rendering configuration
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Bar length in character cells at amplitude 1.0
    /// Default: 12
    pub bar_height: usize,

    /// Rotate the rainbow palette by one colour per cycle
    pub scroll_palette: bool,

    /// Bars or single level meter
    pub style: RenderStyle,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            bar_height: 12,
            scroll_palette: true,
            style: RenderStyle::Bars,
        }
    }
}

/// Recording mode configuration
#[derive(Debug, Clone)]
pub struct RecordingConfig {
    /// Duration to record (seconds)
    pub duration_secs: f32,

    /// Output directory for the recorded audio
    pub output_dir: PathBuf,
}

impl RecordingConfig {
    pub fn new(duration_secs: f32) -> Self {
        Self {
            duration_secs,
            output_dir: PathBuf::from("recording"),
        }
    }

    /// Total number of samples to capture at `sample_rate_hz`
    pub fn total_samples(&self, sample_rate_hz: u32) -> usize {
        (self.duration_secs.max(0.0) as f64 * sample_rate_hz as f64).ceil() as usize
    }

    /// Audio file path
    pub fn audio_path(&self) -> PathBuf {
        self.output_dir.join("input.wav")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_paths() {
        let config = RecordingConfig::new(5.0);
        assert_eq!(config.audio_path(), PathBuf::from("recording/input.wav"));
    }

    #[test]
    fn test_total_samples() {
        let config = RecordingConfig::new(0.5);
        assert_eq!(config.total_samples(44100), 22050);

        let negative = RecordingConfig::new(-1.0);
        assert_eq!(negative.total_samples(44100), 0);
    }
}
