//! Command-line argument parsing.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::audio::{FallbackKind, SourceKind};
use crate::error::{Result, VisualizerError};
use crate::params::{
    audio_constants, AnalysisConfig, GainConfig, RecordingConfig, RenderConfig, RenderStyle,
    VisualizerConfig,
};

/// Input selection
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceArg {
    /// Default input device
    Mic,
    /// White noise test signal
    Noise,
    /// Sine tone at --sine-hz
    Sine,
    /// WAV file given by --wav
    Wav,
}

/// Test signal used when the input cannot be opened
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackArg {
    Noise,
    Sine,
}

/// Bar layout
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleArg {
    /// One bar per band
    Bars,
    /// Single mean-level bar
    Level,
}

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "rainvow")]
#[command(about = "Real-time rainbow audio spectrum visualizer", long_about = None)]
pub struct Args {
    /// Audio source
    #[arg(long, value_enum, default_value_t = SourceArg::Mic)]
    pub source: SourceArg,

    /// WAV file to analyse (implies --source wav)
    #[arg(long, value_name = "PATH")]
    pub wav: Option<PathBuf>,

    /// Tone frequency for --source sine (Hz)
    #[arg(long, value_name = "HZ", default_value_t = 440.0)]
    pub sine_hz: f32,

    /// Test signal substituted when the source fails
    #[arg(long, value_enum, default_value_t = FallbackArg::Noise)]
    pub fallback: FallbackArg,

    /// Sample rate (Hz)
    #[arg(long, value_name = "HZ", default_value_t = audio_constants::DEFAULT_SAMPLE_RATE_HZ)]
    pub sample_rate: u32,

    /// Number of frequency bands
    #[arg(long, value_name = "N", default_value_t = audio_constants::DEFAULT_BAND_COUNT)]
    pub bands: usize,

    /// Block length per cycle (seconds)
    #[arg(long, value_name = "SECONDS", default_value_t = audio_constants::DEFAULT_BLOCK_DURATION_S)]
    pub block_duration: f64,

    /// Fractional gain step per cycle
    #[arg(long, value_name = "FRACTION", default_value_t = 0.1)]
    pub adapt_speed: f32,

    /// Lower gain clamp
    #[arg(long, default_value_t = 0.5)]
    pub min_gain: f32,

    /// Upper gain clamp
    #[arg(long, default_value_t = 10.0)]
    pub max_gain: f32,

    /// Scaled level above which gain decays
    #[arg(long, value_name = "LEVEL", default_value_t = 0.95)]
    pub saturation: f32,

    /// Scaled level below which gain grows
    #[arg(long, value_name = "LEVEL", default_value_t = 0.7)]
    pub target: f32,

    /// Bar length in cells at full scale
    #[arg(long, value_name = "CELLS", default_value_t = 12)]
    pub bar_height: usize,

    /// Keep colours fixed instead of rotating each cycle
    #[arg(long)]
    pub no_scroll: bool,

    /// Bar layout
    #[arg(long, value_enum, default_value_t = StyleArg::Bars)]
    pub style: StyleArg,

    /// Stop after this many cycles
    #[arg(long, value_name = "N")]
    pub cycles: Option<u64>,

    /// Record the analysed input to recording/input.wav (duration in seconds)
    #[arg(long, value_name = "SECONDS")]
    pub record: Option<f32>,
}

impl Args {
    /// Analysis and gain parameters from the flags
    pub fn visualizer_config(&self) -> VisualizerConfig {
        VisualizerConfig {
            analysis: AnalysisConfig {
                sample_rate_hz: self.sample_rate,
                band_count: self.bands,
                block_duration_s: self.block_duration,
            },
            gain: GainConfig {
                adapt_speed: self.adapt_speed,
                min_gain: self.min_gain,
                max_gain: self.max_gain,
                saturation_threshold: self.saturation,
                target_level: self.target,
            },
        }
    }

    pub fn render_config(&self) -> RenderConfig {
        RenderConfig {
            bar_height: self.bar_height,
            scroll_palette: !self.no_scroll,
            style: match self.style {
                StyleArg::Bars => RenderStyle::Bars,
                StyleArg::Level => RenderStyle::Level,
            },
        }
    }

    /// Resolve the requested source; `--wav PATH` alone selects the WAV source
    pub fn source_kind(&self) -> Result<SourceKind> {
        match (self.source, &self.wav) {
            (SourceArg::Wav, None) => Err(VisualizerError::InvalidConfig(
                "--source wav requires --wav PATH".to_string(),
            )),
            (SourceArg::Wav | SourceArg::Mic, Some(path)) => Ok(SourceKind::WavFile(path.clone())),
            (SourceArg::Mic, None) => Ok(SourceKind::Microphone),
            (SourceArg::Noise, _) => Ok(SourceKind::Noise),
            (SourceArg::Sine, _) => Ok(SourceKind::Sine {
                freq_hz: self.sine_hz,
            }),
        }
    }

    pub fn fallback_kind(&self) -> FallbackKind {
        match self.fallback {
            FallbackArg::Noise => FallbackKind::Noise,
            FallbackArg::Sine => FallbackKind::Sine,
        }
    }

    /// Create recording configuration if recording mode is enabled
    pub fn recording_config(&self) -> Option<RecordingConfig> {
        self.record.map(RecordingConfig::new)
    }
}
