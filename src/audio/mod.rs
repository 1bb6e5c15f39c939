//! Audio capture, spectral analysis and adaptive gain.
//!
//! Frame source -> spectrum analyzer -> gain controller, one frame per cycle.

pub mod analyzer;
pub mod frame;
pub mod gain;
pub mod recorder;
pub mod source;

// Re-export public types
pub use analyzer::{analyze, hann_window, SpectrumAnalyzer};
pub use frame::{AudioFrame, BandSpectrum, NormalizedBars};
pub use gain::AdaptiveGain;
pub use recorder::FrameRecorder;
pub use source::{
    open_frame_source, CaptureSource, FallbackKind, FallbackSource, FrameSource, SourceInit,
    SourceKind, SyntheticSource, WavFileSource,
};
