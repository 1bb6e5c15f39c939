//! Rainvow library - audio-reactive rainbow spectrum bars
//!
//! Frames from a microphone, WAV file or test signal are windowed, run
//! through an FFT, bucketed into bands and passed through per-band
//! adaptive gain, yielding one vector of bar heights in `[0, 1]` per cycle.

pub mod audio;
pub mod cli;
pub mod error;
pub mod params;
pub mod render;
pub mod session;
