//! Visualizer session: owned per-cycle state and the processing loop.
//!
//! A session holds the configuration, the analyzer and the gain vector.
//! Nothing is global, so independent sessions can run side by side.

use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::audio::{AdaptiveGain, AudioFrame, FrameSource, NormalizedBars, SpectrumAnalyzer};
use crate::error::Result;
use crate::params::VisualizerConfig;

/// Whether the loop sleeps to hold the block cadence for non-blocking sources
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pacing {
    /// Sleep out the rest of each block when the source does not block
    RealTime,
    /// Run as fast as frames arrive (offline analysis, tests)
    Unpaced,
}

/// Analyzer + gain controller for one stream of frames
pub struct VisualizerSession {
    config: VisualizerConfig,
    analyzer: SpectrumAnalyzer,
    gain: AdaptiveGain,
}

impl VisualizerSession {
    /// Validate `config` and start with unity gains
    pub fn new(config: VisualizerConfig) -> Result<Self> {
        config.validate()?;
        let gain = AdaptiveGain::new(config.analysis.band_count, config.gain.clone());
        Ok(Self {
            config,
            analyzer: SpectrumAnalyzer::new(),
            gain,
        })
    }

    pub fn config(&self) -> &VisualizerConfig {
        &self.config
    }

    pub fn gains(&self) -> &[f32] {
        self.gain.gains()
    }

    /// One cycle: analyze `frame`, adapt gains, return normalized bars
    pub fn process(&mut self, frame: &AudioFrame) -> NormalizedBars {
        let spectrum = self.analyzer.analyze(
            frame,
            self.config.analysis.sample_rate_hz,
            self.config.analysis.band_count,
        );
        self.gain.apply(&spectrum)
    }

    /// Pull frames from `source` until `sink` breaks. Returns the number of cycles run.
    pub fn run<S, F>(&mut self, source: &mut S, pacing: Pacing, mut sink: F) -> Result<u64>
    where
        S: FrameSource + ?Sized,
        F: FnMut(&AudioFrame, &NormalizedBars) -> Result<ControlFlow<()>>,
    {
        let block = self.config.analysis.block_duration();
        let mut cycles = 0u64;
        loop {
            let started = Instant::now();
            let frame = source.next_frame()?;
            let bars = self.process(&frame);
            cycles += 1;

            if sink(&frame, &bars)?.is_break() {
                debug!(cycles, "Session loop stopped by sink");
                return Ok(cycles);
            }
            pace(pacing, source.is_realtime(), block, started);
        }
    }
}

/// Sleep the remainder of `block` for sources that return immediately
fn pace(pacing: Pacing, source_is_realtime: bool, block: Duration, started: Instant) {
    if pacing == Pacing::Unpaced || source_is_realtime {
        return;
    }
    let remaining = block.saturating_sub(started.elapsed());
    if !remaining.is_zero() {
        thread::sleep(remaining);
    }
}

struct SharedState {
    session: VisualizerSession,
    latest: NormalizedBars,
}

/// Session shared between a capture thread and readers (e.g. a dashboard)
///
/// The lock covers one cycle's computation and nothing else.
pub struct SharedSession {
    state: Mutex<SharedState>,
    block: Duration,
}

impl SharedSession {
    pub fn new(session: VisualizerSession) -> Self {
        let band_count = session.config().analysis.band_count;
        let block = session.config().analysis.block_duration();
        Self {
            state: Mutex::new(SharedState {
                session,
                latest: NormalizedBars::zeros(band_count),
            }),
            block,
        }
    }

    /// Run one cycle under the lock and remember its bars
    pub fn process(&self, frame: &AudioFrame) -> NormalizedBars {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let bars = state.session.process(frame);
        state.latest = bars.clone();
        bars
    }

    /// Bars from the most recent cycle (all zero before the first)
    pub fn latest(&self) -> NormalizedBars {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .latest
            .clone()
    }

    pub fn gains(&self) -> Vec<f32> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .session
            .gains()
            .to_vec()
    }

    pub fn block_duration(&self) -> Duration {
        self.block
    }
}

/// Spawn a background capture loop feeding `shared`.
///
/// The source is opened inside the thread since live input streams cannot
/// move between threads. Every cycle's bars are pushed to `updates`; the
/// thread exits when `stop` is set or the receiver hangs up.
pub fn spawn_monitor<S, F>(
    shared: Arc<SharedSession>,
    open_source: F,
    pacing: Pacing,
    updates: Sender<NormalizedBars>,
    stop: Arc<AtomicBool>,
) -> thread::JoinHandle<Result<u64>>
where
    S: FrameSource,
    F: FnOnce() -> S + Send + 'static,
{
    thread::spawn(move || {
        let mut source = open_source();
        let block = shared.block_duration();
        let mut cycles = 0u64;

        while !stop.load(Ordering::Relaxed) {
            let started = Instant::now();
            let frame = source.next_frame()?;
            let bars = shared.process(&frame);
            cycles += 1;

            if updates.send(bars).is_err() {
                debug!("Monitor receiver dropped");
                break;
            }
            pace(pacing, source.is_realtime(), block, started);
        }

        info!(cycles, "Audio monitor stopped");
        Ok(cycles)
    })
}
