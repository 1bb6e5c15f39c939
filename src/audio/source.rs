//! Frame sources: live capture, WAV files and synthetic test signals.
//!
//! Every source hands out blocks of exactly `block_size` mono samples.
//! Opening a source is explicit about degradation: [`open_frame_source`]
//! returns either the requested source or a synthetic fallback plus the
//! reason the request failed. [`FallbackSource`] keeps the sequence going
//! if a live source fails later.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::frame::AudioFrame;
use crate::error::{Result, VisualizerError};
use crate::params::audio_constants::{CAPTURE_CHANNEL_CAPACITY, CAPTURE_STALL_TIMEOUT};
use crate::params::AnalysisConfig;

/// Frequency of the sine fallback signal (Hz)
pub const FALLBACK_SINE_HZ: f32 = 440.0;

/// Peak amplitude of the sine fallback signal
pub const FALLBACK_SINE_AMPLITUDE: f32 = 0.5;

/// Pull-based supplier of fixed-size mono frames
pub trait FrameSource {
    /// Next frame. Live sources block until a full block has arrived.
    fn next_frame(&mut self) -> Result<AudioFrame>;

    /// Whether `next_frame` blocks at the audio cadence on its own.
    /// Non-realtime sources must be paced by the caller.
    fn is_realtime(&self) -> bool;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn next_frame(&mut self) -> Result<AudioFrame> {
        (**self).next_frame()
    }

    fn is_realtime(&self) -> bool {
        (**self).is_realtime()
    }
}

/// Which source the user asked for
#[derive(Debug, Clone, PartialEq)]
pub enum SourceKind {
    /// Default input device
    Microphone,
    /// Uniform white noise in `[-1, 1]`
    Noise,
    /// Continuous sine tone
    Sine { freq_hz: f32 },
    /// WAV file, looped at end of file
    WavFile(PathBuf),
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Microphone => write!(f, "microphone"),
            SourceKind::Noise => write!(f, "noise"),
            SourceKind::Sine { freq_hz } => write!(f, "sine {} Hz", freq_hz),
            SourceKind::WavFile(path) => write!(f, "WAV file {}", path.display()),
        }
    }
}

/// Synthetic signal used when the requested source is unavailable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FallbackKind {
    #[default]
    Noise,
    Sine,
}

impl FallbackKind {
    /// Generator producing frames shaped like `config`'s blocks
    pub fn build(self, config: &AnalysisConfig) -> SyntheticSource {
        match self {
            FallbackKind::Noise => SyntheticSource::noise(config.block_size()),
            FallbackKind::Sine => SyntheticSource::sine(
                config.block_size(),
                config.sample_rate_hz,
                FALLBACK_SINE_HZ,
                FALLBACK_SINE_AMPLITUDE,
            ),
        }
    }
}

impl fmt::Display for FallbackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackKind::Noise => write!(f, "noise"),
            FallbackKind::Sine => write!(f, "sine"),
        }
    }
}

/// Outcome of opening a source
pub enum SourceInit {
    /// The requested source opened
    Capture(Box<dyn FrameSource>),
    /// The requested source failed; a synthetic generator stands in
    Fallback {
        source: SyntheticSource,
        reason: VisualizerError,
    },
}

impl SourceInit {
    pub fn is_fallback(&self) -> bool {
        matches!(self, SourceInit::Fallback { .. })
    }

    /// Infinite frame sequence that degrades to `fallback` if the source fails later
    pub fn into_frames(self, fallback: SyntheticSource) -> FallbackSource {
        match self {
            SourceInit::Capture(source) => FallbackSource::new(source, fallback),
            SourceInit::Fallback { source, .. } => FallbackSource::synthetic(source),
        }
    }
}

/// Open the requested source, substituting `fallback` if it cannot be opened
pub fn open_frame_source(
    kind: &SourceKind,
    config: &AnalysisConfig,
    fallback: FallbackKind,
) -> SourceInit {
    let block_size = config.block_size();
    let opened: Result<Box<dyn FrameSource>> = match kind {
        SourceKind::Microphone => {
            CaptureSource::open(config).map(|s| Box::new(s) as Box<dyn FrameSource>)
        }
        SourceKind::Noise => Ok(Box::new(SyntheticSource::noise(block_size))),
        SourceKind::Sine { freq_hz } => Ok(Box::new(SyntheticSource::sine(
            block_size,
            config.sample_rate_hz,
            *freq_hz,
            1.0,
        ))),
        SourceKind::WavFile(path) => WavFileSource::open(path, config)
            .map(|s| Box::new(s) as Box<dyn FrameSource>),
    };

    match opened {
        Ok(source) => SourceInit::Capture(source),
        Err(reason) => SourceInit::Fallback {
            source: fallback.build(config),
            reason,
        },
    }
}

// === Synthetic generators ===

enum Signal {
    Noise(StdRng),
    Sine {
        phase: f64,
        step: f64,
        amplitude: f32,
    },
}

/// Generated test signal, never blocks and never fails
pub struct SyntheticSource {
    block_size: usize,
    signal: Signal,
}

impl SyntheticSource {
    /// Uniform white noise in `[-1, 1]`
    pub fn noise(block_size: usize) -> Self {
        Self {
            block_size,
            signal: Signal::Noise(StdRng::from_entropy()),
        }
    }

    /// Reproducible noise for tests and offline runs
    pub fn noise_seeded(block_size: usize, seed: u64) -> Self {
        Self {
            block_size,
            signal: Signal::Noise(StdRng::seed_from_u64(seed)),
        }
    }

    /// Sine wave with phase carried across blocks
    pub fn sine(block_size: usize, sample_rate_hz: u32, freq_hz: f32, amplitude: f32) -> Self {
        let step = 2.0 * std::f64::consts::PI * freq_hz as f64 / sample_rate_hz.max(1) as f64;
        Self {
            block_size,
            signal: Signal::Sine {
                phase: 0.0,
                step,
                amplitude,
            },
        }
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Generate the next block
    pub fn generate(&mut self) -> AudioFrame {
        let samples = match &mut self.signal {
            Signal::Noise(rng) => (0..self.block_size)
                .map(|_| rng.gen_range(-1.0f32..=1.0))
                .collect(),
            Signal::Sine {
                phase,
                step,
                amplitude,
            } => (0..self.block_size)
                .map(|_| {
                    let sample = *amplitude * phase.sin() as f32;
                    *phase = (*phase + *step) % std::f64::consts::TAU;
                    sample
                })
                .collect(),
        };
        AudioFrame::new(samples)
    }
}

impl FrameSource for SyntheticSource {
    fn next_frame(&mut self) -> Result<AudioFrame> {
        Ok(self.generate())
    }

    fn is_realtime(&self) -> bool {
        false
    }
}

// === WAV file ===

/// Frames read from a WAV file, channel 0 only, looping at end of file
pub struct WavFileSource {
    reader: hound::WavReader<BufReader<File>>,
    spec: hound::WavSpec,
    block_size: usize,
}

impl WavFileSource {
    pub fn open(path: &Path, config: &AnalysisConfig) -> Result<Self> {
        let reader = hound::WavReader::open(path)?;
        let spec = reader.spec();

        if reader.duration() == 0 {
            return Err(VisualizerError::InvalidConfig(format!(
                "WAV file {} has no samples",
                path.display()
            )));
        }
        if spec.sample_rate != config.sample_rate_hz {
            warn!(
                file_rate = spec.sample_rate,
                config_rate = config.sample_rate_hz,
                "WAV sample rate differs from analysis rate; band frequencies will be shifted"
            );
        }
        info!(
            path = %path.display(),
            channels = spec.channels,
            sample_rate = spec.sample_rate,
            "Reading audio from WAV file"
        );

        Ok(Self {
            reader,
            spec,
            block_size: config.block_size(),
        })
    }

    /// Next interleaved sample normalized to `[-1, 1]`, `None` at end of file
    fn read_sample(&mut self) -> Result<Option<f32>> {
        let sample = match self.spec.sample_format {
            hound::SampleFormat::Float => self.reader.samples::<f32>().next().transpose()?,
            hound::SampleFormat::Int => {
                let scale = (1i64 << (self.spec.bits_per_sample.saturating_sub(1))) as f32;
                self.reader
                    .samples::<i32>()
                    .next()
                    .transpose()?
                    .map(|s| s as f32 / scale)
            }
        };
        Ok(sample)
    }

    fn next_wrapping(&mut self) -> Result<f32> {
        if let Some(sample) = self.read_sample()? {
            return Ok(sample);
        }
        self.reader.seek(0)?;
        debug!("WAV source reached end of file, looping");
        self.read_sample()?.ok_or_else(|| {
            VisualizerError::InvalidConfig("WAV file yielded no samples after rewind".to_string())
        })
    }
}

impl FrameSource for WavFileSource {
    fn next_frame(&mut self) -> Result<AudioFrame> {
        let channels = self.spec.channels.max(1) as usize;
        let mut samples = Vec::with_capacity(self.block_size);
        while samples.len() < self.block_size {
            let first = self.next_wrapping()?;
            for _ in 1..channels {
                self.next_wrapping()?;
            }
            samples.push(first);
        }
        Ok(AudioFrame::new(samples))
    }

    fn is_realtime(&self) -> bool {
        false
    }
}

// === Live capture ===

/// Default input device, read one block per call
pub struct CaptureSource {
    /// Input stream (kept alive)
    _stream: cpal::Stream,
    receiver: Receiver<Vec<f32>>,
    pending: VecDeque<f32>,
    block_size: usize,
    stream_failed: Arc<AtomicBool>,
    dropped_chunks: Arc<AtomicU64>,
}

impl CaptureSource {
    /// Open the default input device at the configured sample rate
    pub fn open(config: &AnalysisConfig) -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or_else(|| VisualizerError::Capture("No audio input device found".to_string()))?;

        let supported = device
            .default_input_config()
            .map_err(|e| VisualizerError::Capture(format!("Failed to get input config: {}", e)))?;

        let stream_config = cpal::StreamConfig {
            channels: supported.channels(),
            sample_rate: cpal::SampleRate(config.sample_rate_hz),
            buffer_size: cpal::BufferSize::Default,
        };

        info!(
            device = %device.name().unwrap_or_else(|_| "Unknown".to_string()),
            sample_rate = config.sample_rate_hz,
            channels = stream_config.channels,
            format = ?supported.sample_format(),
            "Opening audio input"
        );

        let (sender, receiver) = mpsc::sync_channel(CAPTURE_CHANNEL_CAPACITY);
        let stream_failed = Arc::new(AtomicBool::new(false));
        let dropped_chunks = Arc::new(AtomicU64::new(0));
        let link = CaptureLink {
            sender,
            channels: stream_config.channels.max(1) as usize,
            stream_failed: Arc::clone(&stream_failed),
            dropped_chunks: Arc::clone(&dropped_chunks),
        };

        let stream = match supported.sample_format() {
            cpal::SampleFormat::F32 => build_input_stream::<f32>(&device, &stream_config, link)?,
            cpal::SampleFormat::I16 => build_input_stream::<i16>(&device, &stream_config, link)?,
            cpal::SampleFormat::U16 => build_input_stream::<u16>(&device, &stream_config, link)?,
            other => {
                return Err(VisualizerError::Capture(format!(
                    "Unsupported input sample format: {:?}",
                    other
                )))
            }
        };

        stream
            .play()
            .map_err(|e| VisualizerError::Capture(format!("Failed to start input stream: {}", e)))?;

        Ok(Self {
            _stream: stream,
            receiver,
            pending: VecDeque::new(),
            block_size: config.block_size(),
            stream_failed,
            dropped_chunks,
        })
    }
}

impl FrameSource for CaptureSource {
    fn next_frame(&mut self) -> Result<AudioFrame> {
        while self.pending.len() < self.block_size {
            if self.stream_failed.load(Ordering::Relaxed) {
                return Err(VisualizerError::Capture(
                    "Input stream reported an error".to_string(),
                ));
            }
            match self.receiver.recv_timeout(CAPTURE_STALL_TIMEOUT) {
                Ok(chunk) => self.pending.extend(chunk),
                Err(RecvTimeoutError::Timeout) => {
                    return Err(VisualizerError::Capture(format!(
                        "No audio received for {:?}",
                        CAPTURE_STALL_TIMEOUT
                    )))
                }
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(VisualizerError::Capture(
                        "Input stream closed".to_string(),
                    ))
                }
            }
        }

        let dropped = self.dropped_chunks.swap(0, Ordering::Relaxed);
        if dropped > 0 {
            debug!(dropped, "Capture overrun, dropped input chunks");
        }

        Ok(AudioFrame::new(self.pending.drain(..self.block_size).collect()))
    }

    fn is_realtime(&self) -> bool {
        true
    }
}

/// State moved into the device callback
struct CaptureLink {
    sender: mpsc::SyncSender<Vec<f32>>,
    channels: usize,
    stream_failed: Arc<AtomicBool>,
    dropped_chunks: Arc<AtomicU64>,
}

fn build_input_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    link: CaptureLink,
) -> Result<cpal::Stream>
where
    T: cpal::SizedSample,
    f32: cpal::FromSample<T>,
{
    let CaptureLink {
        sender,
        channels,
        stream_failed,
        dropped_chunks,
    } = link;

    device
        .build_input_stream(
            config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                // Channel 0 only
                let mono: Vec<f32> = data
                    .iter()
                    .step_by(channels)
                    .map(|&s| <f32 as cpal::FromSample<T>>::from_sample_(s))
                    .collect();
                if sender.try_send(mono).is_err() {
                    dropped_chunks.fetch_add(1, Ordering::Relaxed);
                }
            },
            move |err| {
                error!("Audio input stream error: {}", err);
                stream_failed.store(true, Ordering::Relaxed);
            },
            None,
        )
        .map_err(|e| VisualizerError::Capture(format!("Failed to build input stream: {}", e)))
}

// === Fallback wrapper ===

/// Infinite frame sequence: the live source while it works, the generator after
pub struct FallbackSource {
    primary: Option<Box<dyn FrameSource>>,
    fallback: SyntheticSource,
}

impl FallbackSource {
    pub fn new(primary: Box<dyn FrameSource>, fallback: SyntheticSource) -> Self {
        Self {
            primary: Some(primary),
            fallback,
        }
    }

    /// Generator only
    pub fn synthetic(fallback: SyntheticSource) -> Self {
        Self {
            primary: None,
            fallback,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.primary.is_none()
    }

    /// Next frame, switching permanently to the generator on the first read error
    pub fn next_or_fallback(&mut self) -> AudioFrame {
        if let Some(primary) = self.primary.as_mut() {
            match primary.next_frame() {
                Ok(frame) => return frame,
                Err(e) => {
                    warn!("Audio source failed ({}); switching to test signal", e);
                    self.primary = None;
                }
            }
        }
        self.fallback.generate()
    }
}

impl FrameSource for FallbackSource {
    fn next_frame(&mut self) -> Result<AudioFrame> {
        Ok(self.next_or_fallback())
    }

    fn is_realtime(&self) -> bool {
        self.primary
            .as_ref()
            .map(|p| p.is_realtime())
            .unwrap_or(false)
    }
}

impl Iterator for FallbackSource {
    type Item = AudioFrame;

    fn next(&mut self) -> Option<AudioFrame> {
        Some(self.next_or_fallback())
    }
}
