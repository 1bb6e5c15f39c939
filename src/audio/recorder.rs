//! Recording of analysed input to a WAV file.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::info;

use super::frame::AudioFrame;
use crate::error::Result;
use crate::params::RecordingConfig;

/// Writes consumed frames to a mono 32-bit float WAV file until the duration is reached
pub struct FrameRecorder {
    writer: Option<hound::WavWriter<BufWriter<File>>>,
    path: PathBuf,
    remaining: usize,
}

impl FrameRecorder {
    /// Create the output directory and WAV file
    pub fn create(config: &RecordingConfig, sample_rate_hz: u32) -> Result<Self> {
        std::fs::create_dir_all(&config.output_dir)?;
        let path = config.audio_path();

        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: sample_rate_hz,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let writer = hound::WavWriter::create(&path, spec)?;
        info!(path = %path.display(), seconds = config.duration_secs, "Recording input");

        Ok(Self {
            writer: Some(writer),
            path,
            remaining: config.total_samples(sample_rate_hz),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_finished(&self) -> bool {
        self.writer.is_none()
    }

    /// Append `frame`, truncated to the remaining duration. Finalizes the file once full.
    pub fn record(&mut self, frame: &AudioFrame) -> Result<()> {
        let Some(writer) = self.writer.as_mut() else {
            return Ok(());
        };

        let take = frame.len().min(self.remaining);
        for &sample in &frame[..take] {
            writer.write_sample(sample)?;
        }
        self.remaining -= take;

        if self.remaining == 0 {
            self.finish()?;
        }
        Ok(())
    }

    /// Finalize the WAV header; further frames are ignored
    pub fn finish(&mut self) -> Result<()> {
        if let Some(writer) = self.writer.take() {
            writer.finalize()?;
            info!(path = %self.path.display(), "Recording finished");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_exact_duration() {
        let dir = tempfile::tempdir().unwrap();
        let config = RecordingConfig {
            duration_secs: 0.01,
            output_dir: dir.path().join("rec"),
        };
        // 0.01 s @ 1000 Hz = 10 samples
        let mut recorder = FrameRecorder::create(&config, 1000).unwrap();

        recorder.record(&AudioFrame::new(vec![0.5; 4])).unwrap();
        assert!(!recorder.is_finished());
        recorder.record(&AudioFrame::new(vec![-0.25; 8])).unwrap();
        assert!(recorder.is_finished());
        recorder.record(&AudioFrame::new(vec![1.0; 8])).unwrap();

        let mut reader = hound::WavReader::open(recorder.path()).unwrap();
        assert_eq!(reader.spec().channels, 1);
        assert_eq!(reader.spec().sample_rate, 1000);
        let samples: Vec<f32> = reader.samples::<f32>().map(|s| s.unwrap()).collect();
        assert_eq!(samples.len(), 10);
        assert_eq!(&samples[..4], &[0.5; 4]);
        assert_eq!(&samples[4..], &[-0.25; 6]);
    }

    #[test]
    fn test_finish_early_keeps_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = RecordingConfig {
            duration_secs: 10.0,
            output_dir: dir.path().to_path_buf(),
        };
        let mut recorder = FrameRecorder::create(&config, 8000).unwrap();
        recorder.record(&AudioFrame::new(vec![0.1; 100])).unwrap();
        recorder.finish().unwrap();

        let reader = hound::WavReader::open(config.audio_path()).unwrap();
        assert_eq!(reader.duration(), 100);
    }
}
