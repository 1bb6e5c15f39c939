//! Per-cycle data carried through the pipeline.

use std::ops::Deref;

/// One block of mono samples, roughly in `[-1, 1]`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AudioFrame {
    samples: Vec<f32>,
}

impl AudioFrame {
    pub fn new(samples: Vec<f32>) -> Self {
        Self { samples }
    }

    /// Silent frame of `len` samples
    pub fn silence(len: usize) -> Self {
        Self::new(vec![0.0; len])
    }

    /// Build a mono frame from interleaved multi-channel samples, keeping channel 0
    pub fn from_interleaved(data: &[f32], channels: usize) -> Self {
        let channels = channels.max(1);
        Self::new(data.iter().step_by(channels).copied().collect())
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }
}

impl Deref for AudioFrame {
    type Target = [f32];

    fn deref(&self) -> &[f32] {
        &self.samples
    }
}

/// Log-compressed peak magnitude per band, one value per band
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BandSpectrum(Vec<f32>);

impl BandSpectrum {
    pub fn new(values: Vec<f32>) -> Self {
        Self(values)
    }

    pub fn zeros(band_count: usize) -> Self {
        Self(vec![0.0; band_count])
    }

    pub fn into_inner(self) -> Vec<f32> {
        self.0
    }
}

impl Deref for BandSpectrum {
    type Target = [f32];

    fn deref(&self) -> &[f32] {
        &self.0
    }
}

/// Final per-cycle bar heights in `[0, 1]`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NormalizedBars(Vec<f32>);

impl NormalizedBars {
    pub fn new(values: Vec<f32>) -> Self {
        Self(values)
    }

    pub fn zeros(band_count: usize) -> Self {
        Self(vec![0.0; band_count])
    }

    /// Mean bar height, used by the single-meter render style
    pub fn mean(&self) -> f32 {
        if self.0.is_empty() {
            return 0.0;
        }
        self.0.iter().sum::<f32>() / self.0.len() as f32
    }

    pub fn into_inner(self) -> Vec<f32> {
        self.0
    }
}

impl Deref for NormalizedBars {
    type Target = [f32];

    fn deref(&self) -> &[f32] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_interleaved_keeps_first_channel() {
        let interleaved = [0.1, -0.1, 0.2, -0.2, 0.3, -0.3];
        let frame = AudioFrame::from_interleaved(&interleaved, 2);
        assert_eq!(frame.samples(), &[0.1, 0.2, 0.3]);

        let mono = AudioFrame::from_interleaved(&interleaved, 1);
        assert_eq!(mono.len(), 6);
    }

    #[test]
    fn test_bars_mean() {
        assert_eq!(NormalizedBars::zeros(0).mean(), 0.0);
        assert_eq!(NormalizedBars::new(vec![1.0, 0.0, 0.5, 0.5]).mean(), 0.5);
    }
}
