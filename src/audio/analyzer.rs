//! Spectral band analysis.
//!
//! Windowed FFT of one frame, bucketed into equal-width bands from 0 Hz to
//! Nyquist. Each band keeps the peak bin magnitude, compressed with `ln_1p`.

use rustfft::{num_complex::Complex, Fft, FftPlanner, Length};
use std::f32::consts::PI;
use std::sync::Arc;

use super::frame::{AudioFrame, BandSpectrum};
use crate::params::{band_edges, bin_frequency};

/// Reusable analyzer: keeps the FFT plan and scratch buffer between frames.
///
/// Output depends only on the frame, sample rate and band count.
pub struct SpectrumAnalyzer {
    plan: Option<Arc<dyn Fft<f32>>>,
    buffer: Vec<Complex<f32>>,
}

impl Default for SpectrumAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl SpectrumAnalyzer {
    pub fn new() -> Self {
        Self {
            plan: None,
            buffer: Vec::new(),
        }
    }

    /// Forward FFT for `len` samples, re-planned only when the frame length changes
    fn plan_for(&mut self, len: usize) -> Arc<dyn Fft<f32>> {
        match &self.plan {
            Some(plan) if plan.len() == len => Arc::clone(plan),
            _ => {
                let plan = FftPlanner::new().plan_fft_forward(len);
                self.plan = Some(Arc::clone(&plan));
                plan
            }
        }
    }

    /// Convert one frame into `band_count` log-compressed band peaks
    pub fn analyze(
        &mut self,
        frame: &AudioFrame,
        sample_rate_hz: u32,
        band_count: usize,
    ) -> BandSpectrum {
        let mut bands = vec![0.0f32; band_count];
        let len = frame.len();
        if len == 0 || band_count == 0 {
            return BandSpectrum::new(bands);
        }

        // Apply Hann window
        self.buffer.clear();
        self.buffer.extend(
            frame
                .iter()
                .enumerate()
                .map(|(i, &s)| Complex::new(s * hann_window(i, len), 0.0)),
        );

        // Perform FFT
        let fft = self.plan_for(len);
        fft.process(&mut self.buffer);

        // Non-negative frequency bins only, peak per band
        let edges = band_edges(sample_rate_hz, band_count);
        for (bin, value) in self.buffer[..len / 2 + 1].iter().enumerate() {
            let freq = bin_frequency(bin, sample_rate_hz, len);
            if let Some(band) = band_index(&edges, freq) {
                bands[band] = bands[band].max(value.norm());
            }
        }

        for amp in bands.iter_mut() {
            *amp = amp.ln_1p();
        }

        BandSpectrum::new(bands)
    }
}

/// One-shot analysis without keeping a plan around
pub fn analyze(frame: &AudioFrame, sample_rate_hz: u32, band_count: usize) -> BandSpectrum {
    SpectrumAnalyzer::new().analyze(frame, sample_rate_hz, band_count)
}

/// Band `i` such that `edges[i] <= freq < edges[i + 1]`
fn band_index(edges: &[f64], freq: f64) -> Option<usize> {
    let at_or_below = edges.partition_point(|&edge| edge <= freq);
    if at_or_below == 0 || at_or_below >= edges.len() {
        return None;
    }
    Some(at_or_below - 1)
}

/// Hann window function for FFT analysis (symmetric form)
pub fn hann_window(index: usize, size: usize) -> f32 {
    if size <= 1 {
        return 1.0;
    }
    0.5 * (1.0 - ((2.0 * PI * index as f32) / (size as f32 - 1.0)).cos())
}
