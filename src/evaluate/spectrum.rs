//! Frequency spectrum of a timestamp series.
//!
//! The shots are resampled onto a uniform grid spanning the series at the mean
//! shot interval, as a unit-amplitude signal, and transformed with a forward
//! FFT. Only strictly positive frequency bins are kept.

use std::cmp::Ordering;

use log::{debug, warn};
use num_complex::Complex;
use rustfft::FftPlanner;

use super::EvaluateError;

/// Positive-frequency magnitude spectrum.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    /// Bin frequencies in Hz, ascending
    pub frequencies: Vec<f64>,
    /// `|X_k|` for each bin
    pub amplitudes: Vec<f64>,
    /// Mean interval between shots, in seconds
    pub sampling_interval: f64,
}

impl Spectrum {
    /// Number of frequency bins.
    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    /// Whether the spectrum has no positive-frequency bins.
    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    /// Frequency and amplitude of the strongest bin.
    pub fn peak(&self) -> Option<(f64, f64)> {
        self.frequencies
            .iter()
            .copied()
            .zip(self.amplitudes.iter().copied())
            .max_by(|a, b| a.1.total_cmp(&b.1))
    }
}

/// Compute the spectrum of `timestamps`.
///
/// Unsorted input is sorted first, with a warning.
pub fn timestamp_spectrum(timestamps: &[f64]) -> Result<Spectrum, EvaluateError> {
    if timestamps.len() < 2 {
        return Err(EvaluateError::TooFewTimestamps(timestamps.len()));
    }

    let mut sorted = timestamps.to_vec();
    if sorted
        .windows(2)
        .any(|w| w[1].partial_cmp(&w[0]) != Some(Ordering::Greater))
    {
        warn!("Timestamps are not strictly increasing; sorting before FFT");
        sorted.sort_by(f64::total_cmp);
    }

    let first = sorted[0];
    let last = sorted[sorted.len() - 1];
    // Mean of the successive differences.
    let dt = (last - first) / (sorted.len() - 1) as f64;
    if !dt.is_finite() || dt <= 0.0 {
        return Err(EvaluateError::InvalidSamplingInterval(dt));
    }

    let num_samples = ((last - first) / dt).floor() as usize;
    if num_samples < 2 {
        return Err(EvaluateError::TooFewSamples(num_samples));
    }
    debug!(
        "Timestamps range {} to {}, dt = {}, {} FFT samples",
        first, last, dt, num_samples
    );

    // Interpolating a unit signal at the shots onto the uniform grid.
    let mut buffer = vec![Complex::new(1.0f64, 0.0); num_samples];
    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(num_samples);
    fft.process(&mut buffer);

    let resolution = 1.0 / (num_samples as f64 * dt);
    let positive_bins = (num_samples - 1) / 2;
    let frequencies = (1..=positive_bins).map(|k| k as f64 * resolution).collect();
    let amplitudes = buffer[1..=positive_bins].iter().map(|c| c.norm()).collect();

    Ok(Spectrum {
        frequencies,
        amplitudes,
        sampling_interval: dt,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_shots() {
        let timestamps: Vec<f64> = (0..11).map(|i| i as f64 * 0.5).collect();
        let spectrum = timestamp_spectrum(&timestamps).unwrap();

        assert!((spectrum.sampling_interval - 0.5).abs() < 1e-12);
        // 10 samples: bins 1..=4 at k / (10 * 0.5) Hz
        assert_eq!(spectrum.len(), 4);
        for (k, f) in spectrum.frequencies.iter().enumerate() {
            assert!((f - (k + 1) as f64 * 0.2).abs() < 1e-12);
        }
        // A constant signal has no energy away from DC.
        assert!(spectrum.amplitudes.iter().all(|a| *a < 1e-9));
    }

    #[test]
    fn test_odd_sample_count_bins() {
        let timestamps: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let spectrum = timestamp_spectrum(&timestamps).unwrap();
        // 9 samples: bins 1..=4
        assert_eq!(spectrum.len(), 4);
        assert!(spectrum.peak().is_some());
    }

    #[test]
    fn test_unsorted_input_is_sorted() {
        let sorted: Vec<f64> = (0..8).map(|i| i as f64 * 1e-8).collect();
        let mut shuffled = sorted.clone();
        shuffled.swap(1, 5);
        shuffled.swap(0, 7);

        assert_eq!(
            timestamp_spectrum(&shuffled).unwrap(),
            timestamp_spectrum(&sorted).unwrap()
        );
    }

    #[test]
    fn test_degenerate_inputs() {
        assert!(matches!(
            timestamp_spectrum(&[0.0]),
            Err(EvaluateError::TooFewTimestamps(1))
        ));
        assert!(matches!(
            timestamp_spectrum(&[1.0, 1.0, 1.0]),
            Err(EvaluateError::InvalidSamplingInterval(_))
        ));
        assert!(matches!(
            timestamp_spectrum(&[0.0, 1.0]),
            Err(EvaluateError::TooFewSamples(1))
        ));
    }
}
