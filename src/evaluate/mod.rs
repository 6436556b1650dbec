//! # Timestamp Evaluation
//!
//! Acceptance check over the `timestamps` array of a produced archive.
//!
//! The average gap is `(t[n-1] - t[0]) / (n - 1)`. A shot is *space-correct*
//! when the gap to its previous shot and the gap to its next shot (where those
//! exist) each differ from the average gap by at most
//! `deviation_threshold_ratio * avg_gap`. The archive is accepted when at least
//! `acceptance_ratio_threshold` percent of the shots are space-correct.
//!
//! ```rust,no_run
//! use capture_npz::evaluate::{evaluate_archive, EvaluationConfig};
//!
//! let report = evaluate_archive(
//!     "processed_files/processed_gage_shot_0001.npz",
//!     &EvaluationConfig::default(),
//! )?;
//! println!("{}", report);
//! # Ok::<(), capture_npz::evaluate::EvaluateError>(())
//! ```

mod report;
mod spectrum;

use std::cmp::Ordering;
use std::fmt;
use std::path::Path;

use log::info;
use serde::Deserialize;

use crate::npz::{NpzArchive, NpzError};
use crate::profile::TIMESTAMPS_KEY;

pub use report::EvaluationReport;
pub use spectrum::{timestamp_spectrum, Spectrum};

/// Errors that prevent an evaluation from producing a report
#[derive(Debug, thiserror::Error)]
pub enum EvaluateError {
    /// Archive has no `timestamps` array
    #[error("No 'timestamps' found in {0}")]
    MissingTimestamps(String),

    /// Fewer than two timestamps, so no gap can be computed
    #[error("Not enough timestamps: {0} (need at least 2)")]
    TooFewTimestamps(usize),

    /// Mean shot interval is zero, negative or not finite
    #[error("Invalid sampling interval: {0}")]
    InvalidSamplingInterval(f64),

    /// Uniform resampling grid has fewer than two points
    #[error("Too few FFT samples: {0}")]
    TooFewSamples(usize),

    /// Error reading the archive
    #[error("Archive error: {0}")]
    ArchiveError(#[from] NpzError),
}

/// Acceptance thresholds.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    /// Allowed deviation of a gap from the average gap, as a fraction of it
    pub deviation_threshold_ratio: f64,
    /// Minimum percentage of space-correct shots for acceptance
    pub acceptance_ratio_threshold: f64,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            deviation_threshold_ratio: 0.2,
            acceptance_ratio_threshold: 80.0,
        }
    }
}

/// Evaluate a timestamp series.
pub fn evaluate_timestamps(
    timestamps: &[f64],
    config: &EvaluationConfig,
) -> Result<EvaluationReport, EvaluateError> {
    let num_shots = timestamps.len();
    if num_shots < 2 {
        return Err(EvaluateError::TooFewTimestamps(num_shots));
    }

    let avg_time_gap = (timestamps[num_shots - 1] - timestamps[0]) / (num_shots - 1) as f64;
    let tolerance = config.deviation_threshold_ratio * avg_time_gap;
    // A NaN deviation never exceeds the tolerance.
    let within = |gap: f64| {
        (gap - avg_time_gap).abs().partial_cmp(&tolerance) != Some(Ordering::Greater)
    };

    let num_space_correct = (0..num_shots)
        .filter(|&i| {
            let prev_ok = i == 0 || within(timestamps[i] - timestamps[i - 1]);
            let next_ok = i + 1 == num_shots || within(timestamps[i + 1] - timestamps[i]);
            prev_ok && next_ok
        })
        .count();

    let percent_space_correct = num_space_correct as f64 * 100.0 / num_shots as f64;

    Ok(EvaluationReport {
        file_path: None,
        num_shots,
        avg_time_gap,
        num_space_correct,
        percent_space_correct,
        deviation_threshold_percent: config.deviation_threshold_ratio * 100.0,
        acceptance_threshold_percent: config.acceptance_ratio_threshold,
        accepted: percent_space_correct >= config.acceptance_ratio_threshold,
    })
}

/// Evaluate the `timestamps` array of the archive at `path`.
pub fn evaluate_archive<P: AsRef<Path>>(
    path: P,
    config: &EvaluationConfig,
) -> Result<EvaluationReport, EvaluateError> {
    let path = path.as_ref();
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let mut archive = NpzArchive::open(path)?;
    if !archive.contains(TIMESTAMPS_KEY) {
        return Err(EvaluateError::MissingTimestamps(name));
    }
    let timestamps = archive.read_array(TIMESTAMPS_KEY)?.data().to_f64_vec();

    let mut report = evaluate_timestamps(&timestamps, config)?;
    report.file_path = Some(path.display().to_string());

    info!(
        "File {} {}: {:.2}% shots are space_correct.",
        name,
        if report.accepted { "accepted" } else { "rejected" },
        report.percent_space_correct
    );
    Ok(report)
}

/// Running acceptance counters over a sequence of evaluations.
///
/// `streak` counts consecutive accepted files and drops to zero on the first
/// rejection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AcceptanceTracker {
    /// Files evaluated
    pub processed: usize,
    /// Files accepted
    pub accepted: usize,
    /// Consecutive accepted files up to the latest one
    pub streak: usize,
}

impl AcceptanceTracker {
    /// Record one verdict.
    pub fn record(&mut self, accepted: bool) {
        self.processed += 1;
        if accepted {
            self.accepted += 1;
            self.streak += 1;
        } else {
            self.streak = 0;
        }
    }

    /// Files rejected, including those that could not be evaluated.
    pub fn rejected(&self) -> usize {
        self.processed - self.accepted
    }
}

impl fmt::Display for AcceptanceTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} of {} accepted, streak {}",
            self.accepted, self.processed, self.streak
        )
    }
}
