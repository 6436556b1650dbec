use crate::capture::CaptureError;
use crate::npz::NpzError;
use crate::profile::DeviceProfile;

/// Reasons a capture file produced no archive
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// Filename carries no known device token
    #[error("{file} does not match gage_shot_ or jkam_capture_ patterns")]
    UnrecognizedPattern {
        /// Capture filename
        file: String,
    },

    /// Filename matched a profile but the container has none of its datasets
    #[error("{profile} file {file} has no {prefix}* datasets")]
    NoMatchingDatasets {
        /// Capture filename
        file: String,
        /// Matched profile
        profile: DeviceProfile,
        /// Dataset prefix that was searched for
        prefix: &'static str,
    },

    /// Channel frames matched but none has a first dimension to count samples from
    #[error("No valid channel frames in {file}: sample count could not be determined")]
    UndeterminedSampleCount {
        /// Capture filename
        file: String,
    },

    /// Channel frames disagree on their sample count
    #[error("Channel frames in {file} disagree on sample count: {dataset} has {found}, expected {expected}")]
    InconsistentSampleCount {
        /// Capture filename
        file: String,
        /// First dataset whose length differs
        dataset: String,
        /// Sample count of the preceding datasets
        expected: usize,
        /// Sample count of `dataset`
        found: usize,
    },

    /// A dataset maps onto the key reserved for the time axis
    #[error("Dataset {dataset} in {file} maps to the reserved key 'timestamps'")]
    ReservedKeyCollision {
        /// Capture filename
        file: String,
        /// Offending dataset name
        dataset: String,
    },

    /// Two datasets map onto the same archive key
    #[error("Datasets in {file} collide on archive key {key}")]
    DuplicateKey {
        /// Capture filename
        file: String,
        /// Colliding key
        key: String,
    },

    /// Sampling frequency is not a positive finite number
    #[error("Invalid sampling frequency: {0} Hz")]
    InvalidSamplingFrequency(f64),

    /// Error from the capture container
    #[error("Capture error: {0}")]
    CaptureError(#[from] CaptureError),

    /// Error while writing the archive
    #[error("Archive error: {0}")]
    ArchiveError(#[from] NpzError),

    /// I/O error (output directory creation)
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ConvertError {
    /// Whether this is one of the anticipated "nothing to convert" outcomes
    /// (logged as warnings) rather than an unexpected failure (logged as errors).
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            ConvertError::UnrecognizedPattern { .. }
                | ConvertError::NoMatchingDatasets { .. }
                | ConvertError::UndeterminedSampleCount { .. }
                | ConvertError::InconsistentSampleCount { .. }
                | ConvertError::ReservedKeyCollision { .. }
                | ConvertError::DuplicateKey { .. }
        )
    }
}
