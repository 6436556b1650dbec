use std::path::PathBuf;

use crate::array::ArrayError;

/// Errors that can occur while reading a capture file
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    /// Error from the HDF5 library
    #[cfg(feature = "hdf5")]
    #[error("HDF5 error: {0}")]
    Hdf5Error(#[from] hdf5::Error),

    /// No capture is registered or present at the given path
    #[error("Capture file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The named dataset does not exist in the container
    #[error("Dataset not found: {0}")]
    MissingDataset(String),

    /// The dataset's element type cannot be represented in an archive
    #[error("Dataset {dataset} has unsupported element type {dtype}")]
    UnsupportedType {
        /// Dataset name
        dataset: String,
        /// Description of the stored type
        dtype: String,
    },

    /// The dataset's buffer does not match its declared shape
    #[error("Invalid array: {0}")]
    InvalidArray(#[from] ArrayError),
}
