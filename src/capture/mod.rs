//! # Capture Containers
//!
//! Read-only access to the hierarchical container files written by the
//! acquisition hardware.
//!
//! - [`CaptureSource`]: an opened container; lists top-level dataset names and
//!   copies a dataset out as a [`NumericArray`].
//! - [`CaptureBackend`]: opens a [`CaptureSource`] for a path.
//! - [`Hdf5Backend`]: HDF5 files via `hdf5-metno` (feature `hdf5`).
//! - [`MemoryBackend`]: captures held in memory, keyed by path.
//!
//! A source is owned by the caller for the duration of one conversion and
//! releases its file handle when dropped, so every exit path closes it.

mod error;
#[cfg(feature = "hdf5")]
mod hdf5_file;
mod memory;

use std::path::Path;

use crate::array::NumericArray;

pub use error::CaptureError;
#[cfg(feature = "hdf5")]
pub use hdf5_file::{Hdf5Backend, Hdf5Capture};
pub use memory::{MemoryBackend, MemoryCapture};

/// An opened capture container.
pub trait CaptureSource {
    /// Names of the datasets directly under the root of the container.
    ///
    /// The order is whatever the container yields; callers sort if they need
    /// a stable order.
    fn dataset_names(&self) -> Result<Vec<String>, CaptureError>;

    /// Copy the named dataset into memory.
    fn read_dataset(&self, name: &str) -> Result<NumericArray, CaptureError>;
}

/// Opens capture containers by path.
pub trait CaptureBackend {
    /// Open the container at `path` for reading.
    fn open(&self, path: &Path) -> Result<Box<dyn CaptureSource>, CaptureError>;
}
