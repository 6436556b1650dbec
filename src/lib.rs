//! # capture-npz - Capture Files to NumPy Archives
//!
//! `capture_npz` converts HDF5 capture files recorded by two acquisition
//! devices into NumPy `.npz` archives for downstream analysis.
//!
//! ## Supported Devices
//!
//! | Device | Filename token | Datasets | Time axis |
//! |--------|----------------|----------|-----------|
//! | gagescope digitizer | `gage_shot_` | `CH<n>_frame<m>` waveforms | `i / sampling_frequency` |
//! | JKAM (High NA) camera | `jkam_capture_` | `frame-<nn>` images, archived as `frame_<nn>` | `[0.0]` |
//!
//! Every archive is written to `processed_files/processed_<stem>.npz` and holds
//! one array per extracted dataset plus the time axis under `timestamps`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! # #[cfg(feature = "hdf5")]
//! # {
//! use capture_npz::converter::FileConverter;
//!
//! let converter = FileConverter::new();
//! match converter.try_convert("gage_shot_0001.h5") {
//!     Ok(path) => println!("wrote {}", path.display()),
//!     Err(e) => eprintln!("skipped: {}", e),
//! }
//! # }
//! ```
//!
//! Archives load directly with NumPy:
//!
//! ```python
//! import numpy as np
//! data = np.load("processed_files/processed_gage_shot_0001.npz")
//! t, ch1 = data["timestamps"], data["CH1_frame0"]
//! ```
//!
//! ## Architecture
//!
//! - [`array`]: typed, shape-carrying numeric arrays
//! - [`capture`]: capture container access (HDF5 and in-memory backends)
//! - [`profile`]: device profiles and filename detection
//! - [`converter`]: the capture-to-archive conversion
//! - [`npz`]: NPY encoding and the NPZ archive writer / reader
//! - [`evaluate`]: timestamp-spacing acceptance check
//!
//! ## Features
//!
//! - `hdf5` (default): HDF5 backend, requires the native HDF5 library
//! - `colorized_output` (default): coloured evaluation reports

// Documentation lints - enforce complete documentation for publication
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

pub mod array;
pub mod capture;
pub mod converter;
pub mod evaluate;
pub mod npz;
pub mod profile;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::array::{ArrayData, ElementType, NumericArray};
    #[cfg(feature = "hdf5")]
    pub use crate::capture::Hdf5Backend;
    pub use crate::capture::{
        CaptureBackend, CaptureError, CaptureSource, MemoryBackend, MemoryCapture,
    };
    pub use crate::converter::{
        BatchSummary, ConvertError, ConverterConfig, EvaluatedArchive, FileConverter,
    };
    pub use crate::evaluate::{
        evaluate_archive, evaluate_timestamps, timestamp_spectrum, AcceptanceTracker,
        EvaluateError, EvaluationConfig, EvaluationReport, Spectrum,
    };
    pub use crate::npz::{NpzArchive, NpzError, NpzStats, NpzWriter};
    pub use crate::profile::{DeviceProfile, ProfileMatch, TIMESTAMPS_KEY};
}
