//! # NPZ Archives
//!
//! Writer and reader for NumPy `.npz` archives, the output format of the
//! converter.
//!
//! ## Container Layout
//!
//! ```text
//! processed_<stem>.npz (ZIP archive, Deflate compressed)
//! ├── CH1_frame0.npy      # one NPY entry per extracted dataset
//! ├── CH3_frame0.npy
//! └── timestamps.npy      # float64 time axis
//! ```
//!
//! This is the layout produced by `numpy.savez_compressed`, so archives load
//! directly with `numpy.load`.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use capture_npz::array::NumericArray;
//! use capture_npz::npz::{NpzArchive, NpzWriter};
//!
//! let timestamps = NumericArray::from_vec(vec![0.0f64, 1e-8, 2e-8]);
//! let stats = NpzWriter::new().write("out.npz", [("timestamps", &timestamps)])?;
//! println!("{}", stats);
//!
//! let mut archive = NpzArchive::open("out.npz")?;
//! assert_eq!(archive.read_array("timestamps")?, timestamps);
//! # Ok::<(), capture_npz::npz::NpzError>(())
//! ```

mod error;
pub mod npy;
mod reader;
mod writer;


pub use error::NpzError;
pub use reader::NpzArchive;
pub use writer::{NpzStats, NpzWriter, NpzWriterConfig};
