use crate::array::ArrayError;

/// Errors that can occur while writing or reading `.npz` archives
#[derive(Debug, thiserror::Error)]
pub enum NpzError {
    /// I/O error during file operations
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from the ZIP container library
    #[error("ZIP error: {0}")]
    ZipError(#[from] zip::result::ZipError),

    /// Malformed `.npy` header
    #[error("Invalid NPY header: {0}")]
    InvalidHeader(String),

    /// NPY type descriptor that has no [`crate::array::ElementType`] counterpart
    #[error("Unsupported NPY dtype: {0}")]
    UnsupportedDtype(String),

    /// Column-major arrays are not supported
    #[error("Fortran-ordered arrays are not supported (entry {0})")]
    FortranOrder(String),

    /// Array payload shorter than its header declares
    #[error("Truncated array data for {key}: expected {expected} bytes, found {actual}")]
    Truncated {
        /// Archive key
        key: String,
        /// Bytes implied by header
        expected: usize,
        /// Bytes present
        actual: usize,
    },

    /// Requested key is not present in the archive
    #[error("Array not found in archive: {0}")]
    MissingArray(String),

    /// Key cannot be used as an archive entry name
    #[error("Invalid array key: {0:?}")]
    InvalidKey(String),

    /// Decoded header and payload disagree
    #[error("Invalid array: {0}")]
    InvalidArray(#[from] ArrayError),
}
