use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::debug;
use tempfile::NamedTempFile;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use crate::array::NumericArray;

use super::npy::{encode_header, write_npy};
use super::NpzError;

/// Statistics from a completed archive write
#[derive(Debug, Clone)]
pub struct NpzStats {
    /// Final archive path
    pub path: PathBuf,
    /// Number of arrays written
    pub arrays_written: usize,
    /// Uncompressed size of all `.npy` entries in bytes
    pub uncompressed_bytes: u64,
    /// Size of the archive on disk in bytes
    pub file_size_bytes: u64,
}

impl NpzStats {
    /// Ratio of uncompressed entry size to archive size.
    pub fn compression_ratio(&self) -> f64 {
        if self.file_size_bytes == 0 {
            return 0.0;
        }
        self.uncompressed_bytes as f64 / self.file_size_bytes as f64
    }
}

impl std::fmt::Display for NpzStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} arrays, {} bytes ({:.1}x compression)",
            self.arrays_written,
            self.file_size_bytes,
            self.compression_ratio()
        )
    }
}

/// Configuration for [`NpzWriter`]
#[derive(Debug, Clone)]
pub struct NpzWriterConfig {
    /// Compression applied to every `.npy` entry
    pub compression: CompressionMethod,
    /// Deflate level (`None` for the library default)
    pub compression_level: Option<i64>,
}

impl Default for NpzWriterConfig {
    fn default() -> Self {
        Self {
            compression: CompressionMethod::Deflated,
            compression_level: None,
        }
    }
}

/// Writes named arrays into a `.npz` archive in one atomic step.
///
/// Entries are named `<key>.npy` and are written in the order given. Every
/// entry carries the same fixed modification time, so identical input produces
/// identical archive bytes.
///
/// The archive is assembled in a temp file next to the destination and only
/// renamed onto the destination once complete. On error the temp file is
/// removed and the destination is left untouched.
#[derive(Debug, Clone, Default)]
pub struct NpzWriter {
    config: NpzWriterConfig,
}

impl NpzWriter {
    /// Create a writer producing Deflate-compressed archives.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a writer with custom configuration.
    pub fn with_config(config: NpzWriterConfig) -> Self {
        Self { config }
    }

    fn entry_options(&self, entry_size: u64) -> SimpleFileOptions {
        SimpleFileOptions::default()
            .compression_method(self.config.compression)
            .compression_level(self.config.compression_level)
            .last_modified_time(DateTime::default())
            .unix_permissions(0o644)
            .large_file(entry_size >= u32::MAX as u64)
    }

    /// Write `arrays` to `path`.
    ///
    /// The parent directory must already exist.
    pub fn write<'a, P, I>(&self, path: P, arrays: I) -> Result<NpzStats, NpzError>
    where
        P: AsRef<Path>,
        I: IntoIterator<Item = (&'a str, &'a NumericArray)>,
    {
        let path = path.as_ref();
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut temp_file = NamedTempFile::new_in(parent)?;
        let mut arrays_written = 0usize;
        let mut uncompressed_bytes = 0u64;

        {
            let mut zip_writer = ZipWriter::new(BufWriter::new(temp_file.as_file_mut()));
            for (key, array) in arrays {
                if key.is_empty() || key.contains('/') || key.contains('\\') {
                    return Err(NpzError::InvalidKey(key.to_string()));
                }
                let entry_size = encode_header(array).len() as u64
                    + (array.len() * array.element_type().size()) as u64;

                zip_writer.start_file(format!("{}.npy", key), self.entry_options(entry_size))?;
                write_npy(&mut zip_writer, array)?;

                debug!("Wrote {}.npy ({} bytes uncompressed)", key, entry_size);
                arrays_written += 1;
                uncompressed_bytes += entry_size;
            }

            let mut buf_writer = zip_writer.finish()?;
            buf_writer.flush()?;
        }
        temp_file.as_file().sync_all()?;

        temp_file.persist(path).map_err(|e| NpzError::IoError(e.error))?;
        let file_size_bytes = fs::metadata(path)?.len();

        Ok(NpzStats {
            path: path.to_path_buf(),
            arrays_written,
            uncompressed_bytes,
            file_size_bytes,
        })
    }
}
