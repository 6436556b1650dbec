use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use zip::ZipArchive;

use crate::array::NumericArray;

use super::npy::read_npy;
use super::NpzError;

/// Read access to a `.npz` archive.
pub struct NpzArchive {
    path: PathBuf,
    archive: ZipArchive<BufReader<File>>,
}

impl NpzArchive {
    /// Open an archive for reading.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, NpzError> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;
        let archive = ZipArchive::new(BufReader::new(file))?;
        Ok(Self { path, archive })
    }

    /// Path the archive was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Array keys in archive order (entry names without the `.npy` suffix).
    pub fn keys(&self) -> Vec<String> {
        self.archive
            .file_names()
            .filter_map(|name| name.strip_suffix(".npy"))
            .map(str::to_string)
            .collect()
    }

    /// Whether an array named `key` is present.
    pub fn contains(&self, key: &str) -> bool {
        self.archive.index_for_name(&format!("{}.npy", key)).is_some()
    }

    /// Decode the array stored under `key`.
    pub fn read_array(&mut self, key: &str) -> Result<NumericArray, NpzError> {
        let entry_name = format!("{}.npy", key);
        let mut entry = match self.archive.by_name(&entry_name) {
            Ok(entry) => entry,
            Err(zip::result::ZipError::FileNotFound) => {
                return Err(NpzError::MissingArray(key.to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        read_npy(&mut entry, key)
    }

    /// Decode every array, in archive order.
    pub fn read_all(&mut self) -> Result<Vec<(String, NumericArray)>, NpzError> {
        let keys = self.keys();
        let mut arrays = Vec::with_capacity(keys.len());
        for key in keys {
            let array = self.read_array(&key)?;
            arrays.push((key, array));
        }
        Ok(arrays)
    }
}
