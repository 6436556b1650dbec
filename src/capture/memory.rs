use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use crate::array::NumericArray;

use super::{CaptureBackend, CaptureError, CaptureSource};

/// A capture container held entirely in memory.
#[derive(Clone, Debug, Default)]
pub struct MemoryCapture {
    datasets: BTreeMap<String, NumericArray>,
}

impl MemoryCapture {
    /// Create an empty capture.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a dataset, builder style.
    pub fn with_dataset(mut self, name: impl Into<String>, array: NumericArray) -> Self {
        self.insert(name, array);
        self
    }

    /// Add (or replace) a dataset.
    pub fn insert(&mut self, name: impl Into<String>, array: NumericArray) {
        self.datasets.insert(name.into(), array);
    }
}

impl CaptureSource for MemoryCapture {
    fn dataset_names(&self) -> Result<Vec<String>, CaptureError> {
        Ok(self.datasets.keys().cloned().collect())
    }

    fn read_dataset(&self, name: &str) -> Result<NumericArray, CaptureError> {
        self.datasets
            .get(name)
            .cloned()
            .ok_or_else(|| CaptureError::MissingDataset(name.to_string()))
    }
}

/// Serves [`MemoryCapture`]s registered under file paths.
///
/// Opening an unregistered path fails with [`CaptureError::NotFound`], which
/// stands in for an unreadable file.
#[derive(Clone, Debug, Default)]
pub struct MemoryBackend {
    captures: HashMap<PathBuf, MemoryCapture>,
}

impl MemoryBackend {
    /// Create a backend with no registered captures.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `capture` under `path`.
    pub fn register(&mut self, path: impl Into<PathBuf>, capture: MemoryCapture) {
        self.captures.insert(path.into(), capture);
    }

    /// Register `capture` under `path`, builder style.
    pub fn with_capture(mut self, path: impl Into<PathBuf>, capture: MemoryCapture) -> Self {
        self.register(path, capture);
        self
    }
}

impl CaptureBackend for MemoryBackend {
    fn open(&self, path: &Path) -> Result<Box<dyn CaptureSource>, CaptureError> {
        let capture = self
            .captures
            .get(path)
            .cloned()
            .ok_or_else(|| CaptureError::NotFound(path.to_path_buf()))?;
        Ok(Box::new(capture))
    }
}
