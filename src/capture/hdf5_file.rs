//! HDF5 capture files.

use std::path::Path;

use hdf5::types::{FloatSize, IntSize, TypeDescriptor};
use log::debug;

use crate::array::{ArrayData, NumericArray};

use super::{CaptureBackend, CaptureError, CaptureSource};

/// An HDF5 file opened read-only. The handle is closed on drop.
pub struct Hdf5Capture {
    file: hdf5::File,
}

impl Hdf5Capture {
    /// Open an HDF5 file read-only.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, CaptureError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(CaptureError::NotFound(path.to_path_buf()));
        }
        let file = hdf5::File::open(path)?;
        Ok(Self { file })
    }
}

impl CaptureSource for Hdf5Capture {
    fn dataset_names(&self) -> Result<Vec<String>, CaptureError> {
        Ok(self.file.member_names()?)
    }

    fn read_dataset(&self, name: &str) -> Result<NumericArray, CaptureError> {
        let dataset = self.file.dataset(name)?;
        let shape = dataset.shape();
        let descriptor = dataset.dtype()?.to_descriptor()?;
        debug!("Reading dataset {} {:?} ({:?})", name, shape, descriptor);

        let data = match descriptor {
            TypeDescriptor::Boolean => ArrayData::Bool(dataset.read_raw()?),
            TypeDescriptor::Integer(IntSize::U1) => ArrayData::I8(dataset.read_raw()?),
            TypeDescriptor::Integer(IntSize::U2) => ArrayData::I16(dataset.read_raw()?),
            TypeDescriptor::Integer(IntSize::U4) => ArrayData::I32(dataset.read_raw()?),
            TypeDescriptor::Integer(IntSize::U8) => ArrayData::I64(dataset.read_raw()?),
            TypeDescriptor::Unsigned(IntSize::U1) => ArrayData::U8(dataset.read_raw()?),
            TypeDescriptor::Unsigned(IntSize::U2) => ArrayData::U16(dataset.read_raw()?),
            TypeDescriptor::Unsigned(IntSize::U4) => ArrayData::U32(dataset.read_raw()?),
            TypeDescriptor::Unsigned(IntSize::U8) => ArrayData::U64(dataset.read_raw()?),
            TypeDescriptor::Float(FloatSize::U4) => ArrayData::F32(dataset.read_raw()?),
            TypeDescriptor::Float(FloatSize::U8) => ArrayData::F64(dataset.read_raw()?),
            other => {
                return Err(CaptureError::UnsupportedType {
                    dataset: name.to_string(),
                    dtype: format!("{:?}", other),
                })
            }
        };

        Ok(NumericArray::new(shape, data)?)
    }
}

/// Opens capture paths as HDF5 files.
#[derive(Clone, Copy, Debug, Default)]
pub struct Hdf5Backend;

impl CaptureBackend for Hdf5Backend {
    fn open(&self, path: &Path) -> Result<Box<dyn CaptureSource>, CaptureError> {
        Ok(Box::new(Hdf5Capture::open(path)?))
    }
}
