//! HDF5 end-to-end tests
//!
//! These tests write real HDF5 capture files and convert them through the
//! default HDF5 backend. They need the native HDF5 library.

#![cfg(feature = "hdf5")]

use capture_npz::prelude::*;
use std::path::Path;
use tempfile::tempdir;

fn write_gage_file(path: &Path, samples: usize) -> hdf5::Result<Vec<i16>> {
    let file = hdf5::File::create(path)?;
    let waveform: Vec<i16> = (0..samples).map(|i| (i as i16).wrapping_mul(7)).collect();
    for name in ["CH1_frame0", "CH3_frame0"] {
        let ds = file.new_dataset::<i16>().shape([samples]).create(name)?;
        ds.write(&waveform)?;
    }
    let meta = file.new_dataset::<f64>().shape([1]).create("sample_rate")?;
    meta.write(&[1e8f64][..])?;
    Ok(waveform)
}

fn write_jkam_file(path: &Path) -> hdf5::Result<Vec<u16>> {
    let file = hdf5::File::create(path)?;
    let pixels: Vec<u16> = (0..12).collect();
    for name in ["frame-02", "frame-03"] {
        let ds = file.new_dataset::<u16>().shape([3, 4]).create(name)?;
        ds.write_raw(&pixels)?;
    }
    Ok(pixels)
}

#[test]
fn test_gagescope_hdf5_conversion() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("gage_shot_0001.h5");
    let waveform = write_gage_file(&input, 1000).unwrap();

    let converter = FileConverter::new().with_working_dir(dir.path());
    let output = converter.try_convert(&input).unwrap();
    assert_eq!(
        output,
        dir.path().join("processed_files").join("processed_gage_shot_0001.npz")
    );

    let mut archive = NpzArchive::open(&output).unwrap();
    assert_eq!(archive.keys(), vec!["timestamps", "CH1_frame0", "CH3_frame0"]);
    assert_eq!(
        archive.read_array("CH1_frame0").unwrap(),
        NumericArray::from_vec(waveform)
    );
    let timestamps = archive.read_array("timestamps").unwrap();
    assert_eq!(timestamps.shape(), &[1000]);
    match timestamps.data() {
        ArrayData::F64(t) => assert!((t[999] - 999.0 / 1e8).abs() < 1e-18),
        other => panic!("unexpected timestamp type {:?}", other.element_type()),
    }
}

#[test]
fn test_jkam_hdf5_conversion() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("jkam_capture_0001.h5");
    let pixels = write_jkam_file(&input).unwrap();

    let converter = FileConverter::new().with_working_dir(dir.path());
    let output = converter.try_convert(&input).unwrap();

    let mut archive = NpzArchive::open(&output).unwrap();
    assert_eq!(archive.keys(), vec!["timestamps", "frame_02", "frame_03"]);
    assert_eq!(
        archive.read_array("frame_02").unwrap(),
        NumericArray::new(vec![3, 4], pixels).unwrap()
    );
    assert_eq!(
        archive.read_array("timestamps").unwrap(),
        NumericArray::from_vec(vec![0.0f64])
    );
}

#[test]
fn test_missing_hdf5_file() {
    let dir = tempdir().unwrap();
    let converter = FileConverter::new().with_working_dir(dir.path());

    let err = converter
        .try_convert(dir.path().join("gage_shot_missing.h5"))
        .unwrap_err();
    assert!(matches!(err, ConvertError::CaptureError(CaptureError::NotFound(_))));
    assert!(!err.is_expected());
}

#[test]
fn test_corrupt_hdf5_file() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("gage_shot_0002.h5");
    std::fs::write(&input, b"not an hdf5 file").unwrap();

    let converter = FileConverter::new().with_working_dir(dir.path());
    assert!(converter.convert(&input).is_none());
    assert!(!converter.output_dir().exists());
}
