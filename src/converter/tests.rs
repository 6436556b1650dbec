use super::*;
use crate::array::ArrayData;
use crate::capture::{CaptureError, MemoryBackend, MemoryCapture};
use crate::npz::NpzArchive;
use std::fs;
use tempfile::tempdir;

fn waveform(len: usize, offset: i16) -> NumericArray {
    NumericArray::from_vec((0..len).map(|i| (i as i16).wrapping_add(offset)).collect::<Vec<_>>())
}

fn image(value: u16) -> NumericArray {
    NumericArray::new(vec![4, 3], vec![value; 12]).unwrap()
}

fn gage_capture() -> MemoryCapture {
    MemoryCapture::new()
        .with_dataset("CH1_frame0", waveform(1000, 0))
        .with_dataset("CH3_frame0", waveform(1000, 500))
        .with_dataset("metadata", NumericArray::from_vec(vec![1u8]))
}

fn converter(backend: MemoryBackend, dir: &Path) -> FileConverter {
    FileConverter::with_backend(ConverterConfig::default(), backend).with_working_dir(dir)
}

#[test]
fn test_gagescope_conversion() {
    let dir = tempdir().unwrap();
    let backend = MemoryBackend::new().with_capture("gage_shot_0001.h5", gage_capture());
    let converter = converter(backend, dir.path());

    let output = converter.convert("gage_shot_0001.h5").unwrap();
    assert_eq!(
        output,
        dir.path().join("processed_files").join("processed_gage_shot_0001.npz")
    );

    let mut archive = NpzArchive::open(&output).unwrap();
    assert_eq!(archive.keys(), vec!["timestamps", "CH1_frame0", "CH3_frame0"]);
    assert_eq!(archive.read_array("CH1_frame0").unwrap(), waveform(1000, 0));
    assert_eq!(archive.read_array("CH3_frame0").unwrap(), waveform(1000, 500));

    let timestamps = archive.read_array("timestamps").unwrap();
    assert_eq!(timestamps.shape(), &[1000]);
    match timestamps.data() {
        ArrayData::F64(values) => {
            for (i, t) in values.iter().enumerate() {
                assert!((t - i as f64 / 1e8).abs() < 1e-18, "timestamp {}", i);
            }
        }
        other => panic!("unexpected timestamp type {:?}", other.element_type()),
    }
}

#[test]
fn test_custom_sampling_frequency() {
    let dir = tempdir().unwrap();
    let capture = MemoryCapture::new().with_dataset("CH1_frame0", waveform(4, 0));
    let backend = MemoryBackend::new().with_capture("gage_shot_2.h5", capture);
    let config = ConverterConfig {
        sampling_frequency: 200e6,
    };
    let converter = FileConverter::with_backend(config, backend).with_working_dir(dir.path());

    let output = converter.try_convert("gage_shot_2.h5").unwrap();
    let mut archive = NpzArchive::open(output).unwrap();
    assert_eq!(
        archive.read_array("timestamps").unwrap(),
        NumericArray::from_vec(vec![0.0, 5e-9, 2.0 * 5e-9, 3.0 * 5e-9])
    );
}

#[test]
fn test_invalid_sampling_frequency() {
    let dir = tempdir().unwrap();
    let backend = MemoryBackend::new().with_capture("gage_shot_3.h5", gage_capture());
    let config = ConverterConfig {
        sampling_frequency: 0.0,
    };
    let converter = FileConverter::with_backend(config, backend).with_working_dir(dir.path());

    let err = converter.try_convert("gage_shot_3.h5").unwrap_err();
    assert!(matches!(err, ConvertError::InvalidSamplingFrequency(f) if f == 0.0));
    assert!(!err.is_expected());
    assert!(!converter.output_dir().exists());
}

#[test]
fn test_jkam_conversion() {
    let dir = tempdir().unwrap();
    let capture = MemoryCapture::new()
        .with_dataset("frame-02", image(2))
        .with_dataset("frame-03", image(3))
        .with_dataset("exposure", NumericArray::from_vec(vec![0.01f64]));
    let backend = MemoryBackend::new().with_capture("jkam_capture_20240101.h5", capture);
    let converter = converter(backend, dir.path());

    let output = converter.convert("jkam_capture_20240101.h5").unwrap();
    assert_eq!(
        output.file_name().unwrap(),
        "processed_jkam_capture_20240101.npz"
    );

    let mut archive = NpzArchive::open(&output).unwrap();
    assert_eq!(archive.keys(), vec!["timestamps", "frame_02", "frame_03"]);
    assert_eq!(archive.read_array("frame_02").unwrap(), image(2));
    assert_eq!(archive.read_array("frame_03").unwrap(), image(3));
    assert_eq!(
        archive.read_array("timestamps").unwrap(),
        NumericArray::from_vec(vec![0.0f64])
    );
}

#[test]
fn test_unrecognized_filename() {
    let dir = tempdir().unwrap();
    let backend = MemoryBackend::new().with_capture("picolog_0001.h5", gage_capture());
    let converter = converter(backend, dir.path());

    assert!(converter.convert("picolog_0001.h5").is_none());
    let err = converter.try_convert("picolog_0001.h5").unwrap_err();
    assert!(matches!(err, ConvertError::UnrecognizedPattern { ref file } if file == "picolog_0001.h5"));
    assert!(err.is_expected());
    assert!(!converter.output_dir().exists());
}

#[test]
fn test_gagescope_without_channels() {
    let dir = tempdir().unwrap();
    let capture = MemoryCapture::new()
        .with_dataset("frame-01", image(1))
        .with_dataset("ch1_frame0", waveform(10, 0));
    let backend = MemoryBackend::new().with_capture("gage_shot_9.h5", capture);
    let converter = converter(backend, dir.path());

    let err = converter.try_convert("gage_shot_9.h5").unwrap_err();
    assert!(matches!(
        err,
        ConvertError::NoMatchingDatasets { profile: DeviceProfile::Gagescope, prefix: "CH", .. }
    ));
    assert!(converter.convert("gage_shot_9.h5").is_none());
    assert!(!converter.output_path_for(Path::new("gage_shot_9.h5")).exists());
}

#[test]
fn test_jkam_without_frames() {
    let dir = tempdir().unwrap();
    let capture = MemoryCapture::new().with_dataset("CH1_frame0", waveform(10, 0));
    let backend = MemoryBackend::new().with_capture("jkam_capture_1.h5", capture);
    let converter = converter(backend, dir.path());

    let err = converter.try_convert("jkam_capture_1.h5").unwrap_err();
    assert!(matches!(
        err,
        ConvertError::NoMatchingDatasets { profile: DeviceProfile::Jkam, .. }
    ));
}

#[test]
fn test_scalar_channel_has_no_sample_count() {
    let dir = tempdir().unwrap();
    let capture = MemoryCapture::new()
        .with_dataset("CH1_frame0", NumericArray::new(vec![], vec![7i16]).unwrap());
    let backend = MemoryBackend::new().with_capture("gage_shot_4.h5", capture);
    let converter = converter(backend, dir.path());

    let err = converter.try_convert("gage_shot_4.h5").unwrap_err();
    assert!(matches!(err, ConvertError::UndeterminedSampleCount { .. }));
    assert!(err.is_expected());
}

#[test]
fn test_mismatched_channel_lengths() {
    let dir = tempdir().unwrap();
    let capture = MemoryCapture::new()
        .with_dataset("CH1_frame0", waveform(1000, 0))
        .with_dataset("CH3_frame0", waveform(999, 0));
    let backend = MemoryBackend::new().with_capture("gage_shot_5.h5", capture);
    let converter = converter(backend, dir.path());

    let err = converter.try_convert("gage_shot_5.h5").unwrap_err();
    match err {
        ConvertError::InconsistentSampleCount {
            dataset,
            expected,
            found,
            ..
        } => {
            assert_eq!(dataset, "CH3_frame0");
            assert_eq!(expected, 1000);
            assert_eq!(found, 999);
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_two_dimensional_channels_use_first_extent() {
    let dir = tempdir().unwrap();
    let capture = MemoryCapture::new()
        .with_dataset("CH1_frame0", NumericArray::new(vec![5, 2], vec![0i16; 10]).unwrap());
    let backend = MemoryBackend::new().with_capture("gage_shot_6.h5", capture);
    let converter = converter(backend, dir.path());

    let output = converter.try_convert("gage_shot_6.h5").unwrap();
    let mut archive = NpzArchive::open(output).unwrap();
    assert_eq!(archive.read_array("timestamps").unwrap().shape(), &[5]);
}

#[test]
fn test_duplicate_normalized_keys() {
    let dir = tempdir().unwrap();
    let capture = MemoryCapture::new()
        .with_dataset("frame-0-2", image(1))
        .with_dataset("frame-0_2", image(2));
    let backend = MemoryBackend::new().with_capture("jkam_capture_7.h5", capture);
    let converter = converter(backend, dir.path());

    let err = converter.try_convert("jkam_capture_7.h5").unwrap_err();
    assert!(matches!(err, ConvertError::DuplicateKey { ref key, .. } if key == "frame_0_2"));
}

#[test]
fn test_reserved_key_rejected() {
    let err = archive_key(DeviceProfile::Gagescope, "timestamps", "gage_shot_1.h5").unwrap_err();
    assert!(matches!(err, ConvertError::ReservedKeyCollision { ref dataset, .. } if dataset == "timestamps"));
    assert_eq!(
        archive_key(DeviceProfile::Jkam, "frame-10", "jkam_capture_1.h5").unwrap(),
        "frame_10"
    );
}

#[test]
fn test_unreadable_capture() {
    let dir = tempdir().unwrap();
    let converter = converter(MemoryBackend::new(), dir.path());

    let err = converter.try_convert("gage_shot_missing.h5").unwrap_err();
    assert!(matches!(err, ConvertError::CaptureError(CaptureError::NotFound(_))));
    assert!(!err.is_expected());
    assert!(converter.convert("gage_shot_missing.h5").is_none());
    assert!(!converter.output_dir().exists());
}

#[test]
fn test_ambiguous_filename_converts_as_gagescope() {
    let dir = tempdir().unwrap();
    let backend =
        MemoryBackend::new().with_capture("gage_shot_1_jkam_capture_1.h5", gage_capture());
    let converter = converter(backend, dir.path());

    let output = converter.try_convert("gage_shot_1_jkam_capture_1.h5").unwrap();
    let archive = NpzArchive::open(output).unwrap();
    assert!(archive.contains("CH1_frame0"));
}

#[test]
fn test_reconversion_is_identical() {
    let dir = tempdir().unwrap();
    let backend = MemoryBackend::new().with_capture("gage_shot_8.h5", gage_capture());
    let converter = converter(backend, dir.path());

    let output = converter.try_convert("gage_shot_8.h5").unwrap();
    let first = fs::read(&output).unwrap();
    let again = converter.try_convert("gage_shot_8.h5").unwrap();
    assert_eq!(output, again);
    assert_eq!(first, fs::read(&again).unwrap());
}

#[test]
fn test_existing_output_dir_is_reused() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join(OUTPUT_DIR_NAME)).unwrap();
    let backend = MemoryBackend::new().with_capture("gage_shot_10.h5", gage_capture());
    let converter = converter(backend, dir.path());

    assert!(converter.convert("gage_shot_10.h5").is_some());
}

#[test]
fn test_output_dir_is_relative_by_default() {
    let converter = FileConverter::with_backend(ConverterConfig::default(), MemoryBackend::new());
    assert_eq!(
        converter.output_path_for(Path::new("/data/run1/gage_shot_0001.h5")),
        PathBuf::from("processed_files/processed_gage_shot_0001.npz")
    );
}

#[test]
fn test_convert_all_counts_outcomes() {
    let dir = tempdir().unwrap();
    let backend = MemoryBackend::new()
        .with_capture("gage_shot_1.h5", gage_capture())
        .with_capture("jkam_capture_1.h5", MemoryCapture::new().with_dataset("frame-01", image(1)))
        .with_capture("notes.h5", MemoryCapture::new());
    let converter = converter(backend, dir.path());

    let summary = converter.convert_all([
        "gage_shot_1.h5",
        "notes.h5",
        "jkam_capture_1.h5",
        "gage_shot_missing.h5",
    ]);
    assert_eq!(summary.converted.len(), 2);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.total(), 4);
    assert_eq!(summary.to_string(), "2 converted, 1 skipped, 1 failed");
}

#[test]
fn test_output_dir_blocked_by_file() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("processed_files"), b"").unwrap();
    let backend = MemoryBackend::new().with_capture("gage_shot_1.h5", gage_capture());
    let converter = converter(backend, dir.path());

    assert!(converter.convert("gage_shot_1.h5").is_none());
    let err = converter.try_convert("gage_shot_1.h5").unwrap_err();
    assert!(matches!(err, ConvertError::IoError(_)));
    assert!(!err.is_expected());

    let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(entries.len(), 1);
    assert!(converter.output_dir().is_file());
}

#[test]
fn test_output_path_is_directory() {
    let dir = tempdir().unwrap();
    let backend = MemoryBackend::new().with_capture("gage_shot_1.h5", gage_capture());
    let converter = converter(backend, dir.path());
    let blocked = converter.output_path_for(Path::new("gage_shot_1.h5"));
    fs::create_dir_all(&blocked).unwrap();

    assert!(converter.convert("gage_shot_1.h5").is_none());
    let err = converter.try_convert("gage_shot_1.h5").unwrap_err();
    assert!(matches!(err, ConvertError::ArchiveError(_)));
    assert!(!err.is_expected());

    // Only the blocking directory remains; the temporary archive is gone.
    let entries: Vec<PathBuf> = fs::read_dir(converter.output_dir())
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(entries, vec![blocked.clone()]);
    assert!(blocked.is_dir());
}

#[test]
fn test_process_evaluates_gagescope_archive() {
    let dir = tempdir().unwrap();
    let backend = MemoryBackend::new().with_capture("gage_shot_1.h5", gage_capture());
    let converter = converter(backend, dir.path());

    let evaluated = converter.process("gage_shot_1.h5").unwrap();
    assert_eq!(evaluated.profile, DeviceProfile::Gagescope);
    assert!(evaluated.accepted());
    let report = evaluated.report.as_ref().unwrap();
    assert_eq!(report.num_shots, 1000);
    assert_eq!(report.num_space_correct, 1000);

    let spectrum = evaluated.spectrum.as_ref().unwrap();
    assert!(!spectrum.is_empty());
    assert!((spectrum.sampling_interval - 1e-8).abs() < 1e-18);

    assert!(converter.process("notes.h5").is_none());
}

#[test]
fn test_convert_all_with_evaluation_tracks_streak() {
    let dir = tempdir().unwrap();
    let backend = MemoryBackend::new()
        .with_capture("gage_shot_1.h5", gage_capture())
        .with_capture("jkam_capture_1.h5", MemoryCapture::new().with_dataset("frame-01", image(1)))
        .with_capture("gage_shot_2.h5", gage_capture());
    let converter = converter(backend, dir.path()).with_evaluation(EvaluationConfig::default());
    assert!(converter.evaluation().is_some());

    let summary = converter.convert_all(["gage_shot_1.h5", "jkam_capture_1.h5", "gage_shot_2.h5"]);
    assert_eq!(summary.converted.len(), 3);
    assert_eq!(summary.evaluated.len(), 3);

    // The single placeholder timestamp cannot be evaluated, so JKAM is rejected.
    let jkam = &summary.evaluated[1];
    assert_eq!(jkam.profile, DeviceProfile::Jkam);
    assert!(jkam.report.is_none());
    assert!(jkam.spectrum.is_none());
    assert!(!jkam.accepted());

    assert!(summary.evaluated[0].accepted());
    assert!(summary.evaluated[2].accepted());
    assert_eq!(summary.acceptance.processed, 3);
    assert_eq!(summary.acceptance.accepted, 2);
    assert_eq!(summary.acceptance.streak, 1);
    assert_eq!(
        summary.to_string(),
        "3 converted, 0 skipped, 0 failed; 2 of 3 accepted, streak 1"
    );
}

#[test]
fn test_convert_all_without_evaluation_records_nothing() {
    let dir = tempdir().unwrap();
    let backend = MemoryBackend::new().with_capture("gage_shot_1.h5", gage_capture());
    let converter = converter(backend, dir.path());

    let summary = converter.convert_all(["gage_shot_1.h5"]);
    assert!(summary.evaluated.is_empty());
    assert_eq!(summary.acceptance, AcceptanceTracker::default());
}
