//! # Capture File Converter
//!
//! [`FileConverter`] turns one capture file into one `.npz` archive:
//!
//! 1. The filename picks a [`DeviceProfile`] (`gage_shot_` or `jkam_capture_`).
//! 2. The profile's datasets are copied out of the container, which is closed
//!    again before anything is written.
//! 3. A time axis is built: the sample clock for gagescope channel frames, a
//!    `[0.0]` placeholder for JKAM images.
//! 4. Everything is written to `processed_files/processed_<stem>.npz`, the
//!    time axis under the reserved key `timestamps`.
//!
//! [`FileConverter::try_convert`] reports which failure occurred;
//! [`FileConverter::convert`] logs it and returns `None`, never panicking or
//! propagating an error.
//!
//! With [`FileConverter::with_evaluation`] every written archive is also run
//! through the timestamp acceptance check, and gagescope archives get a
//! timestamp spectrum. [`BatchSummary::acceptance`] tracks the accepted count
//! and the current run of consecutive accepted files.
//!
//! ## Usage
//!
//! ```rust,no_run
//! # #[cfg(feature = "hdf5")]
//! # {
//! use capture_npz::converter::FileConverter;
//!
//! let converter = FileConverter::new();
//! if let Some(output) = converter.convert("gage_shot_0001.h5") {
//!     println!("wrote {}", output.display());
//! }
//! # }
//! ```
//!
//! Conversions write into a shared output directory without coordination, so
//! files are converted one at a time, including in [`FileConverter::convert_all`].

mod error;

#[cfg(test)]
mod tests;

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, error, info, warn};

use crate::array::NumericArray;
#[cfg(feature = "hdf5")]
use crate::capture::Hdf5Backend;
use crate::capture::{CaptureBackend, CaptureSource};
use crate::evaluate::{
    evaluate_archive, timestamp_spectrum, AcceptanceTracker, EvaluateError, EvaluationConfig,
    EvaluationReport, Spectrum,
};
use crate::npz::{NpzArchive, NpzWriter};
use crate::profile::{
    placeholder_axis, sample_clock_axis, DeviceProfile, ProfileMatch, TimeAxisStrategy,
    DEFAULT_SAMPLING_FREQUENCY, TIMESTAMPS_KEY,
};

pub use error::ConvertError;

/// Output directory, relative to the working directory.
pub const OUTPUT_DIR_NAME: &str = "processed_files";

/// Prefix of every archive filename.
pub const OUTPUT_FILE_PREFIX: &str = "processed_";

/// Converter settings.
#[derive(Debug, Clone)]
pub struct ConverterConfig {
    /// Gagescope digitizer rate in Hz. Applied to every gagescope capture;
    /// rate attributes stored in the capture file are not consulted.
    pub sampling_frequency: f64,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            sampling_frequency: DEFAULT_SAMPLING_FREQUENCY,
        }
    }
}

impl ConverterConfig {
    /// Check that the sampling frequency is positive and finite.
    pub fn validate(&self) -> Result<(), ConvertError> {
        if self.sampling_frequency.is_finite() && self.sampling_frequency > 0.0 {
            Ok(())
        } else {
            Err(ConvertError::InvalidSamplingFrequency(self.sampling_frequency))
        }
    }
}

/// One dataset copied out of a capture file.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedDataset {
    /// Dataset name inside the capture file
    pub source_name: String,
    /// Key under which the array is archived
    pub key: String,
    /// Array contents
    pub array: NumericArray,
}

/// A written archive together with its post-conversion checks.
#[derive(Debug, Clone)]
pub struct EvaluatedArchive {
    /// Archive path
    pub output: PathBuf,
    /// Profile the capture was converted with
    pub profile: DeviceProfile,
    /// Acceptance report, `None` when the archive could not be evaluated
    pub report: Option<EvaluationReport>,
    /// Timestamp spectrum, gagescope archives only
    pub spectrum: Option<Spectrum>,
}

impl EvaluatedArchive {
    /// Whether the archive passed. Archives that could not be evaluated fail.
    pub fn accepted(&self) -> bool {
        self.report.as_ref().is_some_and(|r| r.accepted)
    }
}

/// Outcome counts of a batch conversion.
#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    /// Archives written, in input order
    pub converted: Vec<PathBuf>,
    /// Inputs skipped for an anticipated reason (unknown pattern, no datasets, ...)
    pub skipped: usize,
    /// Inputs that failed unexpectedly
    pub failed: usize,
    /// Post-conversion checks, in input order; empty unless evaluation is enabled
    pub evaluated: Vec<EvaluatedArchive>,
    /// Acceptance counters over `evaluated`
    pub acceptance: AcceptanceTracker,
}

impl BatchSummary {
    /// Number of inputs processed.
    pub fn total(&self) -> usize {
        self.converted.len() + self.skipped + self.failed
    }
}

impl std::fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} converted, {} skipped, {} failed",
            self.converted.len(),
            self.skipped,
            self.failed
        )?;
        if self.acceptance.processed > 0 {
            write!(f, "; {}", self.acceptance)?;
        }
        Ok(())
    }
}

/// Converts capture files into `.npz` archives.
pub struct FileConverter {
    config: ConverterConfig,
    backend: Box<dyn CaptureBackend>,
    working_dir: PathBuf,
    writer: NpzWriter,
    evaluation: Option<EvaluationConfig>,
}

#[cfg(feature = "hdf5")]
impl Default for FileConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl FileConverter {
    /// HDF5 converter with default settings.
    #[cfg(feature = "hdf5")]
    pub fn new() -> Self {
        Self::with_config(ConverterConfig::default())
    }

    /// HDF5 converter with custom settings.
    #[cfg(feature = "hdf5")]
    pub fn with_config(config: ConverterConfig) -> Self {
        Self::with_backend(config, Hdf5Backend)
    }

    /// Converter reading captures through `backend`.
    pub fn with_backend<B: CaptureBackend + 'static>(config: ConverterConfig, backend: B) -> Self {
        Self {
            config,
            backend: Box::new(backend),
            working_dir: PathBuf::new(),
            writer: NpzWriter::new(),
            evaluation: None,
        }
    }

    /// Resolve the output directory against `dir` instead of the process
    /// working directory.
    pub fn with_working_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.working_dir = dir.into();
        self
    }

    /// Evaluate every archive [`FileConverter::convert_all`] writes.
    pub fn with_evaluation(mut self, config: EvaluationConfig) -> Self {
        self.evaluation = Some(config);
        self
    }

    /// Converter settings.
    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// Acceptance thresholds, if post-conversion evaluation is enabled.
    pub fn evaluation(&self) -> Option<&EvaluationConfig> {
        self.evaluation.as_ref()
    }

    /// Directory archives are written to.
    pub fn output_dir(&self) -> PathBuf {
        self.working_dir.join(OUTPUT_DIR_NAME)
    }

    /// Archive path for the capture at `input`.
    pub fn output_path_for(&self, input: &Path) -> PathBuf {
        let stem = input.file_stem().unwrap_or_default().to_string_lossy();
        self.output_dir()
            .join(format!("{}{}.npz", OUTPUT_FILE_PREFIX, stem))
    }

    /// Convert one capture file, logging any failure.
    ///
    /// Returns the archive path on success and `None` otherwise. Anticipated
    /// outcomes (see [`ConvertError::is_expected`]) are logged as warnings,
    /// everything else as an error naming the file.
    pub fn convert<P: AsRef<Path>>(&self, path: P) -> Option<PathBuf> {
        let path = path.as_ref();
        match self.try_convert(path) {
            Ok(output) => Some(output),
            Err(e) => {
                log_failure(path, &e);
                None
            }
        }
    }

    /// Convert one capture file, returning the failure kind on error.
    ///
    /// No archive is created or replaced unless the whole conversion succeeds.
    pub fn try_convert<P: AsRef<Path>>(&self, path: P) -> Result<PathBuf, ConvertError> {
        self.convert_file(path.as_ref()).map(|(_, output)| output)
    }

    /// Convert one capture file and check the archive it produces.
    ///
    /// Uses the configured acceptance thresholds, or the defaults when
    /// evaluation was not enabled. Returns `None` if the conversion failed.
    pub fn process<P: AsRef<Path>>(&self, path: P) -> Option<EvaluatedArchive> {
        let path = path.as_ref();
        match self.convert_file(path) {
            Ok((profile, output)) => {
                let config = self.evaluation.clone().unwrap_or_default();
                Some(evaluate_output(profile, output, &config))
            }
            Err(e) => {
                log_failure(path, &e);
                None
            }
        }
    }

    fn convert_file(&self, path: &Path) -> Result<(DeviceProfile, PathBuf), ConvertError> {
        let filename = display_name(path);

        let profile = match DeviceProfile::detect(&filename) {
            ProfileMatch::Unrecognized => {
                return Err(ConvertError::UnrecognizedPattern { file: filename })
            }
            ProfileMatch::Unique(profile) => profile,
            ProfileMatch::Ambiguous { chosen, candidates } => {
                let names: Vec<&str> = candidates.iter().map(|p| p.filename_token()).collect();
                warn!(
                    "{} matches several device patterns ({}); converting as {}",
                    filename,
                    names.join(", "),
                    chosen
                );
                chosen
            }
        };
        debug!("{}: detected {} capture", filename, profile);

        // The container is closed at the end of this block, before any output exists.
        let extracted = {
            let source = self.backend.open(path)?;
            extract_datasets(profile, source.as_ref(), &filename)?
        };

        let timestamps = match profile.time_axis() {
            TimeAxisStrategy::SampleClock => {
                self.config.validate()?;
                let sample_count = sample_count(&filename, &extracted)?;
                sample_clock_axis(sample_count, self.config.sampling_frequency)
            }
            TimeAxisStrategy::Placeholder => placeholder_axis(),
        };
        let timestamps = NumericArray::from_vec(timestamps);

        let output_dir = self.output_dir();
        fs::create_dir_all(&output_dir)?;
        let output_path = self.output_path_for(path);

        let arrays = std::iter::once((TIMESTAMPS_KEY, &timestamps))
            .chain(extracted.iter().map(|d| (d.key.as_str(), &d.array)));
        let stats = self.writer.write(&output_path, arrays)?;

        info!(
            "Processed {} file {} saved as {}",
            profile,
            filename,
            display_name(&output_path)
        );
        debug!("{}: {}", output_path.display(), stats);
        Ok((profile, output_path))
    }

    /// Convert `paths` one after another.
    pub fn convert_all<I, P>(&self, paths: I) -> BatchSummary
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut summary = BatchSummary::default();
        for path in paths {
            let path = path.as_ref();
            match self.convert_file(path) {
                Ok((profile, output)) => {
                    if let Some(config) = &self.evaluation {
                        let evaluated = evaluate_output(profile, output.clone(), config);
                        summary.acceptance.record(evaluated.accepted());
                        summary.evaluated.push(evaluated);
                    }
                    summary.converted.push(output);
                }
                Err(e) => {
                    log_failure(path, &e);
                    if e.is_expected() {
                        summary.skipped += 1;
                    } else {
                        summary.failed += 1;
                    }
                }
            }
        }
        info!("Batch conversion finished: {}", summary);
        summary
    }
}

/// Run the acceptance check on `output`, plus the spectrum for gagescope archives.
///
/// Failures are logged and leave the corresponding field empty.
pub fn evaluate_output(
    profile: DeviceProfile,
    output: PathBuf,
    config: &EvaluationConfig,
) -> EvaluatedArchive {
    let name = display_name(&output);
    let report = match evaluate_archive(&output, config) {
        Ok(report) => Some(report),
        Err(e) => {
            error!("Could not evaluate {}: {}", name, e);
            None
        }
    };

    let spectrum = match profile {
        DeviceProfile::Gagescope => match archive_spectrum(&output) {
            Ok(spectrum) => {
                debug!("{}: {} spectrum bins", name, spectrum.len());
                Some(spectrum)
            }
            Err(e) => {
                warn!("No spectrum for {}: {}", name, e);
                None
            }
        },
        DeviceProfile::Jkam => None,
    };

    EvaluatedArchive {
        output,
        profile,
        report,
        spectrum,
    }
}

fn archive_spectrum(path: &Path) -> Result<Spectrum, EvaluateError> {
    let mut archive = NpzArchive::open(path)?;
    let timestamps = archive.read_array(TIMESTAMPS_KEY)?.data().to_f64_vec();
    timestamp_spectrum(&timestamps)
}

/// Copy every dataset `profile` selects out of `source`, sorted by dataset name.
pub fn extract_datasets(
    profile: DeviceProfile,
    source: &dyn CaptureSource,
    file: &str,
) -> Result<Vec<ExtractedDataset>, ConvertError> {
    let mut names: Vec<String> = source
        .dataset_names()?
        .into_iter()
        .filter(|name| profile.selects_dataset(name))
        .collect();
    names.sort();

    if names.is_empty() {
        return Err(ConvertError::NoMatchingDatasets {
            file: file.to_string(),
            profile,
            prefix: profile.dataset_prefix(),
        });
    }

    let mut extracted: Vec<ExtractedDataset> = Vec::with_capacity(names.len());
    for name in names {
        let key = archive_key(profile, &name, file)?;
        if extracted.iter().any(|d| d.key == key) {
            return Err(ConvertError::DuplicateKey {
                file: file.to_string(),
                key,
            });
        }
        let array = source.read_dataset(&name)?;
        debug!("{}: {} -> {} {:?}", file, name, key, array.shape());
        extracted.push(ExtractedDataset {
            source_name: name,
            key,
            array,
        });
    }
    Ok(extracted)
}

/// Archive key for dataset `name`, rejecting the reserved time-axis key.
pub fn archive_key(profile: DeviceProfile, name: &str, file: &str) -> Result<String, ConvertError> {
    let key = profile.output_key(name);
    if key == TIMESTAMPS_KEY {
        return Err(ConvertError::ReservedKeyCollision {
            file: file.to_string(),
            dataset: name.to_string(),
        });
    }
    Ok(key)
}

/// Shared first-dimension extent of the extracted channel frames.
pub fn sample_count(file: &str, extracted: &[ExtractedDataset]) -> Result<usize, ConvertError> {
    let mut count: Option<usize> = None;
    for dataset in extracted {
        let extent = dataset
            .array
            .first_extent()
            .ok_or_else(|| ConvertError::UndeterminedSampleCount {
                file: file.to_string(),
            })?;
        match count {
            None => count = Some(extent),
            Some(expected) if expected != extent => {
                return Err(ConvertError::InconsistentSampleCount {
                    file: file.to_string(),
                    dataset: dataset.source_name.clone(),
                    expected,
                    found: extent,
                });
            }
            Some(_) => {}
        }
    }
    count.ok_or_else(|| ConvertError::UndeterminedSampleCount {
        file: file.to_string(),
    })
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn log_failure(path: &Path, e: &ConvertError) {
    if e.is_expected() {
        warn!("{}", e);
    } else {
        error!("Error processing h5 file {}: {}", display_name(path), e);
    }
}
