//! Device profiles.
//!
//! The acquisition devices share one container format and are told apart by
//! a token in the capture filename. Each [`DeviceProfile`] declares that token,
//! the prefix that selects its datasets, how a dataset name becomes an archive
//! key, and how its time axis is built.
//!
//! | Profile | Filename token | Dataset prefix | Archive key | Time axis |
//! |---------|----------------|----------------|-------------|-----------|
//! | gagescope | `gage_shot_` | `CH` | unchanged | sample clock |
//! | JKAM (High NA) | `jkam_capture_` | `frame-` | `-` → `_` | `[0.0]` |

use std::fmt;

/// Archive key reserved for the time axis.
pub const TIMESTAMPS_KEY: &str = "timestamps";

/// Default gagescope digitizer rate (100 MHz).
pub const DEFAULT_SAMPLING_FREQUENCY: f64 = 1.0e8;

/// How a profile builds its time axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeAxisStrategy {
    /// `i / sampling_frequency` for every sample index of the channel frames
    SampleClock,
    /// A single `0.0`; the device records no per-frame timing
    Placeholder,
}

/// A recognized acquisition device family.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DeviceProfile {
    /// Digitizer recording `CH<n>_frame<m>` waveforms
    Gagescope,
    /// High-NA imaging camera recording `frame-<nn>` images
    Jkam,
}

/// Outcome of matching a filename against every profile.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProfileMatch {
    /// No profile token in the filename
    Unrecognized,
    /// Exactly one profile matched
    Unique(DeviceProfile),
    /// Several tokens present; `chosen` is first in [`DeviceProfile::ALL`]
    Ambiguous {
        /// Profile used for the conversion
        chosen: DeviceProfile,
        /// Every matching profile, in precedence order
        candidates: Vec<DeviceProfile>,
    },
}

impl ProfileMatch {
    /// Profile to convert with, if any.
    pub fn profile(&self) -> Option<DeviceProfile> {
        match self {
            ProfileMatch::Unrecognized => None,
            ProfileMatch::Unique(profile) => Some(*profile),
            ProfileMatch::Ambiguous { chosen, .. } => Some(*chosen),
        }
    }
}

impl DeviceProfile {
    /// Every profile, in match precedence order.
    pub const ALL: [DeviceProfile; 2] = [DeviceProfile::Gagescope, DeviceProfile::Jkam];

    /// Filename substring that selects this profile.
    pub fn filename_token(&self) -> &'static str {
        match self {
            DeviceProfile::Gagescope => "gage_shot_",
            DeviceProfile::Jkam => "jkam_capture_",
        }
    }

    /// Prefix of the top-level datasets this profile extracts.
    pub fn dataset_prefix(&self) -> &'static str {
        match self {
            DeviceProfile::Gagescope => "CH",
            DeviceProfile::Jkam => "frame-",
        }
    }

    /// Human-readable device name used in log messages.
    pub fn label(&self) -> &'static str {
        match self {
            DeviceProfile::Gagescope => "gagescope",
            DeviceProfile::Jkam => "JKAM (High NA)",
        }
    }

    /// Time-axis construction for this profile.
    pub fn time_axis(&self) -> TimeAxisStrategy {
        match self {
            DeviceProfile::Gagescope => TimeAxisStrategy::SampleClock,
            DeviceProfile::Jkam => TimeAxisStrategy::Placeholder,
        }
    }

    /// Whether `filename` carries this profile's token.
    pub fn matches_filename(&self, filename: &str) -> bool {
        filename.contains(self.filename_token())
    }

    /// Whether the dataset `name` is extracted by this profile.
    pub fn selects_dataset(&self, name: &str) -> bool {
        name.starts_with(self.dataset_prefix())
    }

    /// Archive key for the dataset `name`.
    pub fn output_key(&self, name: &str) -> String {
        match self {
            DeviceProfile::Gagescope => name.to_string(),
            DeviceProfile::Jkam => name.replace('-', "_"),
        }
    }

    /// Match `filename` against every profile.
    pub fn detect(filename: &str) -> ProfileMatch {
        let candidates: Vec<DeviceProfile> = Self::ALL
            .iter()
            .copied()
            .filter(|profile| profile.matches_filename(filename))
            .collect();

        match candidates.as_slice() {
            [] => ProfileMatch::Unrecognized,
            [only] => ProfileMatch::Unique(*only),
            [first, ..] => ProfileMatch::Ambiguous {
                chosen: *first,
                candidates: candidates.clone(),
            },
        }
    }
}

impl fmt::Display for DeviceProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Time axis `i * (1 / sampling_frequency)` for `i` in `0..sample_count`.
pub fn sample_clock_axis(sample_count: usize, sampling_frequency: f64) -> Vec<f64> {
    let dt = 1.0 / sampling_frequency;
    (0..sample_count).map(|i| i as f64 * dt).collect()
}

/// Single-element placeholder axis for devices without timing data.
pub fn placeholder_axis() -> Vec<f64> {
    vec![0.0]
}
