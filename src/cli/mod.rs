use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[cfg(feature = "hdf5")]
mod convert;
mod evaluate;
mod info;

mod config;

pub use config::Config;

/// capture-npz - Capture File to NumPy Archive Converter
#[derive(Parser)]
#[command(name = "capture-npz")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert gagescope / JKAM capture files to processed_files/processed_<stem>.npz
    #[cfg(feature = "hdf5")]
    Convert {
        /// Capture files, or directories scanned for .h5 / .hdf5 files
        #[arg(value_name = "INPUT", required = true)]
        inputs: Vec<PathBuf>,

        /// TOML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Gagescope sampling frequency in Hz (overrides the config file)
        #[arg(long, value_name = "HZ")]
        sampling_frequency: Option<f64>,

        /// Evaluate each archive after writing it, using the [evaluation] thresholds
        #[arg(short, long)]
        evaluate: bool,
    },

    /// List the arrays stored in an .npz archive
    Info {
        /// Archive path
        #[arg(value_name = "ARCHIVE")]
        file: PathBuf,
    },

    /// Check the spacing of an archive's timestamps
    Evaluate {
        /// Archive path
        #[arg(value_name = "ARCHIVE")]
        file: PathBuf,

        /// TOML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Allowed gap deviation as a fraction of the average gap
        #[arg(long, value_name = "RATIO")]
        deviation_threshold: Option<f64>,

        /// Minimum percentage of space-correct shots
        #[arg(long, value_name = "PERCENT")]
        acceptance_threshold: Option<f64>,
    },
}

pub fn init_logging(verbosity: u8) {
    let log_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

fn load_config(path: Option<PathBuf>) -> Result<Config> {
    match path {
        Some(path) => Config::from_file(&path),
        None => Ok(Config::default()),
    }
}

pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        #[cfg(feature = "hdf5")]
        Commands::Convert {
            inputs,
            config,
            sampling_frequency,
            evaluate,
        } => {
            let config = load_config(config)?;
            let evaluation = evaluate.then(|| config.evaluation_config(None, None));
            convert::run(inputs, config.converter_config(sampling_frequency), evaluation)
        }
        Commands::Info { file } => info::run(file),
        Commands::Evaluate {
            file,
            config,
            deviation_threshold,
            acceptance_threshold,
        } => {
            let config = load_config(config)?;
            evaluate::run(
                file,
                config.evaluation_config(deviation_threshold, acceptance_threshold),
            )
        }
    }
}
