//! # capture-npz
//!
//! Command-line front end for converting gagescope and JKAM capture files
//! into NumPy `.npz` archives.
//!
//! ## Usage
//!
//! ```bash
//! # Convert captures (files or directories) into ./processed_files/
//! capture-npz -v convert gage_shot_0001.h5 jkam_capture_0001.h5
//! capture-npz convert raw/ --sampling-frequency 2e8
//!
//! # Inspect an archive
//! capture-npz info processed_files/processed_gage_shot_0001.npz
//!
//! # Check timestamp spacing
//! capture-npz evaluate processed_files/processed_gage_shot_0001.npz
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;

use cli::{dispatch, init_logging, Cli};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    dispatch(cli)
}
