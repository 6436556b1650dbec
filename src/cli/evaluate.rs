use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;

use capture_npz::evaluate::{evaluate_archive, EvaluationConfig};

/// Check an archive's timestamp spacing against the acceptance thresholds
pub fn run(file: PathBuf, config: EvaluationConfig) -> Result<()> {
    info!("File: {}", file.display());
    info!(
        "Deviation threshold ratio: {}, acceptance threshold: {}%",
        config.deviation_threshold_ratio, config.acceptance_ratio_threshold
    );

    let report = evaluate_archive(&file, &config)
        .with_context(|| format!("Failed to evaluate {}", file.display()))?;

    #[cfg(feature = "colorized_output")]
    {
        println!("{}", report.format_colored());
    }

    #[cfg(not(feature = "colorized_output"))]
    {
        println!("{}", report);
    }

    // Exit with error code if the archive was rejected
    if !report.accepted {
        std::process::exit(1);
    }

    Ok(())
}
