use anyhow::{Context, Result};
use log::{debug, info};
use std::path::{Path, PathBuf};

use capture_npz::converter::{BatchSummary, ConverterConfig, FileConverter};
use capture_npz::evaluate::EvaluationConfig;

const CAPTURE_EXTENSIONS: [&str; 2] = ["h5", "hdf5"];

/// Convert capture files into processed_files/processed_<stem>.npz
pub fn run(
    inputs: Vec<PathBuf>,
    config: ConverterConfig,
    evaluation: Option<EvaluationConfig>,
) -> Result<()> {
    config.validate().context("Invalid converter configuration")?;

    let files = collect_inputs(&inputs)?;
    if files.is_empty() {
        anyhow::bail!("No capture files found in the given inputs");
    }

    info!("capture-npz - Capture to NPZ");
    info!("============================");
    info!("Inputs: {} file(s)", files.len());

    let mut converter = FileConverter::with_config(config);
    if let Some(evaluation) = evaluation {
        converter = converter.with_evaluation(evaluation);
    }
    info!(
        "Gagescope sampling frequency: {} Hz",
        converter.config().sampling_frequency
    );
    info!("Output directory: {}", converter.output_dir().display());
    if let Some(evaluation) = converter.evaluation() {
        info!(
            "Evaluation: ±{}% gap deviation, {}% acceptance",
            evaluation.deviation_threshold_ratio * 100.0,
            evaluation.acceptance_ratio_threshold
        );
    }

    let summary = converter.convert_all(&files);
    if converter.evaluation().is_some() {
        print_verdicts(&summary);
    } else {
        for output in &summary.converted {
            println!("{}", output.display());
        }
    }

    info!("Conversion complete: {}", summary);
    if summary.converted.is_empty() {
        anyhow::bail!("No files were converted ({})", summary);
    }

    Ok(())
}

fn print_verdicts(summary: &BatchSummary) {
    for evaluated in &summary.evaluated {
        let verdict = if evaluated.accepted() { "ACCEPTED" } else { "REJECTED" };
        match evaluated.spectrum.as_ref().and_then(|s| s.peak()) {
            Some((freq, amplitude)) => println!(
                "{} {} (spectrum peak {:e} Hz, |X| = {:e})",
                evaluated.output.display(),
                verdict,
                freq,
                amplitude
            ),
            None => println!("{} {}", evaluated.output.display(), verdict),
        }
    }
    println!(
        "Accepted {} of {} archives, current streak {}",
        summary.acceptance.accepted, summary.acceptance.processed, summary.acceptance.streak
    );
}

/// Expand directories into their capture files, sorted by path.
///
/// Files named explicitly are kept regardless of extension.
fn collect_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut found = Vec::new();
            let entries = std::fs::read_dir(input)
                .with_context(|| format!("Failed to read directory: {}", input.display()))?;
            for entry in entries {
                let path = entry?.path();
                if path.is_file() && is_capture_file(&path) {
                    found.push(path);
                }
            }
            found.sort();
            debug!("{}: {} capture file(s)", input.display(), found.len());
            files.extend(found);
        } else if input.exists() {
            files.push(input.clone());
        } else {
            anyhow::bail!("Input file does not exist: {}", input.display());
        }
    }
    Ok(files)
}

fn is_capture_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| CAPTURE_EXTENSIONS.iter().any(|c| ext.eq_ignore_ascii_case(c)))
        .unwrap_or(false)
}
