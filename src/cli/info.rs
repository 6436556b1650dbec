use anyhow::{Context, Result};
use std::path::PathBuf;

use capture_npz::npz::NpzArchive;

/// Display the arrays stored in an .npz archive
pub fn run(file: PathBuf) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File does not exist: {}", file.display());
    }

    let mut archive = NpzArchive::open(&file).context("Failed to open archive")?;
    let arrays = archive.read_all().context("Failed to read archive")?;

    println!("NPZ Archive Information");
    println!("=======================");
    println!("File: {}", archive.path().display());
    println!("Arrays: {}", arrays.len());
    println!();

    for (key, array) in &arrays {
        println!("{}:", key);
        println!("  dtype: {}", array.element_type());
        println!("  shape: {:?}", array.shape());
        match array.summary() {
            Some(summary) => {
                println!("  min:   {}", summary.min);
                println!("  max:   {}", summary.max);
                println!("  mean:  {}", summary.mean);
            }
            None => println!("  (empty)"),
        }
    }

    Ok(())
}
