//! Image conversion.

use std::path::Path;

use anyhow::{Context, Result, anyhow};
use riftkit::{ImageFormat, convert_image};

pub fn run(input: &Path, output: &Path, format: Option<&str>) -> Result<()> {
    let format = format
        .map(|f| ImageFormat::from_extension(f).ok_or_else(|| anyhow!("Unknown image format: {}", f)))
        .transpose()?;

    convert_image(input, output, format)
        .with_context(|| format!("Failed to convert {}", input.display()))?;
    println!("{}", output.display());
    Ok(())
}
