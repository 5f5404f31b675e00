//! Media conversion with a progress line.

use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use riftkit::{TranscodeOptions, Transcoder};

use crate::app::App;

pub fn run(app: &App, input: &Path, output: &Path, options: &TranscodeOptions) -> Result<()> {
    let transcoder = Transcoder::new(app.config.ffmpeg_path.as_deref());

    let mut last_percent = None;
    transcoder
        .convert(input, output, options, |fraction| {
            let percent = (fraction * 100.0).round() as u32;
            if last_percent != Some(percent) {
                last_percent = Some(percent);
                eprint!("\rConverting... {:>3}%", percent);
                let _ = io::stderr().flush();
            }
        })
        .with_context(|| format!("Failed to convert {}", input.display()))?;

    eprintln!();
    println!("{}", output.display());
    Ok(())
}
