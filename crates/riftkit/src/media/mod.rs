//! Media conversion through an external ffmpeg binary.

mod progress;
mod transcoder;

pub use progress::ProgressParser;
pub use transcoder::{Preset, TranscodeOptions, Transcoder};
