use std::sync::LazyLock;

use regex::Regex;

static DURATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Duration: (\d+):(\d+):(\d+(?:\.\d+)?)").unwrap());
static TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"time=(\d+):(\d+):(\d+(?:\.\d+)?)").unwrap());

/// Turns ffmpeg's stderr lines into a completion fraction.
#[derive(Debug, Clone, Default)]
pub struct ProgressParser {
    duration: Option<f64>,
    position: Option<f64>,
}

impl ProgressParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total input length in seconds, once seen.
    pub fn duration(&self) -> Option<f64> {
        self.duration
    }

    pub fn position(&self) -> Option<f64> {
        self.position
    }

    /// Feed one line. Returns the new fraction in `[0, 1]` when the line
    /// carries a position and the duration is known.
    pub fn feed(&mut self, line: &str) -> Option<f64> {
        if self.duration.is_none()
            && let Some(caps) = DURATION.captures(line)
        {
            let total = to_seconds(&caps[1], &caps[2], &caps[3])?;
            if total > 0.0 {
                self.duration = Some(total);
            }
            return None;
        }

        // `time=N/A` does not match and is skipped.
        let caps = TIME.captures(line)?;
        let position = to_seconds(&caps[1], &caps[2], &caps[3])?;
        self.position = Some(position);
        self.fraction()
    }

    pub fn fraction(&self) -> Option<f64> {
        let duration = self.duration?;
        let position = self.position?;
        Some((position / duration).clamp(0.0, 1.0))
    }
}

fn to_seconds(hours: &str, minutes: &str, seconds: &str) -> Option<f64> {
    let h: f64 = hours.parse().ok()?;
    let m: f64 = minutes.parse().ok()?;
    let s: f64 = seconds.parse().ok()?;
    Some(h * 3600.0 + m * 60.0 + s)
}
