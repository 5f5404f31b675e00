use std::collections::VecDeque;
use std::io::{BufReader, ErrorKind, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

use strum::{Display, EnumString};
use tracing::{debug, info, warn};

use super::ProgressParser;
use crate::error::{Error, Result};

const DEFAULT_BINARY: &str = "ffmpeg";
const TAIL_LINES: usize = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, EnumString, Display)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum Preset {
    /// Let ffmpeg pick codecs from the output extension.
    #[default]
    Default,
    /// Drop the video stream.
    AudioOnly,
    /// Remux without re-encoding.
    Copy,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranscodeOptions {
    pub preset: Preset,
    pub video_codec: Option<String>,
    pub audio_codec: Option<String>,
    /// Passed through verbatim, after the generated arguments.
    pub extra_args: Vec<String>,
}

impl TranscodeOptions {
    pub fn preset(preset: Preset) -> Self {
        Self {
            preset,
            ..Default::default()
        }
    }

    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        match self.preset {
            Preset::Default => {}
            Preset::AudioOnly => args.push("-vn".to_string()),
            Preset::Copy => args.extend(["-c".to_string(), "copy".to_string()]),
        }
        if self.preset != Preset::AudioOnly
            && let Some(codec) = &self.video_codec
        {
            args.extend(["-c:v".to_string(), codec.clone()]);
        }
        if let Some(codec) = &self.audio_codec {
            args.extend(["-c:a".to_string(), codec.clone()]);
        }
        args.extend(self.extra_args.iter().cloned());
        args
    }
}

/// Wrapper around the ffmpeg command line.
#[derive(Debug, Clone)]
pub struct Transcoder {
    binary: PathBuf,
}

impl Default for Transcoder {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Transcoder {
    /// Use `binary` when configured, else `ffmpeg` from `PATH`.
    pub fn new(binary: Option<&Path>) -> Self {
        Self {
            binary: binary
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_BINARY)),
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Convert `input` into `output`, reporting progress fractions as ffmpeg
    /// prints them.
    pub fn convert<F>(
        &self,
        input: &Path,
        output: &Path,
        options: &TranscodeOptions,
        mut on_progress: F,
    ) -> Result<()>
    where
        F: FnMut(f64),
    {
        if !input.is_file() {
            return Err(Error::InvalidInput(format!(
                "input file not found: {}",
                input.display()
            )));
        }

        let mut command = Command::new(&self.binary);
        command
            .arg("-hide_banner")
            .arg("-y")
            .arg("-i")
            .arg(input)
            .args(options.to_args())
            .arg(output)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        debug!("Command {:?}", command);

        let mut child = command.spawn().map_err(|e| match e.kind() {
            ErrorKind::NotFound => Error::Transcode {
                code: None,
                message: format!(
                    "{} not found; install ffmpeg or set ffmpeg_path in the config",
                    self.binary.display()
                ),
            },
            _ => Error::Transcode {
                code: None,
                message: format!("failed to start {}: {}", self.binary.display(), e),
            },
        })?;

        let mut parser = ProgressParser::new();
        let mut tail: VecDeque<String> = VecDeque::with_capacity(TAIL_LINES);
        if let Some(stderr) = child.stderr.take() {
            follow_stderr(&mut child, stderr, |line| {
                if let Some(fraction) = parser.feed(line) {
                    on_progress(fraction);
                }
                if tail.len() == TAIL_LINES {
                    tail.pop_front();
                }
                tail.push_back(line.to_string());
            })?;
        }

        let status = child.wait()?;
        if !status.success() {
            let message = Vec::from(tail).join("\n");
            warn!("Transcode of {} failed: {}", input.display(), status);
            return Err(Error::Transcode {
                code: status.code(),
                message,
            });
        }

        on_progress(1.0);
        info!("Converted {} -> {}", input.display(), output.display());
        Ok(())
    }
}

/// Feed the child's stderr to `f`. When reading fails the child is killed
/// and reaped before the error is returned.
fn follow_stderr<R: Read, F: FnMut(&str)>(child: &mut Child, stderr: R, f: F) -> Result<()> {
    let result = for_each_line(stderr, f);
    if let Err(e) = &result {
        warn!("Lost ffmpeg output ({}), stopping pid {}", e, child.id());
        let _ = child.kill();
        let _ = child.wait();
    }
    result
}

/// Split a byte stream on `\n` and `\r`, calling `f` for each non-blank line.
/// ffmpeg rewrites its status line with bare carriage returns.
fn for_each_line<R: Read, F: FnMut(&str)>(reader: R, mut f: F) -> Result<()> {
    let mut reader = BufReader::new(reader);
    let mut chunk = [0u8; 4096];
    let mut line = Vec::new();

    loop {
        let n = match reader.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        for &byte in &chunk[..n] {
            if byte == b'\n' || byte == b'\r' {
                emit_line(&mut line, &mut f);
            } else {
                line.push(byte);
            }
        }
    }
    emit_line(&mut line, &mut f);
    Ok(())
}

fn emit_line<F: FnMut(&str)>(line: &mut Vec<u8>, f: &mut F) {
    let text = String::from_utf8_lossy(line);
    let text = text.trim();
    if !text.is_empty() {
        f(text);
    }
    line.clear();
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_preset_args() {
        assert!(TranscodeOptions::default().to_args().is_empty());
        assert_eq!(TranscodeOptions::preset(Preset::AudioOnly).to_args(), vec!["-vn"]);
        assert_eq!(TranscodeOptions::preset(Preset::Copy).to_args(), vec!["-c", "copy"]);

        let options = TranscodeOptions {
            video_codec: Some("libx264".to_string()),
            audio_codec: Some("aac".to_string()),
            extra_args: vec!["-crf".to_string(), "23".to_string()],
            ..Default::default()
        };
        assert_eq!(
            options.to_args(),
            vec!["-c:v", "libx264", "-c:a", "aac", "-crf", "23"]
        );

        let audio = TranscodeOptions {
            preset: Preset::AudioOnly,
            video_codec: Some("libx264".to_string()),
            audio_codec: Some("libmp3lame".to_string()),
            ..Default::default()
        };
        assert_eq!(audio.to_args(), vec!["-vn", "-c:a", "libmp3lame"]);
    }

    #[test]
    fn test_preset_parsing() {
        assert_eq!("audio-only".parse::<Preset>().unwrap(), Preset::AudioOnly);
        assert_eq!("COPY".parse::<Preset>().unwrap(), Preset::Copy);
        assert!("fast".parse::<Preset>().is_err());
    }

    #[test]
    fn test_split_on_carriage_returns() {
        let data = b"line one\nframe=1 time=00:00:01.00\rframe=2 time=00:00:02.00\r\n\nlast";
        let mut lines = Vec::new();
        for_each_line(&data[..], |l| lines.push(l.to_string())).unwrap();
        assert_eq!(
            lines,
            vec![
                "line one",
                "frame=1 time=00:00:01.00",
                "frame=2 time=00:00:02.00",
                "last"
            ]
        );
    }

    struct BrokenPipe;

    impl Read for BrokenPipe {
        fn read(&mut self, _: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("pipe closed"))
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_stderr_reaps_child() {
        let mut child = Command::new("sleep").arg("30").spawn().unwrap();

        let err = follow_stderr(&mut child, BrokenPipe, |_| {}).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
        // Already waited on: the exit status is available without blocking.
        assert!(child.try_wait().unwrap().is_some());
    }

    #[test]
    fn test_missing_input() {
        let dir = TempDir::new().unwrap();
        let err = Transcoder::default()
            .convert(
                &dir.path().join("missing.mp4"),
                &dir.path().join("out.mp3"),
                &TranscodeOptions::default(),
                |_| {},
            )
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_missing_binary() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in.mp4");
        std::fs::write(&input, b"data").unwrap();

        let transcoder = Transcoder::new(Some(&dir.path().join("no-such-ffmpeg")));
        let err = transcoder
            .convert(&input, &dir.path().join("out.mp3"), &TranscodeOptions::default(), |_| {})
            .unwrap_err();
        match err {
            Error::Transcode { code, message } => {
                assert_eq!(code, None);
                assert!(message.contains("not found"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[cfg(unix)]
    fn fake_ffmpeg(dir: &Path, script: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("fake-ffmpeg");
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", script)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    #[test]
    fn test_convert_reports_progress() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in.mp4");
        std::fs::write(&input, b"data").unwrap();
        let binary = fake_ffmpeg(
            dir.path(),
            r"printf '  Duration: 00:00:10.00, start: 0.0\n' >&2
printf 'time=00:00:05.00\rtime=N/A\r' >&2
exit 0",
        );

        let mut seen = Vec::new();
        Transcoder::new(Some(&binary))
            .convert(&input, &dir.path().join("out.mp3"), &TranscodeOptions::default(), |p| {
                seen.push(p)
            })
            .unwrap();
        assert_eq!(seen, vec![0.5, 1.0]);
    }

    #[cfg(unix)]
    #[test]
    fn test_convert_failure_keeps_stderr_tail() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in.mp4");
        std::fs::write(&input, b"data").unwrap();
        let binary = fake_ffmpeg(
            dir.path(),
            "echo 'Unknown encoder foo' >&2\nexit 3",
        );

        let err = Transcoder::new(Some(&binary))
            .convert(&input, &dir.path().join("out.mp3"), &TranscodeOptions::default(), |_| {})
            .unwrap_err();
        match err {
            Error::Transcode { code, message } => {
                assert_eq!(code, Some(3));
                assert!(message.contains("Unknown encoder foo"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
