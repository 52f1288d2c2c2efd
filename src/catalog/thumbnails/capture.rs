use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

use thiserror::Error;

/// Errors raised while capturing or storing a video frame.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// The capture program could not be started.
    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: PathBuf,
        source: std::io::Error,
    },
    /// The capture program exited unsuccessfully.
    #[error("Frame capture failed for {path} ({status}): {stderr}")]
    Failed {
        path: PathBuf,
        status: String,
        stderr: String,
    },
    /// The capture produced no image data.
    #[error("No frame produced for {path}")]
    EmptyFrame { path: PathBuf },
    /// Captured bytes could not be decoded or re-encoded.
    #[error("Failed to decode captured frame for {path}: {source}")]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },
    /// The thumbnail cache could not be written.
    #[error("Failed to store thumbnail at {path}: {source}")]
    Store {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Produces one encoded still frame from a video file.
pub trait FrameCapture: Send + Sync {
    /// Return the frame at `offset` into playback as encoded image bytes.
    fn capture_frame(&self, video: &Path, offset: Duration) -> Result<Vec<u8>, CaptureError>;
}

/// Captures frames by piping a single PNG out of an `ffmpeg` process.
#[derive(Debug, Clone)]
pub struct FfmpegCapture {
    program: PathBuf,
}

impl FfmpegCapture {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn command(&self, video: &Path, offset: Duration) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(["-hide_banner", "-loglevel", "error", "-nostdin"])
            .arg("-ss")
            .arg(format!("{:.3}", offset.as_secs_f64()))
            .arg("-i")
            .arg(video)
            .args(["-frames:v", "1", "-f", "image2pipe", "-vcodec", "png", "-"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        command
    }
}

impl Default for FfmpegCapture {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl FrameCapture for FfmpegCapture {
    fn capture_frame(&self, video: &Path, offset: Duration) -> Result<Vec<u8>, CaptureError> {
        let output = self
            .command(video, offset)
            .output()
            .map_err(|source| CaptureError::Spawn {
                program: self.program.clone(),
                source,
            })?;
        if !output.status.success() {
            return Err(CaptureError::Failed {
                path: video.to_path_buf(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        if output.stdout.is_empty() {
            return Err(CaptureError::EmptyFrame {
                path: video.to_path_buf(),
            });
        }
        Ok(output.stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_seeks_before_input_and_pipes_png() {
        let capture = FfmpegCapture::new("/opt/ffmpeg");
        let command = capture.command(Path::new("/videos/a.mp4"), Duration::from_secs(1));
        assert_eq!(command.get_program(), "/opt/ffmpeg");
        let args: Vec<String> = command
            .get_args()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect();
        let seek = args.iter().position(|arg| arg == "-ss").unwrap();
        let input = args.iter().position(|arg| arg == "-i").unwrap();
        assert!(seek < input);
        assert_eq!(args[seek + 1], "1.000");
        assert_eq!(args[input + 1], "/videos/a.mp4");
        assert_eq!(args.last().map(String::as_str), Some("-"));
        assert!(args.windows(2).any(|pair| pair == ["-vcodec", "png"]));
    }

    #[test]
    fn missing_program_reports_spawn_error() {
        let capture = FfmpegCapture::new("/nonexistent/mediashelf-ffmpeg");
        let err = capture
            .capture_frame(Path::new("/videos/a.mp4"), Duration::from_secs(1))
            .unwrap_err();
        assert!(matches!(err, CaptureError::Spawn { .. }));
    }
}
