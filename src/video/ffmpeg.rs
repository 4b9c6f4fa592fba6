use std::ffi::OsString;
use std::io::{ErrorKind, Read, Write};
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};
use std::thread;

use tracing::{debug, info, warn};

use crate::config::FfmpegConfig;
use crate::error::{LivePhotoError, Result, VideoError};
use crate::frame::ImageBatch;
use crate::video::encoder::{uniform_size, MediaEncoder, TranscodeJob};

/// Encoder backed by the system `ffmpeg` binary
///
/// Frames are piped in as raw BGR24 so no native FFmpeg libraries are linked.
pub struct FfmpegEncoder {
    config: FfmpegConfig,
    intermediate_codec: String,
}

impl FfmpegEncoder {
    pub fn new(config: FfmpegConfig, intermediate_codec: impl Into<String>) -> Self {
        Self {
            config,
            intermediate_codec: intermediate_codec.into(),
        }
    }

    /// Whether the configured binary runs
    pub fn is_available(&self) -> bool {
        Command::new(&self.config.binary)
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }

    /// Arguments for encoding raw BGR24 frames read from stdin
    pub fn intermediate_args(&self, width: usize, height: usize, fps: f64, output: &Path) -> Vec<OsString> {
        let size = format!("{}x{}", width, height);
        let rate = fps.to_string();
        let mut args: Vec<OsString> = [
            "-y",
            "-loglevel", "error",
            "-f", "rawvideo",
            "-pix_fmt", "bgr24",
            "-s", size.as_str(),
            "-r", rate.as_str(),
            "-i", "pipe:0",
            "-an",
            "-c:v", self.intermediate_codec.as_str(),
        ]
        .into_iter()
        .map(OsString::from)
        .collect();
        args.push(output.as_os_str().to_owned());
        args
    }

    /// Arguments for the final re-encode
    pub fn transcode_args(&self, job: &TranscodeJob) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["-y".into(), "-i".into(), job.input_video.clone().into()];

        if let Some(audio) = &job.audio {
            args.push("-i".into());
            args.push(audio.clone().into());
            args.push("-c:a".into());
            args.push(self.config.audio_codec.clone().into());
        }

        args.push("-t".into());
        args.push(job.duration.to_string().into());
        args.push("-vf".into());
        args.push(format!("scale={}", self.config.scale).into());
        args.push("-c:v".into());
        args.push(self.config.video_codec.clone().into());

        if self.config.strict_experimental {
            args.push("-strict".into());
            args.push("experimental".into());
        }

        args.push(job.output.clone().into());
        args
    }

    fn command(&self) -> Command {
        Command::new(&self.config.binary)
    }

    fn spawn_error(&self, e: std::io::Error) -> LivePhotoError {
        if e.kind() == ErrorKind::NotFound {
            VideoError::EncoderNotFound {
                binary: self.config.binary.display().to_string(),
            }.into()
        } else {
            VideoError::EncodingFailed {
                reason: format!("Failed to spawn ffmpeg: {}", e),
            }.into()
        }
    }
}

const STDERR_TAIL_LINES: usize = 20;

fn check_status(status: ExitStatus, stderr: &[u8]) -> Result<()> {
    if !status.success() {
        let stderr = String::from_utf8_lossy(stderr);
        let lines: Vec<&str> = stderr.trim().lines().collect();
        let tail = lines[lines.len().saturating_sub(STDERR_TAIL_LINES)..].join("\n");
        return Err(VideoError::EncodingFailed {
            reason: format!("ffmpeg exited with {}: {}", status, tail),
        }.into());
    }
    Ok(())
}

impl MediaEncoder for FfmpegEncoder {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    fn encode_frames(&self, frames: &ImageBatch, fps: f64, output: &Path) -> Result<()> {
        let (height, width) = uniform_size(frames)?;
        let args = self.intermediate_args(width, height, fps, output);
        debug!("Running ffmpeg {:?}", args);

        let mut child = self
            .command()
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        let mut stdin = child.stdin.take().ok_or_else(|| VideoError::EncodingFailed {
            reason: "failed to open ffmpeg stdin".to_string(),
        })?;
        let mut stderr = child.stderr.take().ok_or_else(|| VideoError::EncodingFailed {
            reason: "failed to open ffmpeg stderr".to_string(),
        })?;

        // Read stderr concurrently; a full pipe would stall ffmpeg mid-stream
        let drain = thread::spawn(move || {
            let mut buf = Vec::new();
            if let Err(e) = stderr.read_to_end(&mut buf) {
                warn!("Failed to read ffmpeg stderr: {}", e);
            }
            buf
        });

        let mut write_result = Ok(());
        for frame in frames.iter() {
            if let Err(e) = stdin.write_all(&frame.to_bgr24()) {
                write_result = Err(e);
                break;
            }
        }
        drop(stdin);

        let status = child.wait().map_err(|e| VideoError::EncodingFailed {
            reason: format!("failed to wait for ffmpeg: {}", e),
        })?;
        let stderr = drain.join().unwrap_or_default();
        check_status(status, &stderr)?;

        // A clean exit after a broken pipe still means frames went missing
        write_result.map_err(|e| VideoError::EncodingFailed {
            reason: format!("failed to write frame to ffmpeg stdin: {}", e),
        })?;

        info!("Encoded {} frames ({}x{} @ {} fps) to {:?}", frames.len(), width, height, fps, output);
        Ok(())
    }

    fn transcode(&self, job: &TranscodeJob) -> Result<()> {
        let args = self.transcode_args(job);
        debug!("Running ffmpeg {:?}", args);

        let output = self
            .command()
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| self.spawn_error(e))?;
        check_status(output.status, &output.stderr)?;

        info!("Transcoded {:?} -> {:?}", job.input_video, job.output);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Frame;
    use std::path::PathBuf;

    fn encoder() -> FfmpegEncoder {
        FfmpegEncoder::new(FfmpegConfig::default(), "mpeg4")
    }

    fn strings(args: Vec<OsString>) -> Vec<String> {
        args.into_iter().map(|a| a.to_string_lossy().into_owned()).collect()
    }

    #[test]
    fn test_intermediate_args() {
        let args = strings(encoder().intermediate_args(640, 480, 30.0, Path::new("/tmp/x/temp_video.mp4")));
        assert_eq!(
            args,
            vec![
                "-y", "-loglevel", "error", "-f", "rawvideo", "-pix_fmt", "bgr24",
                "-s", "640x480", "-r", "30", "-i", "pipe:0", "-an", "-c:v", "mpeg4",
                "/tmp/x/temp_video.mp4",
            ]
        );
    }

    #[test]
    fn test_transcode_args_without_audio() {
        let job = TranscodeJob {
            input_video: PathBuf::from("in.mp4"),
            audio: None,
            duration: 3.0,
            output: PathBuf::from("video.mov"),
        };
        let args = strings(encoder().transcode_args(&job));
        assert_eq!(
            args,
            vec![
                "-y", "-i", "in.mp4", "-t", "3", "-vf", "scale=720:-1", "-c:v", "h264",
                "-strict", "experimental", "video.mov",
            ]
        );
    }

    #[test]
    fn test_transcode_args_with_audio() {
        let job = TranscodeJob {
            input_video: PathBuf::from("in.mp4"),
            audio: Some(PathBuf::from("audio.wav")),
            duration: 2.5,
            output: PathBuf::from("video.mov"),
        };
        let args = strings(encoder().transcode_args(&job));
        let audio_at = args.iter().position(|a| a == "audio.wav").unwrap();
        assert_eq!(args[audio_at - 1], "-i");
        assert_eq!(&args[audio_at + 1..audio_at + 3], ["-c:a", "aac"]);
        assert!(args.windows(2).any(|w| w == ["-t", "2.5"]));
    }

    #[test]
    fn test_missing_binary_is_reported() {
        let mut config = FfmpegConfig::default();
        config.binary = PathBuf::from("/nonexistent/bin/ffmpeg-livephoto");
        let encoder = FfmpegEncoder::new(config, "mpeg4");
        assert!(!encoder.is_available());

        let batch = ImageBatch::single(Frame::zeros(2, 2, 3));
        let err = encoder.encode_frames(&batch, 30.0, Path::new("out.mp4")).unwrap_err();
        assert!(matches!(err, LivePhotoError::Video(VideoError::EncoderNotFound { .. })));
    }

    fn failing_encoder(binary: &str) -> FfmpegEncoder {
        let mut config = FfmpegConfig::default();
        config.binary = PathBuf::from(binary);
        FfmpegEncoder::new(config, "mpeg4")
    }

    #[cfg(unix)]
    #[test]
    fn test_nonzero_exit_on_transcode_is_fatal() {
        let job = TranscodeJob {
            input_video: PathBuf::from("in.mp4"),
            audio: None,
            duration: 3.0,
            output: PathBuf::from("video.mov"),
        };
        let err = failing_encoder("false").transcode(&job).unwrap_err();
        assert!(matches!(err, LivePhotoError::Video(VideoError::EncodingFailed { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_nonzero_exit_while_piping_frames_is_fatal() {
        let frames = (0..3).map(|_| Frame::zeros(64, 64, 3)).collect();
        let batch = ImageBatch::new(frames).unwrap();
        let err = failing_encoder("false")
            .encode_frames(&batch, 30.0, Path::new("out.mp4"))
            .unwrap_err();
        assert!(matches!(err, LivePhotoError::Video(VideoError::EncodingFailed { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_verbose_encoder_does_not_stall_frame_writes() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("ffmpeg");
        // Fill the stderr pipe several times over before touching stdin
        std::fs::write(
            &script,
            "#!/bin/sh\nyes | head -c 262144 >&2\ncat > /dev/null\necho done >&2\nexit 1\n",
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let frames = (0..4).map(|_| Frame::zeros(200, 200, 3)).collect();
        let batch = ImageBatch::new(frames).unwrap();
        let encoder = failing_encoder(script.to_str().unwrap());
        let err = encoder
            .encode_frames(&batch, 30.0, &dir.path().join("out.mp4"))
            .unwrap_err();

        let message = err.to_string();
        assert!(message.contains("done"));
        assert!(message.lines().count() <= STDERR_TAIL_LINES);
    }
}
