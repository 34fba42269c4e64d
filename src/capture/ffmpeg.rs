use super::device::{CaptureDevice, CaptureStream, Clip};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tempfile::NamedTempFile;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStderr, ChildStdin, Command};
use tokio::sync::oneshot;

/// Printed by ffmpeg once inputs are open and encoding has begun
const READY_MARKER: &str = "Press [q] to stop";

#[derive(Debug, Clone)]
pub struct CaptureSettings {
    pub ffmpeg_path: String,
    pub input_format: String,
    pub input_device: String,
    pub video_size: Option<String>,
    pub framerate: u32,
    pub extension: String,
}

/// Camera capture through an ffmpeg child process
///
/// Each acquired stream is one ffmpeg process encoding straight into a
/// temporary file. Stopping sends `q` on its stdin so the container is
/// finished properly before the file is handed out as a clip.
pub struct FfmpegCamera {
    settings: CaptureSettings,
}

impl FfmpegCamera {
    pub fn new(settings: CaptureSettings) -> Self {
        Self { settings }
    }

    fn command(&self, output: &Path) -> Command {
        let s = &self.settings;
        let mut command = Command::new(&s.ffmpeg_path);

        command.args(["-hide_banner", "-nostats", "-loglevel", "info"]);
        command.args(["-f", s.input_format.as_str()]);
        if let Some(size) = &s.video_size {
            command.args(["-video_size", size.as_str()]);
        }
        command.args(["-framerate", s.framerate.to_string().as_str()]);
        command.args(["-i", s.input_device.as_str()]);
        command.args(["-c:v", "libx264", "-preset", "veryfast", "-pix_fmt", "yuv420p"]);
        command.args(["-movflags", "+faststart", "-y"]);
        command.arg(output);

        command
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // Keep terminal Ctrl+C away from ffmpeg; shutdown stops it through stdin
        #[cfg(unix)]
        command.process_group(0);

        command
    }

    /// Forward ffmpeg's stderr to tracing and report when capture is running.
    ///
    /// Sends the last line seen if ffmpeg exits before it ever got ready.
    async fn watch_stderr(stderr: ChildStderr, ready: oneshot::Sender<Result<(), String>>) {
        let mut lines = BufReader::new(stderr).lines();
        let mut ready = Some(ready);
        let mut last_line = String::new();

        while let Ok(Some(line)) = lines.next_line().await {
            tracing::debug!(target: "ffmpeg", "{}", line);

            if line.contains(READY_MARKER) {
                if let Some(tx) = ready.take() {
                    let _ = tx.send(Ok(()));
                }
            } else if !line.trim().is_empty() {
                last_line = line;
            }
        }

        if let Some(tx) = ready.take() {
            let _ = tx.send(Err(last_line));
        }
    }
}

#[async_trait]
impl CaptureDevice for FfmpegCamera {
    async fn acquire(&mut self) -> Result<Box<dyn CaptureStream>> {
        let clip_file = tempfile::Builder::new()
            .prefix("shiprec-")
            .suffix(&format!(".{}", self.settings.extension))
            .tempfile()
            .context("Failed to create temporary clip file")?;

        let mut child = self
            .command(clip_file.path())
            .spawn()
            .with_context(|| format!("Failed to spawn {}", self.settings.ffmpeg_path))?;

        let stdin = child.stdin.take().context("Failed to get ffmpeg stdin")?;
        let stderr = child.stderr.take().context("Failed to get ffmpeg stderr")?;

        let (ready_tx, ready_rx) = oneshot::channel();
        tokio::spawn(Self::watch_stderr(stderr, ready_tx));

        let failure = match ready_rx.await {
            Ok(Ok(())) => {
                tracing::info!("Capture started on {}", self.settings.input_device);
                return Ok(Box::new(FfmpegStream {
                    child,
                    stdin,
                    clip_file,
                    extension: self.settings.extension.clone(),
                }));
            }
            Ok(Err(last_line)) => last_line,
            Err(_) => String::new(),
        };

        let status = child.wait().await.context("Failed to wait on ffmpeg")?;
        if failure.is_empty() {
            Err(anyhow::anyhow!("ffmpeg exited with {}", status))
        } else {
            Err(anyhow::anyhow!("ffmpeg exited with {}: {}", status, failure))
        }
    }
}

pub struct FfmpegStream {
    child: Child,
    stdin: ChildStdin,
    clip_file: NamedTempFile,
    extension: String,
}

#[async_trait]
impl CaptureStream for FfmpegStream {
    async fn finalize(self: Box<Self>) -> Result<Clip> {
        let FfmpegStream {
            mut child,
            mut stdin,
            clip_file,
            extension,
        } = *self;

        // ffmpeg may already be gone (device unplugged); wait() below tells
        if let Err(e) = stdin.write_all(b"q").await {
            tracing::warn!("Failed to send quit to ffmpeg: {}", e);
        }
        let _ = stdin.flush().await;
        drop(stdin);

        let status = child.wait().await.context("Failed to wait on ffmpeg")?;
        if !status.success() {
            tracing::warn!("ffmpeg exited with {}", status);
        }

        let size = tokio::fs::metadata(clip_file.path())
            .await
            .context("Failed to inspect recorded clip")?
            .len();
        if size == 0 {
            return Err(anyhow::anyhow!("Recording produced no data"));
        }

        tracing::info!("Capture finalized: {} bytes", size);
        Ok(Clip::new(clip_file, extension))
    }
}
