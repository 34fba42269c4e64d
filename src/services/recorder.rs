use crate::capture::{CaptureDevice, CaptureStream, Clip};
use crate::error::SubmitError;
use crate::hooks;
use crate::messages::RecorderState;
use crate::session::folder::copy_unique;
use crate::session::{LogEvent, SessionContext};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct RecorderSettings {
    /// Where clips go when the output folder cannot take them
    pub fallback_dir: PathBuf,
    /// Shell command run after every saved clip
    pub on_saved_hook: Option<String>,
}

/// The barcode an active recording is tied to and when it began
#[derive(Debug, Clone)]
pub struct RecordingSession {
    pub barcode: String,
    pub started_at: DateTime<Utc>,
    started: Instant,
}

impl RecordingSession {
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

/// Where a finished clip ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedClip {
    pub barcode: String,
    pub file_name: String,
    pub path: PathBuf,
    /// True when the output folder write failed and the fallback directory was used
    pub fell_back: bool,
}

struct ActiveRecording {
    session: RecordingSession,
    stream: Box<dyn CaptureStream>,
}

/// Owns the capture device and at most one active recording
///
/// States are `Idle` and `Recording(barcode)`. A failed start leaves the
/// controller idle; a stop always ends idle, whether or not the clip could be
/// persisted.
pub struct RecordingController {
    device: Box<dyn CaptureDevice>,
    settings: RecorderSettings,
    active: Option<ActiveRecording>,
}

impl RecordingController {
    pub fn new(device: Box<dyn CaptureDevice>, settings: RecorderSettings) -> Self {
        Self {
            device,
            settings,
            active: None,
        }
    }

    pub fn state(&self) -> RecorderState {
        match &self.active {
            Some(active) => RecorderState::Recording {
                barcode: active.session.barcode.clone(),
            },
            None => RecorderState::Idle,
        }
    }

    pub fn session(&self) -> Option<&RecordingSession> {
        self.active.as_ref().map(|a| &a.session)
    }

    pub fn current_barcode(&self) -> Option<&str> {
        self.session().map(|s| s.barcode.as_str())
    }

    pub fn is_recording(&self) -> bool {
        self.active.is_some()
    }

    /// Start recording for `code`. Only valid while idle.
    pub async fn start(&mut self, ctx: &mut SessionContext, code: &str) -> Result<(), SubmitError> {
        if let Some(current) = self.current_barcode() {
            return Err(SubmitError::AlreadyRecording(current.to_string()));
        }

        let barcode = code.trim();
        if barcode.is_empty() {
            return Err(SubmitError::EmptyBarcode);
        }

        if ctx.folder().is_none() {
            ctx.activity_mut()
                .error("Select an output folder before recording");
            return Err(SubmitError::NoOutputFolder);
        }

        let stream = match self.device.acquire().await {
            Ok(stream) => stream,
            Err(e) => {
                let reason = format!("{:#}", e);
                ctx.activity_mut()
                    .error(format!("Could not start camera for {}: {}", barcode, reason));
                return Err(SubmitError::DeviceUnavailable(reason));
            }
        };

        self.active = Some(ActiveRecording {
            session: RecordingSession {
                barcode: barcode.to_string(),
                started_at: Utc::now(),
                started: Instant::now(),
            },
            stream,
        });

        ctx.record(LogEvent::Start {
            barcode: barcode.to_string(),
        })
        .await;
        ctx.activity_mut()
            .info(format!("Recording started for {}", barcode));

        Ok(())
    }

    /// Stop the active recording and persist its clip.
    ///
    /// Resolves only after the clip has been written (to the output folder or
    /// the fallback directory), so a new recording can start right away.
    /// Returns `Ok(None)` when nothing was recording.
    pub async fn stop(&mut self, ctx: &mut SessionContext) -> Result<Option<SavedClip>, SubmitError> {
        let Some(active) = self.active.take() else {
            return Ok(None);
        };
        let barcode = active.session.barcode;

        ctx.record(LogEvent::Stop {
            barcode: barcode.clone(),
        })
        .await;
        ctx.activity_mut()
            .info(format!("Recording stopped for {}", barcode));

        let clip = match active.stream.finalize().await {
            Ok(clip) => clip,
            Err(e) => {
                let reason = format!("{:#}", e);
                ctx.activity_mut()
                    .error(format!("Clip for {} was lost: {}", barcode, reason));
                return Err(SubmitError::PersistenceFailure {
                    what: format!("clip for {}", barcode),
                    reason,
                });
            }
        };

        self.persist_clip(ctx, barcode, clip).await.map(Some)
    }

    async fn persist_clip(
        &self,
        ctx: &mut SessionContext,
        barcode: String,
        clip: Clip,
    ) -> Result<SavedClip, SubmitError> {
        let file_name = clip_file_name(&barcode, clip.extension());

        let written = match ctx.folder() {
            Some(folder) => match folder.copy_in(&file_name, clip.path()).await {
                Ok(path) => Some(path),
                Err(e) => {
                    tracing::warn!("Output folder write failed, using fallback: {:#}", e);
                    None
                }
            },
            None => None,
        };

        let (path, fell_back) = match written {
            Some(path) => (path, false),
            None => match self.save_fallback(&file_name, &clip).await {
                Ok(path) => (path, true),
                Err(e) => {
                    let reason = format!("{:#}", e);
                    ctx.activity_mut()
                        .error(format!("Could not save {}: {}", file_name, reason));
                    return Err(SubmitError::PersistenceFailure {
                        what: file_name,
                        reason,
                    });
                }
            },
        };

        // The name actually written may carry a suffix if the first choice was taken
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or(file_name);

        ctx.activity_mut()
            .success(format!("Saved {} to {}", file_name, path.display()));
        ctx.record(LogEvent::Saved {
            barcode: barcode.clone(),
            file: file_name.clone(),
        })
        .await;

        if let Some(command) = &self.settings.on_saved_hook {
            hooks::run_hook(
                "on_saved",
                command,
                vec![
                    ("SHIPREC_BARCODE", barcode.clone()),
                    ("SHIPREC_CLIP", path.display().to_string()),
                ],
            );
        }

        Ok(SavedClip {
            barcode,
            file_name,
            path,
            fell_back,
        })
    }

    async fn save_fallback(&self, file_name: &str, clip: &Clip) -> Result<PathBuf> {
        let dir = &self.settings.fallback_dir;
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create fallback directory: {:?}", dir))?;

        let path = copy_unique(clip.path(), dir, file_name).await?;

        tracing::info!("Clip saved to fallback location {:?}", path);
        Ok(path)
    }
}

/// `<barcode>.<extension>`, with characters that cannot appear in a file name
/// replaced by `_`
pub fn clip_file_name(barcode: &str, extension: &str) -> String {
    let stem: String = barcode
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    format!("{}.{}", stem, extension)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::fake::FakeCamera;
    use crate::session::OutputFolder;
    use crate::session::log::LOG_FILE_NAME;

    struct Fixture {
        dir: tempfile::TempDir,
        fallback: tempfile::TempDir,
        camera: FakeCamera,
        controller: RecordingController,
        ctx: SessionContext,
    }

    async fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let fallback = tempfile::tempdir().unwrap();
        let camera = FakeCamera::new();
        let controller = RecordingController::new(
            Box::new(camera.clone()),
            RecorderSettings {
                fallback_dir: fallback.path().join("Downloads"),
                on_saved_hook: None,
            },
        );
        let mut ctx = SessionContext::new();
        ctx.select_folder(OutputFolder::open(dir.path()).await.unwrap())
            .await;

        Fixture {
            dir,
            fallback,
            camera,
            controller,
            ctx,
        }
    }

    fn read_log(f: &Fixture) -> String {
        std::fs::read_to_string(f.dir.path().join(LOG_FILE_NAME)).unwrap()
    }

    #[test]
    fn test_clip_file_name_replaces_separators() {
        assert_eq!(clip_file_name("PKG-1", "mp4"), "PKG-1.mp4");
        assert_eq!(clip_file_name("A/B\\C:D", "mp4"), "A_B_C_D.mp4");
    }

    #[tokio::test]
    async fn test_start_then_stop_saves_clip() {
        let mut f = fixture().await;

        f.controller.start(&mut f.ctx, "PKG-1").await.unwrap();
        assert_eq!(
            f.controller.state(),
            RecorderState::Recording {
                barcode: "PKG-1".to_string()
            }
        );

        let saved = f.controller.stop(&mut f.ctx).await.unwrap().unwrap();

        assert_eq!(f.controller.state(), RecorderState::Idle);
        assert!(!saved.fell_back);
        assert_eq!(saved.file_name, "PKG-1.mp4");
        assert_eq!(std::fs::read(f.dir.path().join("PKG-1.mp4")).unwrap(), b"clip #1");
        assert_eq!(f.camera.open_streams(), 0);

        let log = read_log(&f);
        let lines: Vec<_> = log.lines().collect();
        assert!(lines[0].ends_with("START barcode=PKG-1"));
        assert!(lines[1].ends_with("STOP barcode=PKG-1"));
        assert!(lines[2].ends_with("SAVED barcode=PKG-1 file=PKG-1.mp4"));
    }

    #[tokio::test]
    async fn test_start_without_folder_fails() {
        let camera = FakeCamera::new();
        let mut controller = RecordingController::new(
            Box::new(camera.clone()),
            RecorderSettings {
                fallback_dir: std::env::temp_dir(),
                on_saved_hook: None,
            },
        );
        let mut ctx = SessionContext::new();

        assert_eq!(
            controller.start(&mut ctx, "PKG-1").await,
            Err(SubmitError::NoOutputFolder)
        );
        assert_eq!(controller.state(), RecorderState::Idle);
        assert_eq!(camera.acquired(), 0);
    }

    #[tokio::test]
    async fn test_device_failure_stays_idle() {
        let mut f = fixture().await;
        f.camera.set_fail_acquire(true);

        let result = f.controller.start(&mut f.ctx, "PKG-1").await;

        assert!(matches!(result, Err(SubmitError::DeviceUnavailable(_))));
        assert_eq!(f.controller.state(), RecorderState::Idle);
        assert!(!read_log(&f).contains("START"));
    }

    #[tokio::test]
    async fn test_start_while_recording_is_refused() {
        let mut f = fixture().await;
        f.controller.start(&mut f.ctx, "PKG-1").await.unwrap();

        assert_eq!(
            f.controller.start(&mut f.ctx, "PKG-2").await,
            Err(SubmitError::AlreadyRecording("PKG-1".to_string()))
        );
        assert_eq!(f.camera.acquired(), 1);
    }

    #[tokio::test]
    async fn test_stop_when_idle_does_nothing() {
        let mut f = fixture().await;

        assert_eq!(f.controller.stop(&mut f.ctx).await, Ok(None));
        assert!(read_log(&f).is_empty());
    }

    #[tokio::test]
    async fn test_folder_write_failure_falls_back() {
        let mut f = fixture().await;
        f.controller.start(&mut f.ctx, "PKG-1").await.unwrap();
        // The selected folder disappears mid-recording
        std::fs::remove_dir_all(f.dir.path()).unwrap();

        let saved = f.controller.stop(&mut f.ctx).await.unwrap().unwrap();

        assert!(saved.fell_back);
        assert_eq!(saved.path, f.fallback.path().join("Downloads").join("PKG-1.mp4"));
        assert_eq!(std::fs::read(&saved.path).unwrap(), b"clip #1");
    }

    #[tokio::test]
    async fn test_colliding_file_names_keep_both_clips() {
        let mut f = fixture().await;

        f.controller.start(&mut f.ctx, "A/B").await.unwrap();
        let first = f.controller.stop(&mut f.ctx).await.unwrap().unwrap();
        f.controller.start(&mut f.ctx, "A_B").await.unwrap();
        let second = f.controller.stop(&mut f.ctx).await.unwrap().unwrap();

        assert_eq!(first.file_name, "A_B.mp4");
        assert_eq!(second.file_name, "A_B-1.mp4");
        assert!(!second.fell_back);
        assert_eq!(std::fs::read(f.dir.path().join("A_B.mp4")).unwrap(), b"clip #1");
        assert_eq!(std::fs::read(f.dir.path().join("A_B-1.mp4")).unwrap(), b"clip #2");

        let log = read_log(&f);
        assert!(log.contains("SAVED barcode=A/B file=A_B.mp4"));
        assert!(log.contains("SAVED barcode=A_B file=A_B-1.mp4"));
    }

    #[tokio::test]
    async fn test_fallback_never_overwrites() {
        let mut f = fixture().await;
        let downloads = f.fallback.path().join("Downloads");
        std::fs::create_dir_all(&downloads).unwrap();
        std::fs::write(downloads.join("PKG-1.mp4"), "earlier").unwrap();
        f.controller.start(&mut f.ctx, "PKG-1").await.unwrap();
        std::fs::remove_dir_all(f.dir.path()).unwrap();

        let saved = f.controller.stop(&mut f.ctx).await.unwrap().unwrap();

        assert_eq!(saved.path, downloads.join("PKG-1-1.mp4"));
        assert_eq!(std::fs::read_to_string(downloads.join("PKG-1.mp4")).unwrap(), "earlier");
    }

    #[tokio::test]
    async fn test_finalize_failure_still_ends_idle() {
        let mut f = fixture().await;
        f.controller.start(&mut f.ctx, "PKG-1").await.unwrap();
        f.camera.set_fail_finalize(true);

        let result = f.controller.stop(&mut f.ctx).await;

        assert!(matches!(result, Err(SubmitError::PersistenceFailure { .. })));
        assert_eq!(f.controller.state(), RecorderState::Idle);
        assert!(!read_log(&f).contains("SAVED"));
    }

    #[tokio::test]
    async fn test_session_tracks_start_time() {
        let mut f = fixture().await;
        let before = Utc::now();

        f.controller.start(&mut f.ctx, "PKG-1").await.unwrap();

        let session = f.controller.session().unwrap();
        assert!(session.started_at >= before);
        assert!(session.elapsed() < Duration::from_secs(60));
    }
}
