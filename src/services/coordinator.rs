use super::recorder::{RecordingController, SavedClip};
use super::reservation;
use crate::error::SubmitError;
use crate::notify::{NoticeKind, Notifier};
use crate::session::{OutputFolder, SessionContext};
use std::path::Path;

/// What a barcode submission led to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Blank input, nothing happened
    Ignored,
    /// A new recording is running for this barcode
    Started(String),
    /// The active recording's own barcode was submitted; it was stopped and
    /// nothing new started
    StoppedOnly(String),
    Rejected(SubmitError),
}

impl SubmitOutcome {
    /// Only a newly started recording counts as success; the caller keeps
    /// the input otherwise.
    pub fn is_success(&self) -> bool {
        matches!(self, SubmitOutcome::Started(_))
    }
}

/// Decides what each barcode submission does to the recording lifecycle
///
/// Owns the session context and the recording controller. Every failure is
/// handled here: reported through the notifier and folded into the outcome.
pub struct Coordinator {
    ctx: SessionContext,
    recorder: RecordingController,
    notifier: Box<dyn Notifier>,
}

impl Coordinator {
    pub fn new(recorder: RecordingController, notifier: Box<dyn Notifier>) -> Self {
        Self {
            ctx: SessionContext::new(),
            recorder,
            notifier,
        }
    }

    pub fn context(&self) -> &SessionContext {
        &self.ctx
    }

    pub fn recorder(&self) -> &RecordingController {
        &self.recorder
    }

    /// Select the output folder and load its history.
    ///
    /// Refused while recording, since the active clip and its log lines
    /// belong to the current folder.
    pub async fn select_folder(&mut self, path: &Path) -> bool {
        if let Some(current) = self.recorder.current_barcode() {
            let message = format!("Stop the recording for {} before changing folders", current);
            self.notifier.notify(NoticeKind::Error, &message);
            return false;
        }

        match OutputFolder::open(path).await {
            Ok(folder) => {
                self.ctx.select_folder(folder).await;
                let message = format!(
                    "Output folder: {} ({} barcode(s) used)",
                    path.display(),
                    self.ctx.used().len()
                );
                self.notifier.notify(NoticeKind::Info, &message);
                true
            }
            Err(e) => {
                let message = format!("Cannot use {}: {:#}", path.display(), e);
                self.ctx.activity_mut().error(message.clone());
                self.notifier.notify(NoticeKind::Error, &message);
                false
            }
        }
    }

    /// Handle a confirmed barcode (Enter or Start).
    ///
    /// The new barcode is reserved before an in-flight recording is stopped,
    /// so a duplicate or blank scan never ends a good recording.
    pub async fn submit(&mut self, code: &str) -> SubmitOutcome {
        let barcode = code.trim();
        if barcode.is_empty() {
            return SubmitOutcome::Ignored;
        }

        if self.recorder.current_barcode() == Some(barcode) {
            let barcode = barcode.to_string();
            self.stop_active().await;
            self.notifier.notify(
                NoticeKind::Warning,
                &format!(
                    "Recording for {} stopped and not restarted; scan a new barcode to record",
                    barcode
                ),
            );
            return SubmitOutcome::StoppedOnly(barcode);
        }

        if self.ctx.folder().is_none() {
            self.ctx
                .activity_mut()
                .error("Select an output folder before recording");
            return self.reject(SubmitError::NoOutputFolder);
        }

        let barcode = match reservation::reserve(&mut self.ctx, barcode).await {
            Ok(barcode) => barcode,
            Err(e) => {
                self.ctx
                    .activity_mut()
                    .error(format!("Barcode rejected: {}", e));
                return self.reject(e);
            }
        };

        if self.recorder.is_recording() {
            self.stop_active().await;
        }

        match self.recorder.start(&mut self.ctx, &barcode).await {
            Ok(()) => {
                self.notifier
                    .notify(NoticeKind::Started, &format!("Recording {}", barcode));
                SubmitOutcome::Started(barcode)
            }
            Err(e) => self.reject(e),
        }
    }

    /// Stop button: end the active recording without starting another.
    pub async fn stop(&mut self) -> Option<SavedClip> {
        self.stop_active().await
    }

    /// Stop any active recording so its clip is kept before exit.
    pub async fn shutdown(&mut self) {
        if self.recorder.is_recording() {
            tracing::info!("Stopping active recording before exit");
            self.stop_active().await;
        }
    }

    async fn stop_active(&mut self) -> Option<SavedClip> {
        match self.recorder.stop(&mut self.ctx).await {
            Ok(Some(saved)) => {
                let message = if saved.fell_back {
                    format!(
                        "Saved {} for {} to fallback location {}",
                        saved.file_name,
                        saved.barcode,
                        saved.path.display()
                    )
                } else {
                    format!("Saved {} for {}", saved.file_name, saved.barcode)
                };
                self.notifier.notify(NoticeKind::Saved, &message);
                Some(saved)
            }
            Ok(None) => None,
            Err(e) => {
                self.notifier.notify(NoticeKind::Error, &e.to_string());
                None
            }
        }
    }

    fn reject(&self, error: SubmitError) -> SubmitOutcome {
        self.notifier.notify(NoticeKind::Error, &error.to_string());
        SubmitOutcome::Rejected(error)
    }
}
