use super::activity::ActivityLog;
use super::folder::OutputFolder;
use super::log::{self, LogEvent};
use super::used::UsedBarcodes;
use chrono::Utc;

/// Per-folder session state shared by the reservation service and the
/// recording controller
///
/// Owned by the coordinator and lent out `&mut` to each operation, so session
/// log appends are issued strictly one after another.
#[derive(Debug, Default)]
pub struct SessionContext {
    folder: Option<OutputFolder>,
    used: UsedBarcodes,
    activity: ActivityLog,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn folder(&self) -> Option<&OutputFolder> {
        self.folder.as_ref()
    }

    pub fn used(&self) -> &UsedBarcodes {
        &self.used
    }

    pub fn used_mut(&mut self) -> &mut UsedBarcodes {
        &mut self.used
    }

    pub fn activity(&self) -> &ActivityLog {
        &self.activity
    }

    pub fn activity_mut(&mut self) -> &mut ActivityLog {
        &mut self.activity
    }

    /// Switch to a new output folder and rebuild the used set from its log.
    ///
    /// A log that cannot be read is reported and treated as empty; the folder
    /// stays selected either way.
    pub async fn select_folder(&mut self, folder: OutputFolder) {
        self.used = match log::load(&folder).await {
            Ok(used) => used,
            Err(e) => {
                self.activity
                    .error(format!("Could not read session log: {:#}", e));
                UsedBarcodes::new()
            }
        };

        self.activity.info(format!(
            "Output folder {} selected ({} barcode(s) already used)",
            folder.path().display(),
            self.used.len()
        ));
        self.folder = Some(folder);
    }

    /// Append an event to the session log, best effort.
    ///
    /// Failures go to the diagnostic channel only.
    pub async fn record(&mut self, event: LogEvent) {
        let Some(folder) = &self.folder else {
            tracing::debug!("No output folder, dropping log event: {}", event);
            return;
        };

        let line = log::format_line(Utc::now(), &event);
        if let Err(e) = log::append(folder, &line).await {
            tracing::warn!("Failed to append to session log: {:#}", e);
        }
    }
}
