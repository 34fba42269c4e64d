use crate::capture::{self, FfmpegCamera};
use crate::config::Config;
use crate::feedback::{AudioFeedback, FeedbackSoundType};
use crate::input;
use crate::messages::InputCommand;
use crate::notify::TerminalNotifier;
use crate::services::{Coordinator, RecorderSettings, RecordingController};
use anyhow::Result;
use chrono::Local;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;

pub struct App {
    coordinator: Coordinator,
    input_rx: mpsc::Receiver<InputCommand>,
}

impl App {
    pub async fn new(config: Config) -> Result<Self> {
        let camera = FfmpegCamera::new(config.capture_settings());
        let recorder = RecordingController::new(
            Box::new(camera),
            RecorderSettings {
                fallback_dir: config.fallback_dir.clone(),
                on_saved_hook: config.on_saved_hook.clone(),
            },
        );
        let notifier = TerminalNotifier::new(Self::setup_feedback(&config));
        let mut coordinator = Coordinator::new(recorder, Box::new(notifier));

        if let Some(dir) = &config.output_dir {
            coordinator.select_folder(dir).await;
        }

        let (input_tx, input_rx) = mpsc::channel(32);
        input::monitor_stdin(input_tx);

        println!("Scan a barcode to start recording. Commands: :folder <path>, :stop, :status, :log, :used, :devices, :quit");

        Ok(Self {
            coordinator,
            input_rx,
        })
    }

    pub async fn run(mut self) -> Result<()> {
        loop {
            tracing::debug!("Main loop: waiting for input");
            tokio::select! {
                command = self.input_rx.recv() => {
                    let Some(command) = command else {
                        tracing::info!("Input closed, shutting down");
                        break;
                    };
                    if !self.handle_command(command).await {
                        break;
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Received Ctrl+C, shutting down");
                    break;
                }
            }
        }

        self.coordinator.shutdown().await;
        tracing::info!("shiprec shutdown complete");
        Ok(())
    }

    /// Returns false when the app should exit.
    async fn handle_command(&mut self, command: InputCommand) -> bool {
        match command {
            InputCommand::Barcode(code) => {
                let outcome = self.coordinator.submit(&code).await;
                tracing::debug!("Submission outcome: {:?}", outcome);
                if outcome.is_success() {
                    self.print_status();
                }
            }
            InputCommand::SelectFolder(path) => {
                self.coordinator.select_folder(&path).await;
            }
            InputCommand::Stop => {
                if self.coordinator.recorder().is_recording() {
                    self.coordinator.stop().await;
                } else {
                    println!("Not recording");
                }
            }
            InputCommand::Status => self.print_status(),
            InputCommand::ShowLog => {
                for entry in self.coordinator.context().activity().entries() {
                    println!("{}", entry);
                }
            }
            InputCommand::ShowUsed => {
                let used = self.coordinator.context().used();
                println!("{} barcode(s) used", used.len());
                for barcode in used.iter() {
                    println!("  {}", barcode);
                }
            }
            InputCommand::Devices => match capture::enumerate_devices().await {
                Ok(devices) if devices.is_empty() => println!("No capture devices found"),
                Ok(devices) => {
                    for device in devices {
                        println!("  {}", device.display());
                    }
                }
                Err(e) => println!("Failed to list devices: {:#}", e),
            },
            InputCommand::Quit => return false,
            InputCommand::Unknown(line) => println!("Unknown command: {}", line),
        }
        true
    }

    fn print_status(&self) {
        let folder = match self.coordinator.context().folder() {
            Some(folder) => folder.path().display().to_string(),
            None => "no folder selected".to_string(),
        };

        match self.coordinator.recorder().session() {
            Some(session) => println!(
                "Recording {} since {} ({}) -> {}",
                session.barcode,
                session.started_at.with_timezone(&Local).format("%H:%M:%S"),
                format_elapsed(session.elapsed()),
                folder
            ),
            None => println!("Idle -> {}", folder),
        }
    }

    fn setup_feedback(config: &Config) -> Option<AudioFeedback> {
        if !config.audio_feedback {
            return None;
        }

        let paths = HashMap::from([
            (FeedbackSoundType::Start, PathBuf::from(&config.start_sound_path)),
            (FeedbackSoundType::Stop, PathBuf::from(&config.stop_sound_path)),
            (FeedbackSoundType::Error, PathBuf::from(&config.error_sound_path)),
        ]);
        Some(AudioFeedback::new(paths))
    }
}

/// `mm:ss`, growing to `h:mm:ss` past the hour
fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        format!("{}:{:02}:{:02}", h, m, s)
    } else {
        format!("{:02}:{:02}", m, s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(Duration::from_secs(0)), "00:00");
        assert_eq!(format_elapsed(Duration::from_millis(75_900)), "01:15");
        assert_eq!(format_elapsed(Duration::from_secs(3_725)), "1:02:05");
    }
}
