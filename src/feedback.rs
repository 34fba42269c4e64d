use rodio::OutputStreamBuilder;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedbackSoundType {
    Start,
    Stop,
    Error,
}

/// Short sounds played on recording transitions, so the operator does not
/// have to look at the screen after scanning
pub struct AudioFeedback {
    paths: HashMap<FeedbackSoundType, PathBuf>,
}

impl AudioFeedback {
    pub fn new(paths: HashMap<FeedbackSoundType, PathBuf>) -> Self {
        Self { paths }
    }

    /// Fire and forget
    pub fn play(&self, sound_type: FeedbackSoundType) {
        if let Some(path) = self.paths.get(&sound_type) {
            let path = path.clone();
            tokio::task::spawn_blocking(move || {
                if let Err(e) = play_sound_blocking(&path) {
                    tracing::warn!("Failed to play sound {}: {}", path.display(), e);
                }
            });
        }
    }
}

fn play_sound_blocking(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let file = File::open(path)
        .or_else(|_| File::open(PathBuf::from("assets").join(path)))
        .or_else(|_| File::open(PathBuf::from("/usr/share/shiprec/assets").join(path)))?;

    let stream_handle = OutputStreamBuilder::open_default_stream()?;
    let sink = rodio::play(stream_handle.mixer(), BufReader::new(file))?;
    sink.sleep_until_end();

    Ok(())
}
