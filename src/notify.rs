use crate::feedback::{AudioFeedback, FeedbackSoundType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Started,
    Saved,
    Warning,
    Error,
}

/// User-facing notifications; fire and forget, never queried
pub trait Notifier: Send + Sync {
    fn notify(&self, kind: NoticeKind, message: &str);
}

/// Prints notices to the terminal and plays the matching feedback sound
pub struct TerminalNotifier {
    feedback: Option<AudioFeedback>,
}

impl TerminalNotifier {
    pub fn new(feedback: Option<AudioFeedback>) -> Self {
        Self { feedback }
    }
}

impl Notifier for TerminalNotifier {
    fn notify(&self, kind: NoticeKind, message: &str) {
        let (prefix, sound) = match kind {
            NoticeKind::Info => ("INFO", None),
            NoticeKind::Started => ("REC ", Some(FeedbackSoundType::Start)),
            NoticeKind::Saved => ("OK  ", Some(FeedbackSoundType::Stop)),
            NoticeKind::Warning => ("WARN", None),
            NoticeKind::Error => ("ERR ", Some(FeedbackSoundType::Error)),
        };
        println!("[{}] {}", prefix, message);

        if let (Some(feedback), Some(sound)) = (&self.feedback, sound) {
            feedback.play(sound);
        }
    }
}
