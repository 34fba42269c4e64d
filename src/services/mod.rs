pub mod coordinator;
pub mod recorder;
pub mod reservation;

pub use coordinator::{Coordinator, SubmitOutcome};
pub use recorder::{RecorderSettings, RecordingController};
