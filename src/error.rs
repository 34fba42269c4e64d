use thiserror::Error;

/// Reasons a submission or recording transition did not go through.
///
/// None of these escape the coordinator: they are reported to the user and
/// folded into a non-success outcome.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    #[error("barcode is empty")]
    EmptyBarcode,

    #[error("barcode {0:?} contains whitespace")]
    InvalidBarcode(String),

    #[error("barcode {0} has already been used in this folder")]
    DuplicateBarcode(String),

    #[error("no output folder selected")]
    NoOutputFolder,

    #[error("camera unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("failed to persist {what}: {reason}")]
    PersistenceFailure { what: String, reason: String },

    #[error("a recording is already in progress for {0}")]
    AlreadyRecording(String),
}
