use anyhow::Result;
use async_trait::async_trait;
use std::path::Path;
use tempfile::NamedTempFile;

/// A finished recording, staged in a temporary file until it is persisted
pub struct Clip {
    file: NamedTempFile,
    extension: String,
}

impl Clip {
    pub fn new(file: NamedTempFile, extension: impl Into<String>) -> Self {
        Self {
            file,
            extension: extension.into(),
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }
}

/// Source of live capture streams (a camera)
#[async_trait]
pub trait CaptureDevice: Send {
    /// Open the device and begin capturing
    ///
    /// Resolves once data is flowing; an error means no stream was left open.
    async fn acquire(&mut self) -> Result<Box<dyn CaptureStream>>;
}

/// A capture in progress; exclusively owns the underlying device until finalized
#[async_trait]
pub trait CaptureStream: Send {
    /// Stop capturing, flush everything buffered into a single clip and
    /// release the device
    async fn finalize(self: Box<Self>) -> Result<Clip>;
}
