use super::device::{CaptureDevice, CaptureStream, Clip};
use anyhow::Result;
use async_trait::async_trait;
use std::io::Write;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
pub struct FakeCameraState {
    pub fail_acquire: bool,
    pub fail_finalize: bool,
    pub acquired: usize,
    pub open_streams: usize,
}

/// In-memory camera for tests; clones share state
#[derive(Clone, Default)]
pub struct FakeCamera {
    state: Arc<Mutex<FakeCameraState>>,
}

impl FakeCamera {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_acquire(&self, fail: bool) {
        self.state.lock().unwrap().fail_acquire = fail;
    }

    pub fn set_fail_finalize(&self, fail: bool) {
        self.state.lock().unwrap().fail_finalize = fail;
    }

    pub fn acquired(&self) -> usize {
        self.state.lock().unwrap().acquired
    }

    pub fn open_streams(&self) -> usize {
        self.state.lock().unwrap().open_streams
    }
}

#[async_trait]
impl CaptureDevice for FakeCamera {
    async fn acquire(&mut self) -> Result<Box<dyn CaptureStream>> {
        let mut state = self.state.lock().unwrap();
        if state.fail_acquire {
            return Err(anyhow::anyhow!("Permission denied"));
        }
        state.acquired += 1;
        state.open_streams += 1;

        Ok(Box::new(FakeStream {
            data: format!("clip #{}", state.acquired).into_bytes(),
            state: self.state.clone(),
        }))
    }
}

struct FakeStream {
    data: Vec<u8>,
    state: Arc<Mutex<FakeCameraState>>,
}

#[async_trait]
impl CaptureStream for FakeStream {
    async fn finalize(self: Box<Self>) -> Result<Clip> {
        let fail = {
            let mut state = self.state.lock().unwrap();
            state.open_streams -= 1;
            state.fail_finalize
        };
        if fail {
            return Err(anyhow::anyhow!("Recorder flush failed"));
        }

        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(&self.data)?;
        Ok(Clip::new(file, "mp4"))
    }
}
