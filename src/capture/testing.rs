use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::mpsc;

use super::{AudioStream, CaptureError, MicrophoneAccess, StreamId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FakeOutcome {
    Grant,
    Deny,
    Unavailable,
}

/// In-memory microphone. Unless built with [`silent`](Self::silent), every
/// opened stream immediately receives one chunk named after its id.
pub(crate) struct FakeMicrophone {
    outcome: Mutex<FakeOutcome>,
    greet: AtomicBool,
    next_id: AtomicU64,
    requests: AtomicUsize,
    open: Mutex<HashMap<StreamId, mpsc::UnboundedSender<Bytes>>>,
    stopped: Mutex<Vec<StreamId>>,
}

impl FakeMicrophone {
    pub(crate) fn granting() -> Self {
        Self::with_outcome(FakeOutcome::Grant)
    }

    pub(crate) fn denying() -> Self {
        Self::with_outcome(FakeOutcome::Deny)
    }

    /// Grants streams that never deliver a chunk, like a recorder that only
    /// flushes after it is stopped.
    pub(crate) fn silent() -> Self {
        let mic = Self::granting();
        mic.greet.store(false, Ordering::SeqCst);
        mic
    }

    pub(crate) fn with_outcome(outcome: FakeOutcome) -> Self {
        Self {
            outcome: Mutex::new(outcome),
            greet: AtomicBool::new(true),
            next_id: AtomicU64::new(1),
            requests: AtomicUsize::new(0),
            open: Mutex::new(HashMap::new()),
            stopped: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn set_outcome(&self, outcome: FakeOutcome) {
        *self.outcome.lock().expect("outcome lock poisoned") = outcome;
    }

    pub(crate) fn push_chunk(&self, chunk: &'static [u8]) {
        let open = self.open.lock().expect("open lock poisoned");
        for sender in open.values() {
            let _ = sender.send(Bytes::from_static(chunk));
        }
    }

    pub(crate) fn open_streams(&self) -> usize {
        self.open.lock().expect("open lock poisoned").len()
    }

    pub(crate) fn stopped(&self) -> Vec<StreamId> {
        self.stopped.lock().expect("stopped lock poisoned").clone()
    }

    pub(crate) fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MicrophoneAccess for FakeMicrophone {
    async fn request_stream(&self) -> Result<AudioStream, CaptureError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        let outcome = *self.outcome.lock().expect("outcome lock poisoned");
        match outcome {
            FakeOutcome::Deny => Err(CaptureError::permission_denied("user dismissed prompt")),
            FakeOutcome::Unavailable => Err(CaptureError::unavailable("device busy")),
            FakeOutcome::Grant => {
                let id = StreamId(self.next_id.fetch_add(1, Ordering::SeqCst));
                let (tx, rx) = mpsc::unbounded_channel();
                if self.greet.load(Ordering::SeqCst) {
                    let _ = tx.send(Bytes::from(format!("chunk-{}", id.0)));
                }
                self.open.lock().expect("open lock poisoned").insert(id, tx);
                Ok(AudioStream::new(id, rx))
            }
        }
    }

    fn stop_stream(&self, stream: StreamId) {
        self.open.lock().expect("open lock poisoned").remove(&stream);
        self.stopped
            .lock()
            .expect("stopped lock poisoned")
            .push(stream);
    }
}
