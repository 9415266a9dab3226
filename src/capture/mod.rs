//! Microphone capture capability and the recording coordinator.
//!
//! The host owns the actual audio device. It is injected as a
//! [`MicrophoneAccess`] implementation so the speaking sequencer can be driven
//! without hardware.

mod coordinator;

pub use coordinator::{AudioArtifact, RecordingCoordinator};

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use tokio::sync::mpsc;

/// Opaque identifier the host uses to track an open input stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StreamId(pub u64);

/// An open microphone stream delivering encoded audio chunks.
pub struct AudioStream {
    id: StreamId,
    chunks: mpsc::UnboundedReceiver<Bytes>,
}

impl std::fmt::Debug for AudioStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioStream")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

impl AudioStream {
    pub fn new(id: StreamId, chunks: mpsc::UnboundedReceiver<Bytes>) -> Self {
        Self { id, chunks }
    }

    pub fn id(&self) -> StreamId {
        self.id
    }

    /// Collects every chunk already delivered, skipping empty ones.
    pub(crate) fn drain(&mut self) -> Vec<Bytes> {
        let mut drained = Vec::new();
        while let Ok(chunk) = self.chunks.try_recv() {
            if !chunk.is_empty() {
                drained.push(chunk);
            }
        }
        drained
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("microphone permission denied: {reason}")]
    PermissionDenied { reason: String },
    #[error("capture device unavailable: {reason}")]
    DeviceUnavailable { reason: String },
    #[error("a capture is already live for step {step_id}")]
    CaptureInProgress { step_id: u32 },
}

impl CaptureError {
    pub fn permission_denied<S: Into<String>>(reason: S) -> Self {
        Self::PermissionDenied {
            reason: reason.into(),
        }
    }

    pub fn unavailable<S: Into<String>>(reason: S) -> Self {
        Self::DeviceUnavailable {
            reason: reason.into(),
        }
    }
}

#[async_trait]
pub trait MicrophoneAccess: Send + Sync {
    /// Opens an audio input stream, prompting for permission when needed.
    async fn request_stream(&self) -> Result<AudioStream, CaptureError>;

    /// Stops the stream and frees the physical device.
    fn stop_stream(&self, stream: StreamId);
}

#[cfg(test)]
pub(crate) mod testing;
