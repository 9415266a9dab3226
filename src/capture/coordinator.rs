use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::{Bytes, BytesMut};
use tracing::{debug, info, warn};

use super::{AudioStream, CaptureError, MicrophoneAccess};
use crate::config::DEFAULT_ARTIFACT_MIME_TYPE;
use crate::export::{ArtifactExporter, ExportError, ExportReceipt};

/// A finalized capture. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioArtifact {
    step_id: u32,
    data: Bytes,
    mime_type: String,
    captured_for: Duration,
}

impl AudioArtifact {
    pub fn new<S: Into<String>>(step_id: u32, data: Bytes, mime_type: S) -> Self {
        Self {
            step_id,
            data,
            mime_type: mime_type.into(),
            captured_for: Duration::ZERO,
        }
    }

    pub fn step_id(&self) -> u32 {
        self.step_id
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Wall-clock time between capture start and finalization.
    pub fn captured_for(&self) -> Duration {
        self.captured_for
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

struct LiveCapture {
    step_id: u32,
    stream: AudioStream,
    buffer: BytesMut,
    started_at: Instant,
}

/// Bridges step-level recording requests to the injected microphone.
///
/// At most one capture is live at a time. A live stream is always handed back
/// to the host, whether through [`end_capture`](Self::end_capture),
/// [`discard`](Self::discard) or drop.
pub struct RecordingCoordinator {
    microphone: Arc<dyn MicrophoneAccess>,
    mime_type: String,
    live: Option<LiveCapture>,
}

impl std::fmt::Debug for RecordingCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordingCoordinator")
            .field("mime_type", &self.mime_type)
            .field("live_step", &self.live_step())
            .finish_non_exhaustive()
    }
}

impl RecordingCoordinator {
    pub fn new(microphone: Arc<dyn MicrophoneAccess>) -> Self {
        Self::with_mime_type(microphone, DEFAULT_ARTIFACT_MIME_TYPE)
    }

    pub fn with_mime_type<S: Into<String>>(
        microphone: Arc<dyn MicrophoneAccess>,
        mime_type: S,
    ) -> Self {
        Self {
            microphone,
            mime_type: mime_type.into(),
            live: None,
        }
    }

    pub fn is_live(&self) -> bool {
        self.live.is_some()
    }

    pub fn live_step(&self) -> Option<u32> {
        self.live.as_ref().map(|live| live.step_id)
    }

    /// Asks the host for microphone access once and releases the probe stream.
    pub async fn request_permission(&self) -> Result<(), CaptureError> {
        let stream = self.microphone.request_stream().await?;
        self.microphone.stop_stream(stream.id());
        debug!(
            target: "recording_coordinator",
            stream = ?stream.id(),
            "microphone permission granted"
        );
        Ok(())
    }

    pub async fn begin_capture(&mut self, step_id: u32) -> Result<(), CaptureError> {
        if let Some(live) = &self.live {
            warn!(
                target: "recording_coordinator",
                live_step = live.step_id,
                requested_step = step_id,
                "capture already live, rejecting new capture"
            );
            return Err(CaptureError::CaptureInProgress {
                step_id: live.step_id,
            });
        }

        let stream = self
            .microphone
            .request_stream()
            .await
            .map_err(|err| match err {
                CaptureError::CaptureInProgress { .. } => CaptureError::unavailable(err.to_string()),
                other => other,
            })?;

        info!(
            target: "recording_coordinator",
            step_id,
            stream = ?stream.id(),
            "capture started"
        );

        self.live = Some(LiveCapture {
            step_id,
            stream,
            buffer: BytesMut::new(),
            started_at: Instant::now(),
        });
        Ok(())
    }

    /// Moves chunks delivered so far into the capture buffer.
    pub fn pump(&mut self) -> usize {
        let Some(live) = self.live.as_mut() else {
            return 0;
        };

        let chunks = live.stream.drain();
        let count = chunks.len();
        for chunk in chunks {
            live.buffer.extend_from_slice(&chunk);
        }
        count
    }

    /// Stops the live capture and returns its artifact. Safe to call when
    /// nothing is live, in which case `None` is returned.
    pub fn end_capture(&mut self) -> Option<AudioArtifact> {
        let mut live = self.live.take()?;

        self.microphone.stop_stream(live.stream.id());
        for chunk in live.stream.drain() {
            live.buffer.extend_from_slice(&chunk);
        }

        let artifact = AudioArtifact {
            step_id: live.step_id,
            data: live.buffer.freeze(),
            mime_type: self.mime_type.clone(),
            captured_for: live.started_at.elapsed(),
        };

        info!(
            target: "recording_coordinator",
            step_id = artifact.step_id,
            bytes = artifact.len(),
            "capture finalized"
        );
        Some(artifact)
    }

    /// Finalizes and drops any live capture so the device is released.
    pub fn discard(&mut self) -> bool {
        match self.end_capture() {
            Some(artifact) => {
                debug!(
                    target: "recording_coordinator",
                    step_id = artifact.step_id,
                    "discarded live capture"
                );
                true
            }
            None => false,
        }
    }

    pub async fn export_artifact(
        exporter: &dyn ArtifactExporter,
        artifact: &AudioArtifact,
        suggested_file_name: &str,
    ) -> Result<ExportReceipt, ExportError> {
        exporter
            .export(artifact.data.clone(), suggested_file_name)
            .await
    }
}

impl Drop for RecordingCoordinator {
    fn drop(&mut self) {
        if let Some(live) = self.live.take() {
            self.microphone.stop_stream(live.stream.id());
        }
    }
}
