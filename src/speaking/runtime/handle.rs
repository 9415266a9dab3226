use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::warn;

use crate::speaking::types::{SequencerError, SessionCommand, SessionSnapshot};

use super::RuntimeRequest;

/// Host-side handle to a running practice session.
///
/// Dropping the handle aborts the worker; the sequencer is dropped with it and
/// any live capture hands its stream back to the host.
pub struct PracticeSessionHandle {
    requests: mpsc::Sender<RuntimeRequest>,
    snapshots: broadcast::Sender<SessionSnapshot>,
    worker: Option<JoinHandle<()>>,
}

impl PracticeSessionHandle {
    pub(super) fn new(
        requests: mpsc::Sender<RuntimeRequest>,
        snapshots: broadcast::Sender<SessionSnapshot>,
        worker: JoinHandle<()>,
    ) -> Self {
        Self {
            requests,
            snapshots,
            worker: Some(worker),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionSnapshot> {
        self.snapshots.subscribe()
    }

    pub async fn send(&self, command: SessionCommand) -> Result<SessionSnapshot, SequencerError> {
        let (reply, rx) = oneshot::channel();
        self.requests
            .send(RuntimeRequest::Command { command, reply })
            .await
            .map_err(|_| SequencerError::SessionClosed)?;
        rx.await.map_err(|_| SequencerError::SessionClosed)?
    }

    pub async fn start(&self) -> Result<SessionSnapshot, SequencerError> {
        self.send(SessionCommand::Start).await
    }

    pub async fn begin_recording(&self) -> Result<SessionSnapshot, SequencerError> {
        self.send(SessionCommand::BeginRecording).await
    }

    pub async fn stop_recording(&self) -> Result<SessionSnapshot, SequencerError> {
        self.send(SessionCommand::StopRecording).await
    }

    pub async fn reset(&self) -> Result<SessionSnapshot, SequencerError> {
        self.send(SessionCommand::Reset).await
    }

    pub async fn finish_step(&self) -> Result<SessionSnapshot, SequencerError> {
        let (reply, rx) = oneshot::channel();
        self.requests
            .send(RuntimeRequest::FinishStep { reply })
            .await
            .map_err(|_| SequencerError::SessionClosed)?;
        rx.await.map_err(|_| SequencerError::SessionClosed)?
    }

    pub async fn snapshot(&self) -> Result<SessionSnapshot, SequencerError> {
        let (reply, rx) = oneshot::channel();
        self.requests
            .send(RuntimeRequest::Snapshot { reply })
            .await
            .map_err(|_| SequencerError::SessionClosed)?;
        rx.await.map_err(|_| SequencerError::SessionClosed)
    }

    /// Stops the timer, releases the microphone and waits for the worker to exit.
    pub async fn shutdown(mut self) -> Result<SessionSnapshot, SequencerError> {
        let (reply, rx) = oneshot::channel();
        self.requests
            .send(RuntimeRequest::Shutdown { reply })
            .await
            .map_err(|_| SequencerError::SessionClosed)?;
        let snapshot = rx.await.map_err(|_| SequencerError::SessionClosed)?;

        if let Some(worker) = self.worker.take() {
            if let Err(err) = worker.await {
                warn!(target: "practice_runtime", %err, "session worker ended abnormally");
            }
        }
        Ok(snapshot)
    }
}

impl Drop for PracticeSessionHandle {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.take() {
            worker.abort();
        }
    }
}
