//! Composition root wiring the speaking sequencer, writing tasks and the
//! artifact exporter together for a host.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::capture::{MicrophoneAccess, RecordingCoordinator};
use crate::config::PracticeConfig;
use crate::export::{ArtifactExporter, DirectoryExporter, ExportError, ExportReceipt};
use crate::speaking::{
    spawn_practice_session, PracticeSessionHandle, RecordingList, Sequencer, SessionSnapshot,
    StepScript,
};
use crate::writing::{WritingSession, WritingTask};

pub struct PracticeApp {
    config: PracticeConfig,
    script: StepScript,
    exporter: Arc<dyn ArtifactExporter>,
}

impl PracticeApp {
    pub fn new(config: PracticeConfig) -> Self {
        let exporter = Arc::new(DirectoryExporter::new(config.export_dir.clone()));
        Self::with_components(config, StepScript::ielts(), exporter)
    }

    pub fn with_components(
        config: PracticeConfig,
        script: StepScript,
        exporter: Arc<dyn ArtifactExporter>,
    ) -> Self {
        Self {
            config,
            script,
            exporter,
        }
    }

    /// Bootstrap: prepares the export directory and logs the practice plan.
    pub async fn run(&self) -> Result<()> {
        info!(target: "practice_app", "running bootstrap tasks");

        tokio::fs::create_dir_all(&self.config.export_dir)
            .await
            .with_context(|| {
                format!(
                    "failed to create export directory {}",
                    self.config.export_dir.display()
                )
            })?;

        info!(
            target: "practice_app",
            steps = self.script.step_count(),
            total_secs = self.script.total_duration().as_secs(),
            export_dir = %self.config.export_dir.display(),
            "speaking script loaded"
        );
        for task in [WritingTask::task1(), WritingTask::task2()] {
            info!(
                target: "practice_app",
                title = %task.title,
                minutes = task.duration_minutes(),
                min_words = task.min_words,
                "writing task available"
            );
        }
        Ok(())
    }

    pub fn config(&self) -> &PracticeConfig {
        &self.config
    }

    pub fn script(&self) -> &StepScript {
        &self.script
    }

    pub fn exporter(&self) -> Arc<dyn ArtifactExporter> {
        Arc::clone(&self.exporter)
    }

    /// Spawns a speaking session bound to `microphone`. The session sits in
    /// `NotStarted` until the host sends `start`.
    pub fn start_speaking(
        &self,
        microphone: Arc<dyn MicrophoneAccess>,
    ) -> (PracticeSessionHandle, broadcast::Receiver<SessionSnapshot>) {
        let coordinator = RecordingCoordinator::with_mime_type(
            microphone,
            self.config.artifact_mime_type.clone(),
        );
        let sequencer = Sequencer::new(self.script.clone(), coordinator);
        spawn_practice_session(sequencer, &self.config)
    }

    pub fn writing_session(&self, task: WritingTask) -> WritingSession {
        WritingSession::new(task)
    }

    /// Hands every recording to the exporter in completion order. Stops at the
    /// first failure.
    pub async fn export_recordings(
        &self,
        recordings: &RecordingList,
    ) -> Result<Vec<ExportReceipt>, ExportError> {
        let mut receipts = Vec::with_capacity(recordings.len());
        for recording in recordings.iter() {
            let file_name = recording.suggested_file_name();
            let receipt = RecordingCoordinator::export_artifact(
                self.exporter.as_ref(),
                &recording.artifact,
                &file_name,
            )
            .await
            .map_err(|err| {
                warn!(
                    target: "practice_app",
                    step_id = recording.step_id,
                    %err,
                    "recording export failed"
                );
                err
            })?;
            receipts.push(receipt);
        }
        Ok(receipts)
    }
}
