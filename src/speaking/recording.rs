use serde::Serialize;

use crate::capture::AudioArtifact;
use crate::export::speaking_file_name;

use super::script::Step;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recording {
    pub step_id: u32,
    pub label: String,
    pub artifact: AudioArtifact,
}

impl Recording {
    pub fn for_step(step: &Step, artifact: AudioArtifact) -> Self {
        Self {
            step_id: step.id,
            label: step.label(),
            artifact,
        }
    }

    pub fn suggested_file_name(&self) -> String {
        speaking_file_name(self.step_id, self.artifact.mime_type())
    }

    pub fn summary(&self) -> RecordingSummary {
        RecordingSummary {
            step_id: self.step_id,
            label: self.label.clone(),
            bytes: self.artifact.len(),
            file_name: self.suggested_file_name(),
        }
    }
}

/// Serializable view of a recording for the review screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingSummary {
    pub step_id: u32,
    pub label: String,
    pub bytes: usize,
    pub file_name: String,
}

/// Recordings in completion order, at most one per step id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordingList {
    entries: Vec<Recording>,
}

impl RecordingList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `recording`, removing any earlier entry for the same step.
    /// Returns the replaced entry.
    pub fn upsert(&mut self, recording: Recording) -> Option<Recording> {
        let replaced = self
            .entries
            .iter()
            .position(|entry| entry.step_id == recording.step_id)
            .map(|index| self.entries.remove(index));
        self.entries.push(recording);
        replaced
    }

    pub fn get(&self, step_id: u32) -> Option<&Recording> {
        self.entries.iter().find(|entry| entry.step_id == step_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Recording> {
        self.entries.iter()
    }

    pub fn summaries(&self) -> Vec<RecordingSummary> {
        self.entries.iter().map(Recording::summary).collect()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}
