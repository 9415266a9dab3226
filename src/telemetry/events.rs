use serde::Serialize;
use std::time::Duration;
use tracing::{info, warn};

pub(crate) const TARGET: &str = "telemetry::practice";
pub(crate) const EVENT_STEP_ENTERED: &str = "speaking_step_entered";
pub(crate) const EVENT_RECORDING_FINALIZED: &str = "speaking_recording_finalized";
pub(crate) const EVENT_SESSION_FINISHED: &str = "speaking_session_finished";
pub(crate) const EVENT_ARTIFACT_EXPORTED: &str = "artifact_exported";
pub(crate) const EVENT_WRITING_TIME_UP: &str = "writing_time_up";

#[derive(Debug, Serialize)]
pub struct StepEnteredEvent<'a> {
    pub step_id: u32,
    pub step_index: usize,
    pub kind: &'static str,
    pub part: &'a str,
    pub duration_secs: u32,
}

#[derive(Debug, Serialize)]
pub struct RecordingFinalizedEvent {
    pub step_id: u32,
    pub bytes: usize,
    pub captured_ms: u64,
    pub replaced: bool,
}

#[derive(Debug, Serialize)]
pub struct SessionFinishedEvent {
    pub step_count: usize,
    pub recording_count: usize,
}

#[derive(Debug, Serialize)]
pub struct ArtifactExportedEvent<'a> {
    pub file_name: &'a str,
    pub bytes: usize,
}

#[derive(Debug, Serialize)]
pub struct WritingTimeUpEvent<'a> {
    pub title: &'a str,
    pub word_count: usize,
    pub min_words: usize,
}

pub fn record_step_entered(
    step_id: u32,
    step_index: usize,
    kind: &'static str,
    part: &str,
    duration_secs: u32,
) {
    let event = StepEnteredEvent {
        step_id,
        step_index,
        kind,
        part,
        duration_secs,
    };

    match serde_json::to_string(&event) {
        Ok(payload) => info!(
            target: TARGET,
            event = EVENT_STEP_ENTERED,
            step_id,
            step_index,
            kind,
            duration_secs,
            payload = %payload
        ),
        Err(err) => warn!(
            target: TARGET,
            event = EVENT_STEP_ENTERED,
            %err,
            "failed to encode step entered event"
        ),
    }
}

pub fn record_recording_finalized(step_id: u32, bytes: usize, captured: Duration, replaced: bool) {
    let event = RecordingFinalizedEvent {
        step_id,
        bytes,
        captured_ms: duration_to_ms(captured),
        replaced,
    };

    match serde_json::to_string(&event) {
        Ok(payload) => info!(
            target: TARGET,
            event = EVENT_RECORDING_FINALIZED,
            step_id,
            bytes,
            replaced,
            payload = %payload
        ),
        Err(err) => warn!(
            target: TARGET,
            event = EVENT_RECORDING_FINALIZED,
            %err,
            "failed to encode recording finalized event"
        ),
    }
}

pub fn record_session_finished(step_count: usize, recording_count: usize) {
    let event = SessionFinishedEvent {
        step_count,
        recording_count,
    };

    match serde_json::to_string(&event) {
        Ok(payload) => info!(
            target: TARGET,
            event = EVENT_SESSION_FINISHED,
            step_count,
            recording_count,
            payload = %payload
        ),
        Err(err) => warn!(
            target: TARGET,
            event = EVENT_SESSION_FINISHED,
            %err,
            "failed to encode session finished event"
        ),
    }
}

pub fn record_artifact_exported(file_name: &str, bytes: usize) {
    let event = ArtifactExportedEvent { file_name, bytes };

    match serde_json::to_string(&event) {
        Ok(payload) => info!(
            target: TARGET,
            event = EVENT_ARTIFACT_EXPORTED,
            file_name,
            bytes,
            payload = %payload
        ),
        Err(err) => warn!(
            target: TARGET,
            event = EVENT_ARTIFACT_EXPORTED,
            %err,
            "failed to encode artifact exported event"
        ),
    }
}

pub fn record_writing_time_up(title: &str, word_count: usize, min_words: usize) {
    let event = WritingTimeUpEvent {
        title,
        word_count,
        min_words,
    };

    match serde_json::to_string(&event) {
        Ok(payload) => info!(
            target: TARGET,
            event = EVENT_WRITING_TIME_UP,
            title,
            word_count,
            min_words,
            payload = %payload
        ),
        Err(err) => warn!(
            target: TARGET,
            event = EVENT_WRITING_TIME_UP,
            %err,
            "failed to encode writing time up event"
        ),
    }
}

fn duration_to_ms(duration: Duration) -> u64 {
    duration.as_millis().min(u64::MAX as u128) as u64
}
