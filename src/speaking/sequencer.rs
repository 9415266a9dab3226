use tracing::{debug, info, warn};

use crate::capture::RecordingCoordinator;
use crate::telemetry::events::{
    record_recording_finalized, record_session_finished, record_step_entered,
};

use super::recording::{Recording, RecordingList};
use super::script::{Step, StepScript};
use super::timer::{Countdown, TickOutcome};
use super::types::{
    SequencerError, SequencerEvent, SequencerState, SessionCommand, SessionSnapshot,
};

/// Walks a [`StepScript`], one countdown per step, and owns every recording
/// made during the attempt.
///
/// All mutation goes through [`handle`](Self::handle), [`tick`](Self::tick)
/// and [`finish_step`](Self::finish_step); callers serialize those calls.
#[derive(Debug)]
pub struct Sequencer {
    script: StepScript,
    state: SequencerState,
    countdown: Countdown,
    coordinator: RecordingCoordinator,
    recordings: RecordingList,
    just_recorded: bool,
}

impl Sequencer {
    pub fn new(script: StepScript, coordinator: RecordingCoordinator) -> Self {
        Self {
            script,
            state: SequencerState::NotStarted,
            countdown: Countdown::new(),
            coordinator,
            recordings: RecordingList::new(),
            just_recorded: false,
        }
    }

    pub fn state(&self) -> SequencerState {
        self.state
    }

    pub fn script(&self) -> &StepScript {
        &self.script
    }

    pub fn recordings(&self) -> &RecordingList {
        &self.recordings
    }

    pub fn remaining_secs(&self) -> u32 {
        self.countdown.remaining()
    }

    pub fn is_recording(&self) -> bool {
        self.coordinator.is_live()
    }

    pub fn is_timer_armed(&self) -> bool {
        self.countdown.is_armed()
    }

    pub fn current_step(&self) -> Option<&Step> {
        match self.state {
            SequencerState::Active { step_index } => self.script.step_at(step_index).ok(),
            _ => None,
        }
    }

    pub async fn handle(
        &mut self,
        command: SessionCommand,
    ) -> Result<SequencerEvent, SequencerError> {
        match command {
            SessionCommand::Start => self.start().await,
            SessionCommand::BeginRecording => self.begin_recording().await,
            SessionCommand::StopRecording => self.stop_recording(),
            SessionCommand::Reset => Ok(self.reset()),
        }
    }

    pub async fn start(&mut self) -> Result<SequencerEvent, SequencerError> {
        if self.state != SequencerState::NotStarted {
            debug!(
                target: "speaking_sequencer",
                state = self.state.as_str(),
                "start ignored"
            );
            return Err(SequencerError::AlreadyStarted);
        }

        if let Err(err) = self.coordinator.request_permission().await {
            warn!(
                target: "speaking_sequencer",
                %err,
                "microphone permission not granted, session stays idle"
            );
            return Err(err.into());
        }

        info!(
            target: "speaking_sequencer",
            steps = self.script.step_count(),
            "speaking session started"
        );
        self.enter_step(0)
    }

    pub async fn begin_recording(&mut self) -> Result<SequencerEvent, SequencerError> {
        let index = self.active_index()?;
        let step = self.script.step_at(index)?;
        if !step.is_recordable() {
            return Err(SequencerError::NotRecordable { step_id: step.id });
        }

        let step_id = step.id;
        self.coordinator.begin_capture(step_id).await?;
        self.just_recorded = false;
        Ok(SequencerEvent::RecordingStarted { step_id })
    }

    pub fn stop_recording(&mut self) -> Result<SequencerEvent, SequencerError> {
        let index = self.active_index()?;
        let Some(step_id) = self.coordinator.live_step() else {
            debug!(target: "speaking_sequencer", "stop requested with no live capture");
            return Ok(SequencerEvent::Idle);
        };

        let stored = self.finalize_capture(index)?;
        Ok(SequencerEvent::RecordingStopped { step_id, stored })
    }

    /// Ends a recordable step before its countdown runs out.
    pub fn finish_step(&mut self) -> Result<SequencerEvent, SequencerError> {
        let index = self.active_index()?;
        let step = self.script.step_at(index)?;
        if !step.is_recordable() {
            return Err(SequencerError::NotRecordable { step_id: step.id });
        }
        self.advance()
    }

    /// Delivers one countdown tick. Expiry advances in the same call.
    pub fn tick(&mut self) -> Result<SequencerEvent, SequencerError> {
        if !matches!(self.state, SequencerState::Active { .. }) {
            return Ok(SequencerEvent::Idle);
        }

        self.coordinator.pump();
        match self.countdown.tick() {
            TickOutcome::Idle => Ok(SequencerEvent::Idle),
            TickOutcome::Running { remaining } => Ok(SequencerEvent::Ticked { remaining }),
            TickOutcome::Expired => self.advance(),
        }
    }

    pub fn advance(&mut self) -> Result<SequencerEvent, SequencerError> {
        let index = self.active_index()?;
        self.finalize_capture(index)?;

        let next = index + 1;
        if next < self.script.step_count() {
            return self.enter_step(next);
        }

        self.countdown.clear();
        self.state = SequencerState::Finished;
        info!(
            target: "speaking_sequencer",
            recordings = self.recordings.len(),
            "speaking session finished"
        );
        record_session_finished(self.script.step_count(), self.recordings.len());
        Ok(SequencerEvent::Finished)
    }

    /// Returns to `NotStarted`, dropping recordings and any live capture.
    pub fn reset(&mut self) -> SequencerEvent {
        self.teardown();
        self.countdown = Countdown::new();
        self.recordings.clear();
        self.just_recorded = false;
        self.state = SequencerState::NotStarted;
        info!(target: "speaking_sequencer", "speaking session reset");
        SequencerEvent::Reset
    }

    /// Stops the countdown and releases the microphone without changing state.
    pub fn teardown(&mut self) {
        self.countdown.disarm();
        if self.coordinator.discard() {
            debug!(target: "speaking_sequencer", "live capture discarded on teardown");
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let step_index = match self.state {
            SequencerState::NotStarted => 0,
            SequencerState::Active { step_index } => step_index,
            SequencerState::Finished => self.script.last_index(),
        };

        SessionSnapshot {
            state: self.state,
            step: self.current_step().cloned(),
            step_index,
            step_count: self.script.step_count(),
            remaining_secs: self.countdown.remaining(),
            total_secs: self.countdown.initial(),
            progress: self.countdown.fraction(),
            recording: self.coordinator.is_live(),
            just_recorded: self.just_recorded,
            recordings: self.recordings.clone(),
        }
    }

    fn active_index(&self) -> Result<usize, SequencerError> {
        match self.state {
            SequencerState::Active { step_index } => Ok(step_index),
            _ => Err(SequencerError::NotActive),
        }
    }

    fn enter_step(&mut self, index: usize) -> Result<SequencerEvent, SequencerError> {
        let step = self.script.step_at(index)?;
        self.countdown.arm(step.duration_secs);
        self.just_recorded = false;
        self.state = SequencerState::Active { step_index: index };

        debug!(
            target: "speaking_sequencer",
            step_id = step.id,
            step_index = index,
            duration_secs = step.duration_secs,
            "entered step"
        );
        record_step_entered(
            step.id,
            index,
            step.kind.as_str(),
            &step.part,
            step.duration_secs,
        );
        Ok(SequencerEvent::EnteredStep { step_index: index })
    }

    /// Stores the live capture, if any, against the step at `index`. A capture
    /// that ends without audio is still stored.
    fn finalize_capture(&mut self, index: usize) -> Result<bool, SequencerError> {
        let Some(artifact) = self.coordinator.end_capture() else {
            return Ok(false);
        };

        if artifact.is_empty() {
            warn!(
                target: "speaking_sequencer",
                step_id = artifact.step_id(),
                "capture produced no audio, storing empty recording"
            );
        }

        let step = self.script.step_at(index)?;
        let bytes = artifact.len();
        let captured = artifact.captured_for();
        let recording = Recording::for_step(step, artifact);
        let step_id = recording.step_id;
        let replaced = self.recordings.upsert(recording).is_some();
        self.just_recorded = true;

        record_recording_finalized(step_id, bytes, captured, replaced);
        Ok(true)
    }
}
