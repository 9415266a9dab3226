use thiserror::Error;

use crate::capture::CaptureError;

use super::recording::RecordingList;
use super::script::{ScriptError, Step};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerState {
    NotStarted,
    Active { step_index: usize },
    Finished,
}

impl SequencerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SequencerState::NotStarted => "not_started",
            SequencerState::Active { .. } => "active",
            SequencerState::Finished => "finished",
        }
    }
}

/// Mutations a host may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    Start,
    BeginRecording,
    StopRecording,
    Reset,
}

/// What a processed input did to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerEvent {
    Idle,
    Ticked { remaining: u32 },
    EnteredStep { step_index: usize },
    RecordingStarted { step_id: u32 },
    RecordingStopped { step_id: u32, stored: bool },
    Finished,
    Reset,
}

impl SequencerEvent {
    /// Whether the step countdown was (re)armed or torn down.
    pub fn is_transition(&self) -> bool {
        matches!(
            self,
            SequencerEvent::EnteredStep { .. } | SequencerEvent::Finished | SequencerEvent::Reset
        )
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SequencerError {
    #[error("microphone permission denied: {reason}")]
    PermissionDenied { reason: String },
    #[error("capture device unavailable: {reason}")]
    DeviceUnavailable { reason: String },
    #[error("a recording is already live for step {step_id}")]
    CaptureInProgress { step_id: u32 },
    #[error("invalid step index: {0}")]
    InvalidStepIndex(#[from] ScriptError),
    #[error("practice session already started")]
    AlreadyStarted,
    #[error("no step is active")]
    NotActive,
    #[error("step {step_id} does not accept recordings")]
    NotRecordable { step_id: u32 },
    #[error("practice session is closed")]
    SessionClosed,
}

impl From<CaptureError> for SequencerError {
    fn from(err: CaptureError) -> Self {
        match err {
            CaptureError::PermissionDenied { reason } => SequencerError::PermissionDenied { reason },
            CaptureError::DeviceUnavailable { reason } => {
                SequencerError::DeviceUnavailable { reason }
            }
            CaptureError::CaptureInProgress { step_id } => {
                SequencerError::CaptureInProgress { step_id }
            }
        }
    }
}

/// Read-only view published after every tick and transition.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub state: SequencerState,
    pub step: Option<Step>,
    pub step_index: usize,
    pub step_count: usize,
    pub remaining_secs: u32,
    pub total_secs: u32,
    pub progress: f32,
    pub recording: bool,
    pub just_recorded: bool,
    pub recordings: RecordingList,
}

impl SessionSnapshot {
    pub fn started(&self) -> bool {
        !matches!(self.state, SequencerState::NotStarted)
    }

    pub fn finished(&self) -> bool {
        matches!(self.state, SequencerState::Finished)
    }
}
