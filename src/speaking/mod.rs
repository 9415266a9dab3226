//! Timed speaking practice: step script, sequencer state machine and the
//! session runtime that drives it.

pub mod recording;
pub mod runtime;
pub mod script;
pub mod sequencer;
pub mod timer;
pub mod types;

pub use recording::{Recording, RecordingList, RecordingSummary};
pub use runtime::{spawn_practice_session, PracticeSessionHandle};
pub use script::{ScriptError, Step, StepKind, StepScript};
pub use sequencer::Sequencer;
pub use timer::{format_clock, Countdown, TickOutcome};
pub use types::{SequencerError, SequencerEvent, SequencerState, SessionCommand, SessionSnapshot};
