//! Timed essay tasks. The host drives the clock with one tick per second and
//! exports the rendered document when the student is done.

pub mod session;
pub mod task;

pub use session::{count_words, WritingError, WritingSession, WritingState};
pub use task::WritingTask;
