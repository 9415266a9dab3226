use bytes::Bytes;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::export::{ArtifactExporter, ExportError, ExportReceipt};
use crate::speaking::timer::{format_clock, Countdown, TickOutcome};
use crate::telemetry::events::record_writing_time_up;

use super::task::WritingTask;

const SEPARATOR: &str = "---------------------------------------------------";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WritingState {
    NotStarted,
    Writing,
    /// The essay is frozen; it can still be exported.
    TimeUp,
}

#[derive(Debug, Error)]
pub enum WritingError {
    #[error("writing has not started")]
    NotStarted,
    #[error("writing already started")]
    AlreadyStarted,
    #[error("time is up, the essay can no longer be edited")]
    TimeUp,
    #[error(transparent)]
    Export(#[from] ExportError),
}

/// One timed attempt at a [`WritingTask`].
#[derive(Debug, Clone)]
pub struct WritingSession {
    task: WritingTask,
    state: WritingState,
    countdown: Countdown,
    text: String,
}

impl WritingSession {
    pub fn new(task: WritingTask) -> Self {
        let mut countdown = Countdown::new();
        countdown.arm(task.duration_secs);
        countdown.disarm();
        Self {
            task,
            state: WritingState::NotStarted,
            countdown,
            text: String::new(),
        }
    }

    pub fn task(&self) -> &WritingTask {
        &self.task
    }

    pub fn state(&self) -> WritingState {
        self.state
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn remaining_secs(&self) -> u32 {
        self.countdown.remaining()
    }

    pub fn clock(&self) -> String {
        format_clock(self.countdown.remaining())
    }

    pub fn start(&mut self) -> Result<(), WritingError> {
        if self.state != WritingState::NotStarted {
            return Err(WritingError::AlreadyStarted);
        }
        self.countdown.arm(self.task.duration_secs);
        self.state = WritingState::Writing;
        info!(
            target: "writing_session",
            title = %self.task.title,
            duration_secs = self.task.duration_secs,
            "writing started"
        );
        Ok(())
    }

    /// Delivers one countdown tick. Returns the state after the tick.
    pub fn tick(&mut self) -> WritingState {
        if self.state != WritingState::Writing {
            return self.state;
        }

        match self.countdown.tick() {
            TickOutcome::Idle | TickOutcome::Running { .. } => {}
            TickOutcome::Expired => {
                self.state = WritingState::TimeUp;
                let words = self.word_count();
                info!(
                    target: "writing_session",
                    title = %self.task.title,
                    words,
                    "time is up"
                );
                record_writing_time_up(&self.task.title, words, self.task.min_words);
            }
        }
        self.state
    }

    /// Replaces the essay text while the clock is running.
    pub fn set_text(&mut self, text: impl Into<String>) -> Result<(), WritingError> {
        match self.state {
            WritingState::NotStarted => Err(WritingError::NotStarted),
            WritingState::TimeUp => Err(WritingError::TimeUp),
            WritingState::Writing => {
                self.text = text.into();
                Ok(())
            }
        }
    }

    pub fn word_count(&self) -> usize {
        count_words(&self.text)
    }

    pub fn meets_minimum(&self) -> bool {
        self.word_count() >= self.task.min_words
    }

    /// Plain-text document with the task header followed by the essay. The
    /// line after the title holds four spaces.
    pub fn render_document(&self) -> String {
        let task = &self.task;
        let image_line = task
            .image_source
            .as_deref()
            .map(|source| format!("(Image Source: {source})"))
            .unwrap_or_default();

        format!(
            "{title}\n    \nInstructions:\n{instructions}\n\nPrompt:\n{prompt}\n{image_line}\n\n\
             {SEPARATOR}\nStudent Response:\n{SEPARATOR}\n\n{essay}\n",
            title = task.title,
            instructions = task.instructions,
            prompt = task.prompt,
            essay = self.text,
        )
    }

    pub async fn export(
        &self,
        exporter: &dyn ArtifactExporter,
    ) -> Result<ExportReceipt, WritingError> {
        if self.state == WritingState::NotStarted {
            return Err(WritingError::NotStarted);
        }

        let document = self.render_document();
        debug!(
            target: "writing_session",
            file_name = %self.task.download_file_name,
            words = self.word_count(),
            "exporting essay"
        );
        let receipt = exporter
            .export(Bytes::from(document), &self.task.download_file_name)
            .await?;
        Ok(receipt)
    }
}

/// Whitespace-separated, non-empty tokens.
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn short_task(secs: u32) -> WritingTask {
        WritingTask {
            duration_secs: secs,
            min_words: 3,
            ..WritingTask::task2()
        }
    }

    #[test]
    fn counts_words_by_whitespace() {
        assert_eq!(count_words(""), 0);
        assert_eq!(count_words("   \n\t "), 0);
        assert_eq!(count_words("one"), 1);
        assert_eq!(count_words("  sugar-based   drinks\nare\tpopular "), 4);
    }

    #[test]
    fn text_is_rejected_before_start() {
        let mut session = WritingSession::new(short_task(3));
        assert_eq!(session.remaining_secs(), 3);
        assert!(matches!(
            session.set_text("too early"),
            Err(WritingError::NotStarted)
        ));
        assert_eq!(session.tick(), WritingState::NotStarted);
        assert_eq!(session.remaining_secs(), 3);
    }

    #[test]
    fn time_up_locks_the_essay() {
        let mut session = WritingSession::new(short_task(2));
        session.start().expect("start");
        assert!(matches!(session.start(), Err(WritingError::AlreadyStarted)));

        session.set_text("people drink soda").expect("editable");
        assert!(session.meets_minimum());
        assert_eq!(session.tick(), WritingState::Writing);
        assert_eq!(session.clock(), "00:01");
        assert_eq!(session.tick(), WritingState::TimeUp);
        assert_eq!(session.remaining_secs(), 0);

        assert!(matches!(session.set_text("more"), Err(WritingError::TimeUp)));
        assert_eq!(session.text(), "people drink soda");
        assert_eq!(session.tick(), WritingState::TimeUp);
    }

    #[test]
    fn document_includes_image_source_when_present() {
        let mut session = WritingSession::new(WritingTask::task1());
        session.start().expect("start");
        session.set_text("The chart shows...").expect("editable");

        let document = session.render_document();
        assert!(document.starts_with("Writing Task 1\n    \nInstructions:\n"));
        assert!(document.contains("(Image Source: https://i.postimg.cc/7hKH3Nq2/task1.png)"));
        assert!(document.contains(&format!("{SEPARATOR}\nStudent Response:\n{SEPARATOR}")));
        assert!(document.ends_with("\n\nThe chart shows...\n"));
    }

    #[test]
    fn document_omits_image_line_without_source() {
        let mut session = WritingSession::new(WritingTask::task2());
        session.start().expect("start");
        let document = session.render_document();
        assert!(!document.contains("Image Source"));
        assert!(document.contains("Prompt:\nPeople are having"));
    }

    #[test]
    fn document_layout_is_byte_exact() {
        let mut session = WritingSession::new(WritingTask::task2());
        session.start().expect("start");
        session.set_text("Sugar taxes work.").expect("editable");

        let expected = format!(
            "Writing Task 2\n    \nInstructions:\n\
             You should spend about 40 minutes on this task.\n\nPrompt:\n{prompt}\n\n\n\
             {SEPARATOR}\nStudent Response:\n{SEPARATOR}\n\nSugar taxes work.\n",
            prompt = session.task().prompt,
        );
        assert_eq!(session.render_document(), expected);
    }

    #[tokio::test]
    async fn export_writes_document_after_time_up() {
        let dir = tempfile::tempdir().expect("tempdir");
        let exporter = crate::export::DirectoryExporter::new(dir.path());

        let mut session = WritingSession::new(short_task(1));
        assert!(matches!(
            session.export(&exporter).await,
            Err(WritingError::NotStarted)
        ));

        session.start().expect("start");
        session.set_text("an essay").expect("editable");
        assert_eq!(session.tick(), WritingState::TimeUp);

        let receipt = session.export(&exporter).await.expect("export succeeds");
        assert_eq!(receipt.file_name, "IELTS_Task2_Essay.txt");
        let location = receipt.location.expect("location recorded");
        let written = std::fs::read_to_string(location).expect("file exists");
        assert_eq!(written, session.render_document());
    }
}
