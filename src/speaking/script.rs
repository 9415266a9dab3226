//! The fixed sequence of timed speaking steps.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Question,
    Preparation,
    CueCard,
}

impl StepKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepKind::Question => "question",
            StepKind::Preparation => "preparation",
            StepKind::CueCard => "cue_card",
        }
    }

    /// Preparation intervals are for note taking only.
    pub fn is_recordable(&self) -> bool {
        !matches!(self, StepKind::Preparation)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub id: u32,
    pub part: String,
    pub topic: String,
    pub content: String,
    pub duration_secs: u32,
    pub kind: StepKind,
}

impl Step {
    pub fn new(
        id: u32,
        part: impl Into<String>,
        topic: impl Into<String>,
        content: impl Into<String>,
        duration_secs: u32,
        kind: StepKind,
    ) -> Self {
        Self {
            id,
            part: part.into(),
            topic: topic.into(),
            content: content.into(),
            duration_secs,
            kind,
        }
    }

    pub fn is_recordable(&self) -> bool {
        self.kind.is_recordable()
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs(u64::from(self.duration_secs))
    }

    /// Label shown next to a recording on the review screen.
    pub fn label(&self) -> String {
        format!("{} - {}", self.part, self.topic)
    }
}

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ScriptError {
    #[error("step script must contain at least one step")]
    Empty,
    #[error("step index {index} out of range (script has {len} steps)")]
    OutOfRange { index: usize, len: usize },
}

/// Ordered, immutable list of steps. Cloning shares the underlying steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepScript {
    steps: Arc<[Step]>,
}

impl StepScript {
    pub fn new(steps: Vec<Step>) -> Result<Self, ScriptError> {
        if steps.is_empty() {
            return Err(ScriptError::Empty);
        }
        Ok(Self {
            steps: steps.into(),
        })
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn step_at(&self, index: usize) -> Result<&Step, ScriptError> {
        self.steps.get(index).ok_or(ScriptError::OutOfRange {
            index,
            len: self.steps.len(),
        })
    }

    pub fn last_index(&self) -> usize {
        self.steps.len() - 1
    }

    pub fn iter(&self) -> impl Iterator<Item = &Step> {
        self.steps.iter()
    }

    pub fn total_duration(&self) -> Duration {
        self.steps.iter().map(Step::duration).sum()
    }

    /// The full three-part IELTS speaking test.
    pub fn ielts() -> Self {
        Self {
            steps: ielts_steps().into(),
        }
    }
}

impl Default for StepScript {
    fn default() -> Self {
        Self::ielts()
    }
}

const PART_1: &str = "Part 1";
const PART_2: &str = "Part 2";
const PART_3: &str = "Part 3";
const PART_1_SECS: u32 = 60;
const PART_2_PREP_SECS: u32 = 90;
const PART_2_SPEAK_SECS: u32 = 180;
const PART_3_SECS: u32 = 90;

const CUE_CARD: &str = "Describe a piece of good advice that you gave to someone.\n\n\
You should say:\n\
- Who you gave the advice to\n\
- What the advice was\n\
- Why you gave this advice\n\
- And explain how the person reacted to your advice.";

const PART_1_QUESTIONS: &[(&str, &str)] = &[
    ("Work or Study", "Do you work or are you a student?"),
    ("Work or Study", "What do you like most about your job/course?"),
    ("Work or Study", "Is there anything you dislike about it?"),
    ("Work or Study", "Do you plan to continue in this field in the future?"),
    ("Weekends", "How do you usually spend your weekends?"),
    ("Weekends", "Do you prefer to relax or go out on weekends?"),
    ("Weekends", "What did you do last weekend?"),
    ("Weekends", "Do you think weekends are important for people? Why?"),
    ("Sunglasses", "Do you like wearing sunglasses?"),
    ("Sunglasses", "Where do you usually buy sunglasses?"),
    ("Sunglasses", "Have you ever lost a pair of sunglasses?"),
    ("Sunglasses", "Do people in your country wear sunglasses often?"),
];

const PART_3_QUESTIONS: &[(&str, &str)] = &[
    (
        "Parents and Advice",
        "Do you think parents should give their children advice? Why or why not?",
    ),
    (
        "Parents and Advice",
        "At what age do children usually start resisting their parents' advice?",
    ),
    (
        "Parents and Advice",
        "Is the advice given by parents today different from the advice given in the past?",
    ),
    (
        "Professional Advice",
        "In which situations do people usually seek advice from professionals (e.g., doctors, lawyers)?",
    ),
    (
        "Professional Advice",
        "Do you think people rely too much on online information instead of professional advice nowadays?",
    ),
    (
        "Professional Advice",
        "What qualities make a person a good advisor?",
    ),
    (
        "Peer Advice",
        "Are friends better at giving advice than family members?",
    ),
    (
        "Peer Advice",
        "Can giving bad advice to a friend damage the friendship?",
    ),
];

fn ielts_steps() -> Vec<Step> {
    let mut steps = Vec::with_capacity(PART_1_QUESTIONS.len() + 2 + PART_3_QUESTIONS.len());
    let mut next_id = 1_u32;
    let mut push = |steps: &mut Vec<Step>,
                    part: &str,
                    topic: &str,
                    content: &str,
                    secs: u32,
                    kind: StepKind| {
        steps.push(Step::new(next_id, part, topic, content, secs, kind));
        next_id += 1;
    };

    for (topic, question) in PART_1_QUESTIONS {
        push(&mut steps, PART_1, *topic, *question, PART_1_SECS, StepKind::Question);
    }

    push(
        &mut steps,
        PART_2,
        "Cue Card (Preparation)",
        CUE_CARD,
        PART_2_PREP_SECS,
        StepKind::Preparation,
    );
    push(
        &mut steps,
        PART_2,
        "Cue Card (Speaking)",
        CUE_CARD,
        PART_2_SPEAK_SECS,
        StepKind::CueCard,
    );

    for (topic, question) in PART_3_QUESTIONS {
        push(&mut steps, PART_3, *topic, *question, PART_3_SECS, StepKind::Question);
    }

    steps
}
