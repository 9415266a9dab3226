use std::time::Duration;

use serde::{Deserialize, Serialize};

/// A timed essay prompt together with how its answer is saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WritingTask {
    pub title: String,
    pub duration_secs: u32,
    pub min_words: usize,
    pub instructions: String,
    pub prompt: String,
    pub image_source: Option<String>,
    pub download_file_name: String,
}

impl WritingTask {
    /// Academic Task 1: describe a chart in 20 minutes, at least 150 words.
    pub fn task1() -> Self {
        Self {
            title: "Writing Task 1".to_string(),
            duration_secs: 20 * 60,
            min_words: 150,
            instructions: suggested_time(20),
            prompt: "The chart below shows the number of girls per 100 boys enrolled in \
                     different levels of school education.\nSummarise the information by \
                     selecting and reporting the main features, and make comparisons where \
                     relevant."
                .to_string(),
            image_source: Some("https://i.postimg.cc/7hKH3Nq2/task1.png".to_string()),
            download_file_name: "IELTS_Task1_Essay.txt".to_string(),
        }
    }

    /// Task 2: opinion essay in 40 minutes, at least 250 words.
    pub fn task2() -> Self {
        Self {
            title: "Writing Task 2".to_string(),
            duration_secs: 40 * 60,
            min_words: 250,
            instructions: suggested_time(40),
            prompt: "People are having more and more sugar-based drinks. What are the \
                     reasons? What are the solutions to make people drink less."
                .to_string(),
            image_source: None,
            download_file_name: "IELTS_Task2_Essay.txt".to_string(),
        }
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs(u64::from(self.duration_secs))
    }

    pub fn duration_minutes(&self) -> u32 {
        self.duration_secs / 60
    }
}

fn suggested_time(minutes: u32) -> String {
    format!("You should spend about {minutes} minutes on this task.")
}
