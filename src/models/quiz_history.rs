// src/models/quiz_history.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::question::QuizType;

/// One finished attempt. Appended once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizHistoryItem {
    pub course_id: String,
    pub course_title: String,
    /// Correct answers.
    pub score: u32,
    /// Questions in the attempt.
    pub total: u32,
    pub date: DateTime<Utc>,
    #[serde(rename = "type")]
    pub quiz_type: QuizType,
}
