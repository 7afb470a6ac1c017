// src/models/question.rs

use serde::{Deserialize, Serialize};

/// A multiple-choice question with its answer key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub id: u32,

    pub question: String,

    /// Ordered options, four for MCQ.
    pub options: Vec<String>,

    /// Zero-based index into `options`.
    pub correct_answer: usize,

    pub explanation: Option<String>,
}

/// DTO for sending a question to the client (excludes answer and explanation).
#[derive(Debug, Clone, Serialize)]
pub struct PublicQuestion {
    pub id: u32,
    pub question: String,
    pub options: Vec<String>,
}

impl From<&QuizQuestion> for PublicQuestion {
    fn from(q: &QuizQuestion) -> Self {
        Self {
            id: q.id,
            question: q.question.clone(),
            options: q.options.clone(),
        }
    }
}

/// Where a question set came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuizType {
    #[serde(rename = "MCQ")]
    Mcq,
    TrueFalse,
    Static,
}

/// Raw generator output: `{quiz: [{question, options: {A,B,C,D}, correct, explanation}]}`.
/// Every field is optional; gaps are filled with placeholders.
#[derive(Debug, Deserialize)]
pub struct GeneratedQuiz {
    pub quiz: Vec<GeneratedQuestion>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GeneratedQuestion {
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub options: Option<GeneratedOptions>,
    #[serde(default)]
    pub correct: Option<String>,
    #[serde(default)]
    pub explanation: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GeneratedOptions {
    #[serde(rename = "A", default)]
    pub a: Option<String>,
    #[serde(rename = "B", default)]
    pub b: Option<String>,
    #[serde(rename = "C", default)]
    pub c: Option<String>,
    #[serde(rename = "D", default)]
    pub d: Option<String>,
}
