// src/services/quiz_generator.rs

use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use regex::Regex;
use serde_json::{Value, json};

use crate::{
    config::{GENERATED_QUESTION_COUNT, QUIZ_GENERATION_RETRIES},
    error::AppError,
    models::question::{GeneratedQuestion, GeneratedQuiz, QuizQuestion},
};

/// Substrings of which at least one must appear in the first question.
const FRENCH_MARKERS: &[&str] = &[
    "est", "le ", "la ", "les ", "que ", "qui ", "une ", "dans ", "pour ", "avec ",
];

static CODE_FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^\s*```(?:json)?\s*(.*?)\s*```\s*$").expect("valid regex"));

/// Untrusted text generator. Returns the raw model output.
#[async_trait]
pub trait QuestionGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, AppError>;
}

/// Gemini `generateContent` REST client.
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            model,
            base_url: "https://generativelanguage.googleapis.com".to_string(),
        }
    }
}

#[async_trait]
impl QuestionGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, AppError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": { "responseMimeType": "application/json" }
        });

        let response: Value = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AppError::ExternalContentInvalid(format!("Generator request failed: {}", e)))?
            .json()
            .await
            .map_err(|e| AppError::ExternalContentInvalid(format!("Generator response unreadable: {}", e)))?;

        response["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| AppError::ExternalContentInvalid("Generator returned no text".to_string()))
    }
}

/// Stand-in used when no generator credentials are configured.
pub struct DisabledGenerator;

#[async_trait]
impl QuestionGenerator for DisabledGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, AppError> {
        Err(AppError::ExternalContentInvalid(
            "Quiz generation is not configured".to_string(),
        ))
    }
}

pub fn build_prompt(course_title: &str, question_count: usize) -> String {
    format!(
        r#"You are an educational quiz generator for Wanky Academy.

IMPORTANT RULE:
You MUST generate the quiz strictly in FRENCH.

Do NOT use English or Spanish.

Generate {question_count} multiple-choice questions based on the following course:

{course_title}

Rules:
- Each question must be in French
- Provide 4 options (A, B, C, D)
- Only one correct answer
- Provide a detailed explanation in French
- Use clear academic language suitable for beginners

Return ONLY valid JSON in this exact format:

{{
  "quiz": [
    {{
      "question": "...",
      "options": {{
        "A": "...",
        "B": "...",
        "C": "...",
        "D": "..."
      }},
      "correct": "A",
      "explanation": "..."
    }}
  ]
}}"#
    )
}

pub fn looks_french(text: &str) -> bool {
    let lowered = text.to_lowercase();
    FRENCH_MARKERS.iter().any(|m| lowered.contains(m))
}

fn letter_to_index(letter: Option<&str>) -> usize {
    match letter.map(str::trim) {
        Some("A") => 0,
        Some("B") => 1,
        Some("C") => 2,
        Some("D") => 3,
        _ => 0,
    }
}

fn to_question(index: usize, item: GeneratedQuestion) -> QuizQuestion {
    let options = item.options.unwrap_or_default();
    QuizQuestion {
        id: index as u32,
        question: item
            .question
            .unwrap_or_else(|| "Question sans titre".to_string()),
        options: vec![
            options.a.unwrap_or_else(|| "Option A".to_string()),
            options.b.unwrap_or_else(|| "Option B".to_string()),
            options.c.unwrap_or_else(|| "Option C".to_string()),
            options.d.unwrap_or_else(|| "Option D".to_string()),
        ],
        correct_answer: letter_to_index(item.correct.as_deref()),
        explanation: Some(
            item.explanation
                .unwrap_or_else(|| "Pas d'explication disponible.".to_string()),
        ),
    }
}

/// Validates raw generator output and maps it onto quiz questions.
///
/// Rejects output that is not the expected JSON shape, carries no questions,
/// or whose first question shows no French marker. Missing fields inside a
/// question get placeholders instead.
pub fn parse_generated_quiz(raw: &str) -> Result<Vec<QuizQuestion>, AppError> {
    let body = CODE_FENCE_RE
        .captures(raw)
        .and_then(|c| c.get(1))
        .map_or(raw, |m| m.as_str());

    let quiz: GeneratedQuiz = serde_json::from_str(body).map_err(|e| {
        AppError::ExternalContentInvalid(format!("Invalid response structure from generator: {}", e))
    })?;

    let Some(first) = quiz.quiz.first() else {
        return Err(AppError::ExternalContentInvalid(
            "No questions found in generator response".to_string(),
        ));
    };

    if !looks_french(first.question.as_deref().unwrap_or_default()) {
        return Err(AppError::ExternalContentInvalid(
            "Generated quiz is not in French".to_string(),
        ));
    }

    Ok(quiz
        .quiz
        .into_iter()
        .enumerate()
        .map(|(i, item)| to_question(i, item))
        .collect())
}

/// Requests question sets and retries a bounded number of times.
#[derive(Clone)]
pub struct QuizGenerationService {
    generator: Arc<dyn QuestionGenerator>,
    max_retries: u32,
}

impl QuizGenerationService {
    pub fn new(generator: Arc<dyn QuestionGenerator>) -> Self {
        Self {
            generator,
            max_retries: QUIZ_GENERATION_RETRIES,
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Returns the first valid set, or the last rejection once retries run out.
    pub async fn generate_quiz(&self, course_title: &str) -> Result<Vec<QuizQuestion>, AppError> {
        let prompt = build_prompt(course_title, GENERATED_QUESTION_COUNT);
        let mut last_error = AppError::ExternalContentInvalid("Quiz generation failed".to_string());

        for attempt in 0..=self.max_retries {
            let result = match self.generator.generate(&prompt).await {
                Ok(raw) => parse_generated_quiz(&raw),
                Err(e) => Err(e),
            };

            match result {
                Ok(questions) => return Ok(questions),
                Err(e) => {
                    tracing::warn!(
                        "Generated quiz for '{}' rejected (attempt {}): {}",
                        course_title,
                        attempt + 1,
                        e
                    );
                    last_error = e;
                }
            }
        }

        Err(last_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_maps_letters_and_defaults() {
        let raw = r#"{"quiz":[
            {"question":"Qu'est-ce que la RAM ?","options":{"A":"Mémoire vive","B":"Disque"},"correct":"B"},
            {"options":{"A":"x","B":"y","C":"z","D":"w"},"correct":"Z","explanation":"Parce que."}
        ]}"#;

        let questions = parse_generated_quiz(raw).unwrap();
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].correct_answer, 1);
        assert_eq!(questions[0].options[2], "Option C");
        assert_eq!(questions[0].explanation.as_deref(), Some("Pas d'explication disponible."));
        assert_eq!(questions[1].question, "Question sans titre");
        assert_eq!(questions[1].correct_answer, 0);
        assert_eq!(questions[1].id, 1);
    }

    #[test]
    fn test_parse_strips_code_fences() {
        let raw = "```json\n{\"quiz\":[{\"question\":\"Que fait le CPU ?\",\"correct\":\"C\"}]}\n```";
        let questions = parse_generated_quiz(raw).unwrap();
        assert_eq!(questions[0].correct_answer, 2);
    }

    #[test]
    fn test_parse_rejects_english() {
        let raw = r#"{"quiz":[{"question":"What does RAM do?","correct":"A"}]}"#;
        assert!(matches!(
            parse_generated_quiz(raw),
            Err(AppError::ExternalContentInvalid(_))
        ));
    }

    #[test]
    fn test_parse_rejects_wrong_shape() {
        assert!(parse_generated_quiz(r#"{"questions":[]}"#).is_err());
        assert!(parse_generated_quiz(r#"{"quiz":[]}"#).is_err());
        assert!(parse_generated_quiz("not json").is_err());
    }

    #[test]
    fn test_prompt_mentions_course_and_count() {
        let prompt = build_prompt("Canva Mastery", 10);
        assert!(prompt.contains("Canva Mastery"));
        assert!(prompt.contains("Generate 10 multiple-choice"));
        assert!(prompt.contains("\"quiz\": ["));
    }

    /// Replays canned outputs, one per call, and counts the calls.
    struct Scripted {
        outputs: Vec<&'static str>,
        calls: std::sync::atomic::AtomicUsize,
    }

    #[async_trait]
    impl QuestionGenerator for Scripted {
        async fn generate(&self, _prompt: &str) -> Result<String, AppError> {
            let n = self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok(self.outputs[n.min(self.outputs.len() - 1)].to_string())
        }
    }

    fn scripted(outputs: Vec<&'static str>) -> Arc<Scripted> {
        Arc::new(Scripted {
            outputs,
            calls: Default::default(),
        })
    }

    const ENGLISH: &str = r#"{"quiz":[{"question":"What does RAM do?","correct":"A"}]}"#;
    const FRENCH: &str = r#"{"quiz":[{"question":"Que fait le CPU ?","correct":"A"}]}"#;

    #[tokio::test]
    async fn test_retries_until_valid() {
        let generator = scripted(vec!["oops", ENGLISH, FRENCH]);
        let service = QuizGenerationService::new(generator.clone());

        let questions = service.generate_quiz("Informatique").await.unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(generator.calls.load(std::sync::atomic::Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_retries() {
        let generator = scripted(vec![ENGLISH]);
        let service = QuizGenerationService::new(generator.clone()).with_max_retries(1);

        let err = service.generate_quiz("Informatique").await.unwrap_err();
        assert!(matches!(err, AppError::ExternalContentInvalid(_)));
        assert_eq!(generator.calls.load(std::sync::atomic::Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_disabled_generator_fails() {
        let service = QuizGenerationService::new(Arc::new(DisabledGenerator)).with_max_retries(0);
        assert!(service.generate_quiz("Canva").await.is_err());
    }
}
