// src/services/assessment.rs

use std::collections::{BTreeMap, HashMap};

use chrono::Utc;
use serde::Serialize;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    config::PASSING_SCORE_PERCENTAGE,
    error::AppError,
    models::{
        question::{PublicQuestion, QuizQuestion, QuizType},
        quiz_history::QuizHistoryItem,
        user::UserPatch,
    },
    store::{QUIZ_HISTORY_KEY, SharedStore, load_json, save_json},
};

use super::{catalog, directory::DirectoryStore, session::SessionManager};

/// Rounded percentage of correct answers. An empty quiz scores 0.
pub fn score_percentage(correct: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (100.0 * correct as f64 / total as f64).round() as u32
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptState {
    InProgress {
        current_index: usize,
        /// Question index → chosen option index.
        answers: BTreeMap<usize, usize>,
    },
    Completed {
        score: u32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Grade {
    pub correct: u32,
    pub total: u32,
    pub percentage: u32,
}

/// One delivery of a question set. Finishing is terminal; a retry is a new attempt.
#[derive(Debug, Clone)]
pub struct QuizAttempt {
    pub id: Uuid,
    pub access_code: String,
    pub course_id: String,
    pub course_title: String,
    pub quiz_type: QuizType,
    questions: Vec<QuizQuestion>,
    state: AttemptState,
}

impl QuizAttempt {
    pub fn new(
        access_code: &str,
        course_id: &str,
        course_title: &str,
        quiz_type: QuizType,
        questions: Vec<QuizQuestion>,
    ) -> Result<Self, AppError> {
        if questions.is_empty() {
            return Err(AppError::BadRequest(
                "No questions available for this course".to_string(),
            ));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            access_code: access_code.to_string(),
            course_id: course_id.to_string(),
            course_title: course_title.to_string(),
            quiz_type,
            questions,
            state: AttemptState::InProgress {
                current_index: 0,
                answers: BTreeMap::new(),
            },
        })
    }

    pub fn questions(&self) -> &[QuizQuestion] {
        &self.questions
    }

    pub fn state(&self) -> &AttemptState {
        &self.state
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.state, AttemptState::Completed { .. })
    }

    /// Moves to `index`, clamped to the question range. Ignored once completed.
    pub fn go_to(&mut self, index: usize) {
        let last = self.questions.len() - 1;
        if let AttemptState::InProgress { current_index, .. } = &mut self.state {
            *current_index = index.min(last);
        }
    }

    pub fn next(&mut self) {
        if let AttemptState::InProgress { current_index, .. } = self.state {
            self.go_to(current_index + 1);
        }
    }

    pub fn previous(&mut self) {
        if let AttemptState::InProgress { current_index, .. } = self.state {
            self.go_to(current_index.saturating_sub(1));
        }
    }

    /// Records or overwrites the answer to any question while in progress.
    pub fn select_answer(&mut self, question_index: usize, option_index: usize) -> Result<(), AppError> {
        let AttemptState::InProgress { answers, .. } = &mut self.state else {
            return Err(AppError::BadRequest("Attempt already finished".to_string()));
        };

        let question = self
            .questions
            .get(question_index)
            .ok_or_else(|| AppError::BadRequest(format!("No question at index {}", question_index)))?;

        if option_index >= question.options.len() {
            return Err(AppError::BadRequest(format!(
                "No option {} for question {}",
                option_index, question_index
            )));
        }

        answers.insert(question_index, option_index);
        Ok(())
    }

    pub fn answered_count(&self) -> usize {
        match &self.state {
            AttemptState::InProgress { answers, .. } => answers.len(),
            AttemptState::Completed { .. } => self.questions.len(),
        }
    }

    /// Scores the current answers. Unanswered questions count as incorrect.
    pub fn grade(&self) -> Grade {
        let correct = match &self.state {
            AttemptState::InProgress { answers, .. } => self
                .questions
                .iter()
                .enumerate()
                .filter(|(idx, q)| answers.get(idx) == Some(&q.correct_answer))
                .count(),
            AttemptState::Completed { .. } => 0,
        };
        let total = self.questions.len();

        Grade {
            correct: correct as u32,
            total: total as u32,
            percentage: score_percentage(correct, total),
        }
    }

    fn complete(&mut self, score: u32) {
        self.state = AttemptState::Completed { score };
    }

    pub fn view(&self) -> AttemptView {
        let (status, current_index, answers, score) = match &self.state {
            AttemptState::InProgress {
                current_index,
                answers,
            } => ("inProgress", *current_index, answers.clone(), None),
            AttemptState::Completed { score } => ("completed", 0, BTreeMap::new(), Some(*score)),
        };

        AttemptView {
            id: self.id,
            course_id: self.course_id.clone(),
            course_title: self.course_title.clone(),
            quiz_type: self.quiz_type,
            status,
            current_index,
            questions: self.questions.iter().map(PublicQuestion::from).collect(),
            answers,
            answered_count: self.answered_count(),
            score,
        }
    }
}

/// Client view of an attempt, without answer keys.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptView {
    pub id: Uuid,
    pub course_id: String,
    pub course_title: String,
    pub quiz_type: QuizType,
    pub status: &'static str,
    pub current_index: usize,
    pub questions: Vec<PublicQuestion>,
    pub answers: BTreeMap<usize, usize>,
    pub answered_count: usize,
    pub score: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizOutcome {
    #[serde(flatten)]
    pub grade: Grade,
    pub passed: bool,
    /// Best percentage on this course after this attempt.
    pub best_score: u32,
    pub newly_certified: bool,
    pub history_entry: QuizHistoryItem,
}

/// Portal figures derived from the quiz history and the user's best scores.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizAnalytics {
    pub total_attempts: usize,
    /// Rounded mean of the per-attempt percentages.
    pub average: u32,
    pub highest: u32,
    /// Catalog courses whose best score reaches the passing line.
    pub eligible: usize,
}

/// Entries with `total == 0` contribute their raw score as the percentage.
/// An empty history yields all zeros, eligibility included.
pub fn quiz_analytics(
    history: &[QuizHistoryItem],
    quiz_scores: &BTreeMap<String, u32>,
) -> QuizAnalytics {
    if history.is_empty() {
        return QuizAnalytics {
            total_attempts: 0,
            average: 0,
            highest: 0,
            eligible: 0,
        };
    }

    let percentages: Vec<f64> = history
        .iter()
        .map(|h| {
            if h.total > 0 {
                h.score as f64 / h.total as f64 * 100.0
            } else {
                h.score as f64
            }
        })
        .collect();
    let average = percentages.iter().sum::<f64>() / percentages.len() as f64;
    let highest = percentages.iter().copied().fold(0.0, f64::max);
    let eligible = catalog::courses()
        .iter()
        .filter(|c| quiz_scores.get(c.id).copied().unwrap_or(0) >= PASSING_SCORE_PERCENTAGE)
        .count();

    QuizAnalytics {
        total_attempts: history.len(),
        average: average.round() as u32,
        highest: highest.round() as u32,
        eligible,
    }
}

/// Scores attempts and persists their results.
///
/// Sole writer of `quiz_scores`/`courses` on a record and sole appender to
/// the quiz history.
#[derive(Clone)]
pub struct AssessmentEngine {
    store: SharedStore,
    directory: DirectoryStore,
    sessions: SessionManager,
}

impl AssessmentEngine {
    pub fn new(store: SharedStore, directory: DirectoryStore, sessions: SessionManager) -> Self {
        Self {
            store,
            directory,
            sessions,
        }
    }

    /// Opens an attempt on a catalog course and records it as the last active one.
    pub async fn start_catalog_attempt(
        &self,
        access_code: &str,
        course_id: &str,
    ) -> Result<QuizAttempt, AppError> {
        let course = catalog::find_course(course_id)
            .ok_or_else(|| AppError::NotFound(format!("Course '{}' not found", course_id)))?;

        self.start_attempt(access_code, course.id, course.title, QuizType::Static, course.questions)
            .await
    }

    pub async fn start_attempt(
        &self,
        access_code: &str,
        course_id: &str,
        course_title: &str,
        quiz_type: QuizType,
        questions: Vec<QuizQuestion>,
    ) -> Result<QuizAttempt, AppError> {
        let attempt = QuizAttempt::new(access_code, course_id, course_title, quiz_type, questions)?;

        let patch = UserPatch {
            last_active_course: Some(course_id.to_string()),
            ..Default::default()
        };
        if self.directory.upsert_field(access_code, &patch).await?.is_some() {
            self.sessions.refresh_if_current(access_code, &patch).await?;
        }

        Ok(attempt)
    }

    /// Completes `attempt` and persists its result.
    ///
    /// Appends one history entry, raises the best score (never lowers it),
    /// certifies the course at the passing threshold and marks it last active.
    pub async fn finish(&self, attempt: &mut QuizAttempt) -> Result<QuizOutcome, AppError> {
        if attempt.is_completed() {
            return Err(AppError::BadRequest("Attempt already finished".to_string()));
        }

        let user = self
            .directory
            .find_by_access_code(&attempt.access_code)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let grade = attempt.grade();
        let history_entry = QuizHistoryItem {
            course_id: attempt.course_id.clone(),
            course_title: attempt.course_title.clone(),
            score: grade.correct,
            total: grade.total,
            date: Utc::now(),
            quiz_type: attempt.quiz_type,
        };
        self.append_history(history_entry.clone()).await?;

        let course_id = attempt.course_id.clone();
        let mut quiz_scores = user.quiz_scores.clone();
        let best_score = quiz_scores
            .get(&course_id)
            .copied()
            .unwrap_or(0)
            .max(grade.percentage);
        quiz_scores.insert(course_id.clone(), best_score);

        let passed = grade.percentage >= PASSING_SCORE_PERCENTAGE;
        let mut courses = user.courses.clone();
        let newly_certified = passed && !courses.contains(&course_id);
        if newly_certified {
            courses.push(course_id.clone());
        }

        let patch = UserPatch {
            quiz_scores: Some(quiz_scores),
            courses: Some(courses),
            last_active_course: Some(course_id),
            ..Default::default()
        };
        self.directory.upsert_field(&user.access_code, &patch).await?;
        self.sessions.refresh_if_current(&user.access_code, &patch).await?;

        attempt.complete(grade.percentage);
        tracing::info!(
            "Quiz finished by {} on '{}': {}/{} ({}%)",
            user.access_code,
            attempt.course_id,
            grade.correct,
            grade.total,
            grade.percentage
        );

        Ok(QuizOutcome {
            grade,
            passed,
            best_score,
            newly_certified,
            history_entry,
        })
    }

    /// Finished attempts, oldest first. Malformed history reads as empty.
    pub async fn history(&self) -> Result<Vec<QuizHistoryItem>, AppError> {
        Ok(load_json(self.store.as_ref(), QUIZ_HISTORY_KEY)
            .await?
            .unwrap_or_default())
    }

    pub async fn analytics(&self, access_code: &str) -> Result<QuizAnalytics, AppError> {
        let user = self
            .directory
            .find_by_access_code(access_code)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        let history = self.history().await?;

        Ok(quiz_analytics(&history, &user.quiz_scores))
    }

    async fn append_history(&self, item: QuizHistoryItem) -> Result<(), AppError> {
        let mut history = self.history().await?;
        history.push(item);
        save_json(self.store.as_ref(), QUIZ_HISTORY_KEY, &history).await
    }
}

/// In-progress attempts by id. Completed attempts leave the registry.
#[derive(Default)]
pub struct AttemptRegistry {
    attempts: Mutex<HashMap<Uuid, QuizAttempt>>,
}

impl AttemptRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, attempt: QuizAttempt) -> AttemptView {
        let view = attempt.view();
        self.attempts.lock().await.insert(attempt.id, attempt);
        view
    }

    pub async fn view(&self, id: Uuid, owner: &str) -> Result<AttemptView, AppError> {
        let attempts = self.attempts.lock().await;
        let attempt = owned(attempts.get(&id), owner)?;
        Ok(attempt.view())
    }

    /// Runs `f` against the attempt and returns the resulting view.
    pub async fn update<F>(&self, id: Uuid, owner: &str, f: F) -> Result<AttemptView, AppError>
    where
        F: FnOnce(&mut QuizAttempt) -> Result<(), AppError>,
    {
        let mut attempts = self.attempts.lock().await;
        let attempt = attempts
            .get_mut(&id)
            .filter(|a| a.access_code.eq_ignore_ascii_case(owner))
            .ok_or_else(not_found)?;
        f(attempt)?;
        Ok(attempt.view())
    }

    /// Removes the attempt so it can be finished outside the lock.
    pub async fn take(&self, id: Uuid, owner: &str) -> Result<QuizAttempt, AppError> {
        let mut attempts = self.attempts.lock().await;
        owned(attempts.get(&id), owner)?;
        attempts.remove(&id).ok_or_else(not_found)
    }

    /// Puts back an attempt whose finish failed.
    pub async fn restore(&self, attempt: QuizAttempt) {
        self.attempts.lock().await.insert(attempt.id, attempt);
    }
}

fn not_found() -> AppError {
    AppError::NotFound("Attempt not found".to_string())
}

fn owned<'a>(attempt: Option<&'a QuizAttempt>, owner: &str) -> Result<&'a QuizAttempt, AppError> {
    attempt
        .filter(|a| a.access_code.eq_ignore_ascii_case(owner))
        .ok_or_else(not_found)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn questions(n: u32) -> Vec<QuizQuestion> {
        (0..n)
            .map(|i| QuizQuestion {
                id: i,
                question: format!("Question {}", i),
                options: vec!["A".into(), "B".into(), "C".into(), "D".into()],
                correct_answer: 1,
                explanation: None,
            })
            .collect()
    }

    fn attempt(n: u32) -> QuizAttempt {
        QuizAttempt::new("WA-INF-2025-0001", "informatique", "Informatique", QuizType::Static, questions(n)).unwrap()
    }

    fn current_index(a: &QuizAttempt) -> usize {
        match a.state() {
            AttemptState::InProgress { current_index, .. } => *current_index,
            AttemptState::Completed { .. } => panic!("completed"),
        }
    }

    #[test]
    fn test_score_percentage_rounds() {
        assert_eq!(score_percentage(8, 10), 80);
        assert_eq!(score_percentage(2, 3), 67);
        assert_eq!(score_percentage(1, 8), 13);
        assert_eq!(score_percentage(0, 0), 0);
    }

    fn entry(course_id: &str, score: u32, total: u32) -> QuizHistoryItem {
        QuizHistoryItem {
            course_id: course_id.to_string(),
            course_title: course_id.to_string(),
            score,
            total,
            date: Utc::now(),
            quiz_type: QuizType::Static,
        }
    }

    #[test]
    fn test_analytics_empty_history() {
        let scores = BTreeMap::from([("informatique".to_string(), 90)]);
        let a = quiz_analytics(&[], &scores);
        assert_eq!((a.total_attempts, a.average, a.highest, a.eligible), (0, 0, 0, 0));
    }

    #[test]
    fn test_analytics_rounds_and_counts_eligible() {
        let history = vec![
            entry("informatique", 2, 3),
            entry("canva", 1, 3),
            entry("wordpress", 45, 0),
        ];
        let scores = BTreeMap::from([
            ("informatique".to_string(), 70),
            ("canva".to_string(), 69),
            ("not-in-catalog".to_string(), 100),
        ]);

        let a = quiz_analytics(&history, &scores);
        assert_eq!(a.total_attempts, 3);
        // (66.67 + 33.33 + 45) / 3 = 48.33
        assert_eq!(a.average, 48);
        assert_eq!(a.highest, 67);
        assert_eq!(a.eligible, 1);
    }

    #[test]
    fn test_navigation_is_clamped() {
        let mut a = attempt(3);
        a.previous();
        assert_eq!(current_index(&a), 0);

        a.next();
        a.next();
        a.next();
        assert_eq!(current_index(&a), 2);

        a.go_to(99);
        assert_eq!(current_index(&a), 2);
    }

    #[test]
    fn test_answers_can_be_changed() {
        let mut a = attempt(2);
        a.select_answer(0, 0).unwrap();
        a.select_answer(1, 1).unwrap();
        a.select_answer(0, 1).unwrap();

        let grade = a.grade();
        assert_eq!(grade.correct, 2);
        assert_eq!(grade.percentage, 100);
    }

    #[test]
    fn test_unanswered_questions_count_as_wrong() {
        let mut a = attempt(4);
        a.select_answer(0, 1).unwrap();

        assert_eq!(
            a.grade(),
            Grade {
                correct: 1,
                total: 4,
                percentage: 25
            }
        );
    }

    #[test]
    fn test_select_answer_rejects_out_of_range() {
        let mut a = attempt(2);
        assert!(matches!(a.select_answer(5, 0), Err(AppError::BadRequest(_))));
        assert!(matches!(a.select_answer(0, 4), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_empty_question_set_is_rejected() {
        let result = QuizAttempt::new("WA-INF-2025-0001", "x", "X", QuizType::Mcq, Vec::new());
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_completed_attempt_is_frozen() {
        let mut a = attempt(2);
        a.complete(50);

        assert!(matches!(a.select_answer(0, 1), Err(AppError::BadRequest(_))));
        a.next();
        assert_eq!(a.state(), &AttemptState::Completed { score: 50 });
    }

    #[tokio::test]
    async fn test_registry_hides_attempts_from_other_users() {
        let registry = AttemptRegistry::new();
        let view = registry.insert(attempt(2)).await;

        assert!(registry.view(view.id, "WA-INF-2025-0001").await.is_ok());
        assert!(matches!(
            registry.view(view.id, "WA-INF-2025-0002").await,
            Err(AppError::NotFound(_))
        ));
    }
}
