// src/handlers/quiz.rs

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{question::QuizType, session::Session},
    services::{
        Academy,
        catalog::{self, CourseSummary},
    },
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartAttemptRequest {
    pub course_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateQuizRequest {
    pub course_id: String,
    /// Needed only for courses outside the built-in catalog.
    pub course_title: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectAnswerRequest {
    pub question_index: usize,
    pub option_index: usize,
}

/// Lists the built-in courses.
pub async fn list_courses() -> impl IntoResponse {
    let courses: Vec<CourseSummary> = catalog::courses().iter().map(CourseSummary::from).collect();
    Json(courses)
}

/// Starts an attempt on a catalog course's static question bank.
pub async fn start_attempt(
    State(academy): State<Arc<Academy>>,
    Extension(session): Extension<Session>,
    Json(req): Json<StartAttemptRequest>,
) -> Result<impl IntoResponse, AppError> {
    let attempt = {
        let _guard = academy.exclusive().await;
        academy
            .assessment
            .start_catalog_attempt(session.access_code(), &req.course_id)
            .await?
    };

    let view = academy.attempts.insert(attempt).await;
    Ok((StatusCode::CREATED, Json(view)))
}

/// Generates a French MCQ set for the course and starts an attempt on it.
///
/// Rejected generator output is retried; exhaustion yields 502 and the
/// caller may simply ask again.
pub async fn generate_attempt(
    State(academy): State<Arc<Academy>>,
    Extension(session): Extension<Session>,
    Json(req): Json<GenerateQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    let title = catalog::find_course(&req.course_id)
        .map(|c| c.title.to_string())
        .or(req.course_title)
        .ok_or_else(|| AppError::BadRequest("courseTitle is required for this course".to_string()))?;

    let questions = academy.generator.generate_quiz(&title).await?;

    let attempt = {
        let _guard = academy.exclusive().await;
        academy
            .assessment
            .start_attempt(session.access_code(), &req.course_id, &title, QuizType::Mcq, questions)
            .await?
    };

    let view = academy.attempts.insert(attempt).await;
    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn get_attempt(
    State(academy): State<Arc<Academy>>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let view = academy.attempts.view(id, session.access_code()).await?;
    Ok(Json(view))
}

/// Records or changes the answer to one question.
pub async fn select_answer(
    State(academy): State<Arc<Academy>>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
    Json(req): Json<SelectAnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    let view = academy
        .attempts
        .update(id, session.access_code(), |a| {
            a.select_answer(req.question_index, req.option_index)
        })
        .await?;
    Ok(Json(view))
}

pub async fn next_question(
    State(academy): State<Arc<Academy>>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let view = academy
        .attempts
        .update(id, session.access_code(), |a| {
            a.next();
            Ok(())
        })
        .await?;
    Ok(Json(view))
}

pub async fn previous_question(
    State(academy): State<Arc<Academy>>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let view = academy
        .attempts
        .update(id, session.access_code(), |a| {
            a.previous();
            Ok(())
        })
        .await?;
    Ok(Json(view))
}

/// Scores the attempt and persists the result.
///
/// * Appends a history entry.
/// * Keeps the best score per course.
/// * Certifies the course at 70% or more.
pub async fn finish_attempt(
    State(academy): State<Arc<Academy>>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let mut attempt = academy.attempts.take(id, session.access_code()).await?;

    let _guard = academy.exclusive().await;
    match academy.assessment.finish(&mut attempt).await {
        Ok(outcome) => Ok(Json(outcome)),
        Err(e) => {
            tracing::error!("Failed to finish attempt {}: {:?}", id, e);
            academy.attempts.restore(attempt).await;
            Err(e)
        }
    }
}

/// Finished attempts, most recent first.
pub async fn get_history(State(academy): State<Arc<Academy>>) -> Result<impl IntoResponse, AppError> {
    let mut history = academy.assessment.history().await?;
    history.reverse();
    Ok(Json(history))
}

/// Attempt count, average and best percentages, certified catalog courses.
pub async fn get_analytics(
    State(academy): State<Arc<Academy>>,
    Extension(session): Extension<Session>,
) -> Result<impl IntoResponse, AppError> {
    let analytics = academy.assessment.analytics(session.access_code()).await?;
    Ok(Json(analytics))
}
