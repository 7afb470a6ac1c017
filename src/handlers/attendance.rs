// src/handlers/attendance.rs

use std::sync::Arc;

use axum::{Extension, Json, extract::State, response::IntoResponse};
use serde_json::json;

use crate::{
    error::AppError,
    models::{attendance::MarkAttendanceRequest, session::Session},
    services::{
        Academy,
        attendance::summarize,
    },
};

/// Own attendance: calendar, marks and summary. Read-only for students.
pub async fn my_attendance(
    State(academy): State<Arc<Academy>>,
    Extension(session): Extension<Session>,
) -> Result<impl IntoResponse, AppError> {
    let data = academy.attendance.load().await?;
    let code = session.access_code();

    Ok(Json(json!({
        "courseCode": data.course_code,
        "days": data.days,
        "records": data.records.get(code).cloned().unwrap_or_default(),
        "summary": summarize(&data, code),
    })))
}

/// Full ledger with a summary for every enrolled student.
/// Staff only.
pub async fn get_ledger(State(academy): State<Arc<Academy>>) -> Result<impl IntoResponse, AppError> {
    let data = academy.attendance.load().await?;
    let students = academy.directory.list_students(&data.course_code).await?;
    let summaries: Vec<_> = students
        .iter()
        .map(|s| summarize(&data, &s.access_code))
        .collect();

    Ok(Json(json!({
        "ledger": data,
        "summaries": summaries,
    })))
}

/// Marks one student present or absent on a session day.
/// Staff only. Unpaid months block the write with 402.
pub async fn mark_attendance(
    State(academy): State<Arc<Academy>>,
    Json(req): Json<MarkAttendanceRequest>,
) -> Result<impl IntoResponse, AppError> {
    let _guard = academy.exclusive().await;

    let student = academy
        .directory
        .find_by_access_code(&req.student_code)
        .await?
        .ok_or_else(|| AppError::NotFound("Student not found".to_string()))?;

    if student.course_code.as_deref() != Some(academy.attendance.course_code()) {
        return Err(AppError::BadRequest(format!(
            "{} is not enrolled in {}",
            student.access_code,
            academy.attendance.course_code()
        )));
    }

    let data = academy
        .attendance
        .mark_attendance(&student.access_code, req.date, req.present)
        .await?;

    Ok(Json(summarize(&data, &student.access_code)))
}
