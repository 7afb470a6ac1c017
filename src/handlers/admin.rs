// src/handlers/admin.rs

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    error::AppError,
    services::{Academy, directory::roster_stats, seed::ATTENDANCE_COURSE_CODE},
    utils::codes::{is_access_code, normalize_access_code},
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentListParams {
    pub course_code: Option<String>,
}

/// Lists the students of one course offering with active/disabled counts.
/// Staff only.
pub async fn list_students(
    State(academy): State<Arc<Academy>>,
    Query(params): Query<StudentListParams>,
) -> Result<impl IntoResponse, AppError> {
    let course_code = params
        .course_code
        .unwrap_or_else(|| ATTENDANCE_COURSE_CODE.to_string());
    let students = academy.directory.list_students(&course_code).await?;
    let stats = roster_stats(&students);

    Ok(Json(json!({
        "courseCode": course_code,
        "stats": stats,
        "students": students,
    })))
}

/// Enables or disables a login.
/// Staff only. Sessions already open stay valid until logout.
pub async fn toggle_access(
    State(academy): State<Arc<Academy>>,
    Path(code): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let code = normalize_access_code(&code);
    if !is_access_code(&code) {
        return Err(AppError::BadRequest(format!("Malformed access code '{}'", code)));
    }

    let _guard = academy.exclusive().await;
    let user = academy.access.toggle_access(&code).await?;
    Ok(Json(user))
}
