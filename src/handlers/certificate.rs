// src/handlers/certificate.rs

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    error::AppError,
    models::{certificate::IssueCertificateRequest, session::Session},
    services::{Academy, catalog},
    utils::codes::is_certificate_id,
};

/// Issues a certificate from the session's eligibility snapshot.
pub async fn issue_certificate(
    State(academy): State<Arc<Academy>>,
    Extension(session): Extension<Session>,
    Json(req): Json<IssueCertificateRequest>,
) -> Result<impl IntoResponse, AppError> {
    let course_name = catalog::find_course(&req.course_id)
        .map(|c| c.title.to_string())
        .unwrap_or_else(|| req.course_id.clone());

    let record = academy
        .certificates
        .issue(&session.user, &req.course_id, &course_name)
        .await?;

    Ok((StatusCode::CREATED, Json(record)))
}

/// Public lookup of a certificate by id.
pub async fn verify_certificate(
    State(academy): State<Arc<Academy>>,
    Path(cert_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let cert_id = cert_id.trim().to_uppercase();
    if !is_certificate_id(&cert_id) {
        return Err(AppError::BadRequest(format!("Malformed certificate id '{}'", cert_id)));
    }

    let record = academy
        .certificates
        .verify(&cert_id)
        .await
        .ok_or_else(|| AppError::NotFound("Certificate not found".to_string()))?;

    Ok(Json(record))
}
