// src/handlers/auth.rs

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::{
    error::AppError,
    models::user::LoginRequest,
    services::{Academy, access::route_for_role},
};

/// Authenticates an access code and opens the session.
///
/// Returns the session snapshot and the portal the role is routed to.
/// Unknown codes yield 401, disabled ones 403.
pub async fn login(
    State(academy): State<Arc<Academy>>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let _guard = academy.exclusive().await;
    let session = academy.sessions.login(&payload.access_code).await?;
    let route = route_for_role(session.user.role);

    Ok(Json(json!({
        "session": session,
        "route": route,
    })))
}

/// Clears the session unconditionally.
pub async fn logout(State(academy): State<Arc<Academy>>) -> Result<impl IntoResponse, AppError> {
    let _guard = academy.exclusive().await;
    academy.sessions.logout().await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Returns the persisted session snapshot as-is.
pub async fn current_session(
    State(academy): State<Arc<Academy>>,
) -> Result<impl IntoResponse, AppError> {
    let session = academy
        .sessions
        .current_session()
        .await?
        .ok_or_else(|| AppError::AuthError("Not logged in".to_string()))?;

    Ok(Json(session))
}

/// Looks up an access code without logging in.
pub async fn verify_code(
    State(academy): State<Arc<Academy>>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let info = academy
        .directory
        .verify_access_code(&payload.access_code)
        .await?;
    Ok(Json(info))
}

/// Registers one tap on the staff trigger.
pub async fn staff_tap(State(academy): State<Arc<Academy>>) -> impl IntoResponse {
    let prompt_pin = academy.taps.lock().await.register(Utc::now());
    Json(json!({ "promptPin": prompt_pin }))
}

#[derive(Debug, Deserialize)]
pub struct StaffPinRequest {
    pub pin: String,
}

/// Checks the staff PIN and returns the staff route on success.
/// Only accepted once the tap sequence has opened the prompt.
pub async fn staff_pin(
    State(academy): State<Arc<Academy>>,
    Json(payload): Json<StaffPinRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut taps = academy.taps.lock().await;
    let route = academy.bypass.unlock(&mut taps, &payload.pin)?;
    Ok(Json(json!({ "route": route })))
}
