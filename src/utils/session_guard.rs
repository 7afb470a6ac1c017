// src/utils/session_guard.rs

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};

use crate::{models::session::Session, services::Academy};

/// Axum Middleware: Session.
///
/// Loads the persisted session and injects it into the request extensions.
/// Returns 401 Unauthorized when nobody is logged in.
pub async fn session_middleware(
    State(academy): State<Arc<Academy>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let session = academy
        .sessions
        .current_session()
        .await
        .map_err(|e| {
            tracing::error!("Failed to read session: {:?}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .ok_or(StatusCode::UNAUTHORIZED)?;

    req.extensions_mut().insert(session);
    Ok(next.run(req).await)
}

/// Axum Middleware: Staff Authorization.
///
/// Must be used AFTER `session_middleware`. Professors and admins pass,
/// students get 403 Forbidden.
pub async fn staff_middleware(req: Request<Body>, next: Next) -> Result<Response, StatusCode> {
    let session = req
        .extensions()
        .get::<Session>()
        .ok_or(StatusCode::UNAUTHORIZED)?;

    if !session.user.role.is_staff() {
        return Err(StatusCode::FORBIDDEN);
    }

    Ok(next.run(req).await)
}
