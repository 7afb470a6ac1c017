use std::sync::Arc;

use axum::{Extension, Json, extract::State, response::IntoResponse};
use url::Url;
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        session::Session,
        user::{UpdateNameRequest, UpdatePhotoRequest, UserPatch},
    },
    services::Academy,
    utils::html::clean_html,
};

/// Get the current user's directory record.
pub async fn get_profile(
    State(academy): State<Arc<Academy>>,
    Extension(session): Extension<Session>,
) -> Result<impl IntoResponse, AppError> {
    let user = academy
        .directory
        .find_by_access_code(session.access_code())
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}

/// Renames a self-service record. Official roster names are read-only.
pub async fn update_name(
    State(academy): State<Arc<Academy>>,
    Extension(session): Extension<Session>,
    Json(payload): Json<UpdateNameRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let name = clean_html(payload.name.trim());
    if name.is_empty() {
        return Err(AppError::BadRequest("Name cannot be empty".to_string()));
    }

    let _guard = academy.exclusive().await;
    let user = academy
        .directory
        .find_by_access_code(session.access_code())
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    if !user.editable_name {
        return Err(AppError::Forbidden(
            "This name is managed by the administration".to_string(),
        ));
    }

    let patch = UserPatch {
        name: Some(name),
        ..Default::default()
    };
    let session = academy.update_profile(&user.access_code, &patch).await?;

    Ok(Json(session))
}

fn is_acceptable_photo(photo: &str) -> bool {
    if photo.starts_with("data:image/") {
        return true;
    }
    Url::parse(photo)
        .map(|u| matches!(u.scheme(), "http" | "https"))
        .unwrap_or(false)
}

/// Stores a profile photo reference (http(s) URL or image data URI).
pub async fn update_photo(
    State(academy): State<Arc<Academy>>,
    Extension(session): Extension<Session>,
    Json(payload): Json<UpdatePhotoRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let photo = payload.photo.trim();
    if !is_acceptable_photo(photo) {
        return Err(AppError::BadRequest(
            "Photo must be an http(s) URL or an image data URI".to_string(),
        ));
    }

    let _guard = academy.exclusive().await;
    let patch = UserPatch {
        photo: Some(photo.to_string()),
        ..Default::default()
    };
    let session = academy.update_profile(session.access_code(), &patch).await?;

    Ok(Json(session))
}
