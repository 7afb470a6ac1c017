// src/services/session.rs

use chrono::Utc;

use crate::{
    error::AppError,
    models::{session::Session, user::UserPatch},
    store::{SESSION_KEY, SharedStore, load_json, save_json},
};

use super::directory::DirectoryStore;

/// Owns the "currently authenticated" snapshot.
#[derive(Clone)]
pub struct SessionManager {
    store: SharedStore,
    directory: DirectoryStore,
}

impl SessionManager {
    pub fn new(store: SharedStore, directory: DirectoryStore) -> Self {
        Self { store, directory }
    }

    /// Authenticates an access code and persists a fresh snapshot.
    ///
    /// * `InvalidCode` when no record matches.
    /// * `AccessRevoked` when the record exists but is disabled.
    pub async fn login(&self, access_code: &str) -> Result<Session, AppError> {
        let user = self
            .directory
            .find_by_access_code(access_code)
            .await?
            .ok_or(AppError::InvalidCode)?;

        if !user.access {
            tracing::warn!("Login refused for disabled code {}", user.access_code);
            return Err(AppError::AccessRevoked);
        }

        let session = Session::from_record(user, Utc::now());
        save_json(self.store.as_ref(), SESSION_KEY, &session).await?;
        tracing::info!(
            "Session opened for {} ({:?})",
            session.user.access_code,
            session.user.role
        );

        Ok(session)
    }

    /// Reads the persisted snapshot without re-checking the directory.
    pub async fn current_session(&self) -> Result<Option<Session>, AppError> {
        load_json(self.store.as_ref(), SESSION_KEY).await
    }

    pub async fn logout(&self) -> Result<(), AppError> {
        self.store.remove(SESSION_KEY).await
    }

    /// Mirrors a directory write into the snapshot.
    ///
    /// Must follow every directory mutation that affects the logged-in user.
    /// Returns the refreshed session, or `None` when nobody is logged in.
    pub async fn update_session_field(&self, patch: &UserPatch) -> Result<Option<Session>, AppError> {
        let Some(mut session) = self.current_session().await? else {
            return Ok(None);
        };

        patch.apply(&mut session.user);
        save_json(self.store.as_ref(), SESSION_KEY, &session).await?;

        Ok(Some(session))
    }

    /// Like `update_session_field`, but only when `access_code` is the logged-in user.
    pub async fn refresh_if_current(
        &self,
        access_code: &str,
        patch: &UserPatch,
    ) -> Result<Option<Session>, AppError> {
        match self.current_session().await? {
            Some(session) if session.user.access_code.eq_ignore_ascii_case(access_code.trim()) => {
                self.update_session_field(patch).await
            }
            _ => Ok(None),
        }
    }
}
