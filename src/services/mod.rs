// src/services/mod.rs

pub mod access;
pub mod assessment;
pub mod attendance;
pub mod catalog;
pub mod certificate;
pub mod directory;
pub mod quiz_generator;
pub mod seed;
pub mod session;

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};

use crate::{
    config::Config,
    error::AppError,
    models::{session::Session, user::UserPatch},
    store::SharedStore,
};

use self::{
    access::{AccessGate, StaffBypass, TapCounter},
    assessment::{AssessmentEngine, AttemptRegistry},
    attendance::{AttendanceLedger, AttendanceOffering},
    certificate::{CertificateService, DocumentStore},
    directory::DirectoryStore,
    quiz_generator::{QuestionGenerator, QuizGenerationService},
    session::SessionManager,
};

/// All core components, wired over one shared store.
pub struct Academy {
    pub directory: DirectoryStore,
    pub sessions: SessionManager,
    pub attendance: AttendanceLedger,
    pub assessment: AssessmentEngine,
    pub access: AccessGate,
    pub certificates: CertificateService,
    pub generator: QuizGenerationService,
    pub attempts: AttemptRegistry,
    pub bypass: StaffBypass,
    pub taps: Mutex<TapCounter>,
    writer: Mutex<()>,
}

impl Academy {
    pub fn new(
        store: SharedStore,
        documents: Arc<dyn DocumentStore>,
        generator: Arc<dyn QuestionGenerator>,
        config: &Config,
    ) -> Self {
        let directory = DirectoryStore::new(store.clone());
        let sessions = SessionManager::new(store.clone(), directory.clone());

        Self {
            attendance: AttendanceLedger::new(store.clone(), AttendanceOffering::informatique()),
            assessment: AssessmentEngine::new(store, directory.clone(), sessions.clone()),
            access: AccessGate::new(directory.clone()),
            certificates: CertificateService::new(documents),
            generator: QuizGenerationService::new(generator),
            attempts: AttemptRegistry::new(),
            bypass: StaffBypass::new(config.staff_pin.clone()),
            taps: Mutex::new(TapCounter::default()),
            writer: Mutex::new(()),
            directory,
            sessions,
        }
    }

    /// Seeds the directory and the attendance ledger. Safe to call repeatedly.
    pub async fn initialize(&self) -> Result<(), AppError> {
        let _guard = self.exclusive().await;
        self.directory.initialize().await?;
        self.attendance.initialize().await?;
        Ok(())
    }

    /// Writes a self-service profile change to the directory and mirrors it
    /// into the session only when `access_code` is the one logged in.
    ///
    /// Callers hold `exclusive()`.
    pub async fn update_profile(
        &self,
        access_code: &str,
        patch: &UserPatch,
    ) -> Result<Option<Session>, AppError> {
        let user = self
            .directory
            .upsert_field(access_code, patch)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        self.sessions.refresh_if_current(&user.access_code, patch).await
    }

    /// Serializes read-modify-write sequences against the store.
    pub async fn exclusive(&self) -> MutexGuard<'_, ()> {
        self.writer.lock().await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        services::{certificate::MemoryDocumentStore, quiz_generator::DisabledGenerator},
        store::MemoryStore,
    };

    async fn academy() -> Academy {
        let academy = Academy::new(
            Arc::new(MemoryStore::new()),
            Arc::new(MemoryDocumentStore::new()),
            Arc::new(DisabledGenerator),
            &Config::default(),
        );
        academy.initialize().await.unwrap();
        academy
    }

    fn rename(name: &str) -> UserPatch {
        UserPatch {
            name: Some(name.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_profile_update_refreshes_own_session() {
        let academy = academy().await;
        academy.sessions.login("WA-CAN-2025-0010").await.unwrap();

        let session = academy
            .update_profile("WA-CAN-2025-0010", &rename("Marie Joseph"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(session.user.name, "Marie Joseph");
    }

    #[tokio::test]
    async fn test_profile_update_leaves_other_session_alone() {
        let academy = academy().await;
        academy.sessions.login("WA-CAN-2025-0011").await.unwrap();

        // The writer's session was replaced by another login in between
        let refreshed = academy
            .update_profile("WA-CAN-2025-0010", &rename("Marie Joseph"))
            .await
            .unwrap();
        assert!(refreshed.is_none());

        let current = academy.sessions.current_session().await.unwrap().unwrap();
        assert_eq!(current.access_code(), "WA-CAN-2025-0011");
        assert_eq!(current.user.name, "Student WA-CAN-2025-0011");

        let record = academy
            .directory
            .find_by_access_code("WA-CAN-2025-0010")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.name, "Marie Joseph");
    }

    #[tokio::test]
    async fn test_profile_update_unknown_code() {
        let academy = academy().await;
        let err = academy
            .update_profile("WA-NOPE-2025-0001", &rename("X"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
