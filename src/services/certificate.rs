// src/services/certificate.rs

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    config::PASSING_SCORE_PERCENTAGE,
    error::AppError,
    models::{certificate::CertificateRecord, user::UserRecord},
};

/// Remote document store holding certificates by id.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn put(&self, id: &str, record: &CertificateRecord) -> Result<(), AppError>;

    async fn get(&self, id: &str) -> Result<Option<CertificateRecord>, AppError>;
}

/// Document store over plain HTTP: `PUT/GET {base}/certificates/{id}` with JSON bodies.
pub struct HttpDocumentStore {
    http: reqwest::Client,
    base_url: String,
}

impl HttpDocumentStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, id: &str) -> String {
        format!("{}/certificates/{}", self.base_url, id)
    }
}

#[async_trait]
impl DocumentStore for HttpDocumentStore {
    async fn put(&self, id: &str, record: &CertificateRecord) -> Result<(), AppError> {
        self.http
            .put(self.url(id))
            .json(record)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AppError::RemoteWriteFailed(e.to_string()))?;
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<CertificateRecord>, AppError> {
        let response = self
            .http
            .get(self.url(id))
            .send()
            .await
            .map_err(|e| AppError::InternalServerError(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let record = response
            .error_for_status()
            .map_err(|e| AppError::InternalServerError(e.to_string()))?
            .json()
            .await
            .map_err(|e| AppError::InternalServerError(e.to_string()))?;
        Ok(Some(record))
    }
}

/// In-process document store, used when no remote store is configured.
#[derive(Default)]
pub struct MemoryDocumentStore {
    documents: RwLock<HashMap<String, CertificateRecord>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn put(&self, id: &str, record: &CertificateRecord) -> Result<(), AppError> {
        self.documents
            .write()
            .await
            .insert(id.to_string(), record.clone());
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<CertificateRecord>, AppError> {
        Ok(self.documents.read().await.get(id).cloned())
    }
}

/// `WA-CERT-{year}-{6 random digits}`.
pub fn generate_certificate_id(now: DateTime<Utc>) -> String {
    let bytes = Uuid::new_v4().into_bytes();
    let random = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) % 1_000_000;
    format!("WA-CERT-{}-{:06}", now.year(), random)
}

/// Bridges quiz eligibility to the remote certificate registry.
#[derive(Clone)]
pub struct CertificateService {
    documents: Arc<dyn DocumentStore>,
}

impl CertificateService {
    pub fn new(documents: Arc<dyn DocumentStore>) -> Self {
        Self { documents }
    }

    /// Issues a certificate for a course the user passed.
    ///
    /// Remote registration is best-effort: a failed write is logged and the
    /// record is still returned, so `verify` may not find it later.
    pub async fn issue(
        &self,
        user: &UserRecord,
        course_id: &str,
        course_name: &str,
    ) -> Result<CertificateRecord, AppError> {
        let score = user.best_score(course_id);
        if score < PASSING_SCORE_PERCENTAGE {
            return Err(AppError::Forbidden(format!(
                "Certificate locked (minimum {}%, best score {}%)",
                PASSING_SCORE_PERCENTAGE, score
            )));
        }

        let now = Utc::now();
        let record = CertificateRecord {
            cert_id: generate_certificate_id(now),
            student: user.name.clone(),
            course: course_name.to_string(),
            level: "Professional".to_string(),
            issue_date: now.format("%Y-%m-%d").to_string(),
            created_at: now,
        };

        match self.documents.put(&record.cert_id, &record).await {
            Ok(()) => tracing::info!(
                "Certificate {} registered for {}",
                record.cert_id,
                user.access_code
            ),
            Err(e) => tracing::warn!(
                "Certificate {} issued but not registered: {}",
                record.cert_id,
                e
            ),
        }

        Ok(record)
    }

    /// Remote lookup by id. Read failures are reported as "not found".
    pub async fn verify(&self, cert_id: &str) -> Option<CertificateRecord> {
        match self.documents.get(cert_id.trim()).await {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!("Certificate lookup for {} failed: {}", cert_id, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::models::user::Role;
    use crate::utils::codes::is_certificate_id;

    struct FailingStore;

    #[async_trait]
    impl DocumentStore for FailingStore {
        async fn put(&self, _id: &str, _record: &CertificateRecord) -> Result<(), AppError> {
            Err(AppError::RemoteWriteFailed("offline".to_string()))
        }

        async fn get(&self, _id: &str) -> Result<Option<CertificateRecord>, AppError> {
            Ok(None)
        }
    }

    fn user_with_score(score: u32) -> UserRecord {
        UserRecord {
            access_code: "WA-INF-2025-0001".to_string(),
            name: "Bertony Pompee".to_string(),
            role: Role::Student,
            course: Some("Informatique".to_string()),
            course_code: Some("INF-001".to_string()),
            access: true,
            editable_name: false,
            photo: None,
            quiz_scores: BTreeMap::from([("informatique".to_string(), score)]),
            courses: Vec::new(),
            last_active_course: None,
            created_at: None,
        }
    }

    #[test]
    fn test_certificate_id_format() {
        let id = generate_certificate_id(Utc::now());
        assert!(is_certificate_id(&id), "{}", id);
    }

    #[tokio::test]
    async fn test_issue_then_verify() {
        let service = CertificateService::new(Arc::new(MemoryDocumentStore::new()));
        let record = service
            .issue(&user_with_score(80), "informatique", "Informatique")
            .await
            .unwrap();

        assert_eq!(service.verify(&record.cert_id).await, Some(record));
    }

    #[tokio::test]
    async fn test_issue_requires_passing_score() {
        let service = CertificateService::new(Arc::new(MemoryDocumentStore::new()));
        let result = service
            .issue(&user_with_score(69), "informatique", "Informatique")
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_remote_failure_still_delivers_certificate() {
        let service = CertificateService::new(Arc::new(FailingStore));
        let record = service
            .issue(&user_with_score(100), "informatique", "Informatique")
            .await
            .unwrap();

        assert_eq!(record.student, "Bertony Pompee");
        assert!(service.verify(&record.cert_id).await.is_none());
    }
}
