// src/models/certificate.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Document registered in the remote certificate store, keyed by `cert_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateRecord {
    pub cert_id: String,
    pub student: String,
    pub course: String,
    pub level: String,
    pub issue_date: String,
    pub created_at: DateTime<Utc>,
}

/// DTO for requesting a certificate.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueCertificateRequest {
    pub course_id: String,
}
