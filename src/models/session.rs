// src/models/session.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::user::UserRecord;

/// Snapshot of a directory record taken at login.
///
/// Not re-validated against the directory: a record disabled after login keeps
/// its session until logout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user: UserRecord,

    /// Enrolled course offering as a one-element list, empty for staff.
    pub enrolled_courses: Vec<String>,

    pub logged_in_at: DateTime<Utc>,
}

impl Session {
    pub fn from_record(user: UserRecord, logged_in_at: DateTime<Utc>) -> Self {
        let enrolled_courses = user.course_code.iter().cloned().collect();
        Self {
            user,
            enrolled_courses,
            logged_in_at,
        }
    }

    pub fn access_code(&self) -> &str {
        &self.user.access_code
    }
}
