// src/models/user.rs

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Directory role. Professors and admins reach the same staff views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Professor,
    Admin,
}

impl Role {
    pub fn is_staff(self) -> bool {
        matches!(self, Role::Professor | Role::Admin)
    }
}

/// One directory entry, keyed by its access code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    /// `PREFIX-YEAR-NNNN`. Never regenerated once assigned.
    pub access_code: String,

    pub name: String,

    pub role: Role,

    /// Display name of the enrolled course offering.
    #[serde(default)]
    pub course: Option<String>,

    /// Enrolled course offering; absent for staff.
    #[serde(default)]
    pub course_code: Option<String>,

    /// Login gate, toggled by staff.
    pub access: bool,

    /// False for official roster entries.
    pub editable_name: bool,

    #[serde(default)]
    pub photo: Option<String>,

    /// Best percentage per course id. Never lowered.
    #[serde(default)]
    pub quiz_scores: BTreeMap<String, u32>,

    /// Course ids certified at least once. Append-only.
    #[serde(default)]
    pub courses: Vec<String>,

    #[serde(default)]
    pub last_active_course: Option<String>,

    #[serde(default)]
    pub created_at: Option<String>,
}

impl UserRecord {
    pub fn best_score(&self, course_id: &str) -> u32 {
        self.quiz_scores.get(course_id).copied().unwrap_or(0)
    }
}

/// Partial update applied to one record. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserPatch {
    pub name: Option<String>,
    pub access: Option<bool>,
    pub photo: Option<String>,
    pub quiz_scores: Option<BTreeMap<String, u32>>,
    pub courses: Option<Vec<String>>,
    pub last_active_course: Option<String>,
}

impl UserPatch {
    pub fn apply(&self, user: &mut UserRecord) {
        if let Some(name) = &self.name {
            user.name = name.clone();
        }
        if let Some(access) = self.access {
            user.access = access;
        }
        if let Some(photo) = &self.photo {
            user.photo = Some(photo.clone());
        }
        if let Some(scores) = &self.quiz_scores {
            user.quiz_scores = scores.clone();
        }
        if let Some(courses) = &self.courses {
            user.courses = courses.clone();
        }
        if let Some(course_id) = &self.last_active_course {
            user.last_active_course = Some(course_id.clone());
        }
    }
}

/// Public facts about an access code, returned without logging in.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessCodeInfo {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access: Option<bool>,
}

/// Student counts for one course offering.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct RosterStats {
    pub total: usize,
    pub active: usize,
    pub disabled: usize,
}

/// DTO for user login.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 64))]
    pub access_code: String,
}

/// DTO for a self-service name change.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateNameRequest {
    #[validate(length(
        min = 1,
        max = 80,
        message = "Name length must be between 1 and 80 characters."
    ))]
    pub name: String,
}

/// DTO for a profile photo change: an http(s) URL or a `data:image/` URI.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePhotoRequest {
    #[validate(length(min = 1, max = 2_000_000))]
    pub photo: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student() -> UserRecord {
        UserRecord {
            access_code: "WA-CAN-2025-0001".to_string(),
            name: "Student WA-CAN-2025-0001".to_string(),
            role: Role::Student,
            course: Some("Canva Mastery".to_string()),
            course_code: Some("CAN-001".to_string()),
            access: true,
            editable_name: true,
            photo: None,
            quiz_scores: BTreeMap::new(),
            courses: Vec::new(),
            last_active_course: None,
            created_at: None,
        }
    }

    #[test]
    fn test_patch_only_touches_present_fields() {
        let mut user = student();
        let patch = UserPatch {
            access: Some(false),
            ..Default::default()
        };
        patch.apply(&mut user);

        assert!(!user.access);
        assert_eq!(user.name, "Student WA-CAN-2025-0001");
        assert!(user.photo.is_none());
    }

    #[test]
    fn test_record_tolerates_missing_optional_fields() {
        let raw = r#"{"accessCode":"WA-PROF-2025-0001","name":"Wanky Massenat","role":"professor","access":true,"editableName":false}"#;
        let user: UserRecord = serde_json::from_str(raw).unwrap();

        assert_eq!(user.role, Role::Professor);
        assert!(user.quiz_scores.is_empty());
        assert!(user.course_code.is_none());
    }

    #[test]
    fn test_staff_roles() {
        assert!(Role::Professor.is_staff());
        assert!(Role::Admin.is_staff());
        assert!(!Role::Student.is_staff());
    }
}
