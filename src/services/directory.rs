// src/services/directory.rs

use std::collections::HashSet;

use crate::{
    error::AppError,
    models::user::{AccessCodeInfo, Role, RosterStats, UserPatch, UserRecord},
    store::{DIRECTORY_KEY, SharedStore, load_json, save_json},
    utils::codes::normalize_access_code,
};

use super::seed::seed_records;

/// Owns the access-code → record mapping.
#[derive(Clone)]
pub struct DirectoryStore {
    store: SharedStore,
}

impl DirectoryStore {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Loads the whole directory. Missing or malformed content yields an empty list.
    pub async fn load(&self) -> Result<Vec<UserRecord>, AppError> {
        Ok(load_json(self.store.as_ref(), DIRECTORY_KEY)
            .await?
            .unwrap_or_default())
    }

    async fn save(&self, records: &[UserRecord]) -> Result<(), AppError> {
        save_json(self.store.as_ref(), DIRECTORY_KEY, records).await
    }

    /// Inserts every seed record whose access code is absent.
    ///
    /// Existing records are never overwritten, so repeated calls converge on
    /// the same directory. Returns the number of records inserted.
    pub async fn initialize(&self) -> Result<usize, AppError> {
        let mut records = self.load().await?;
        let mut known: HashSet<String> = records
            .iter()
            .map(|u| normalize_access_code(&u.access_code))
            .collect();

        let mut inserted = 0;
        for record in seed_records() {
            if known.insert(normalize_access_code(&record.access_code)) {
                records.push(record);
                inserted += 1;
            }
        }

        if inserted > 0 {
            self.save(&records).await?;
            tracing::info!(
                "Directory synchronized: {} records inserted, {} total",
                inserted,
                records.len()
            );
        }

        Ok(inserted)
    }

    /// Case-insensitive, whitespace-trimmed exact lookup.
    pub async fn find_by_access_code(&self, code: &str) -> Result<Option<UserRecord>, AppError> {
        let wanted = normalize_access_code(code);
        Ok(self
            .load()
            .await?
            .into_iter()
            .find(|u| normalize_access_code(&u.access_code) == wanted))
    }

    /// Applies `patch` to the record under `code`.
    ///
    /// Unknown codes are a silent no-op and return `None`. The session copy is
    /// not touched here; callers refresh it themselves.
    pub async fn upsert_field(
        &self,
        code: &str,
        patch: &UserPatch,
    ) -> Result<Option<UserRecord>, AppError> {
        let wanted = normalize_access_code(code);
        let mut records = self.load().await?;

        let Some(record) = records
            .iter_mut()
            .find(|u| normalize_access_code(&u.access_code) == wanted)
        else {
            return Ok(None);
        };

        patch.apply(record);
        let updated = record.clone();
        self.save(&records).await?;

        Ok(Some(updated))
    }

    /// Looks up public facts about a code without opening a session.
    pub async fn verify_access_code(&self, code: &str) -> Result<AccessCodeInfo, AppError> {
        let info = match self.find_by_access_code(code).await? {
            Some(user) => AccessCodeInfo {
                valid: true,
                name: Some(user.name),
                role: Some(user.role),
                course: user.course,
                access: Some(user.access),
            },
            None => AccessCodeInfo {
                valid: false,
                name: None,
                role: None,
                course: None,
                access: None,
            },
        };
        Ok(info)
    }

    /// Students enrolled in `course_code`, in directory order.
    pub async fn list_students(&self, course_code: &str) -> Result<Vec<UserRecord>, AppError> {
        Ok(self
            .load()
            .await?
            .into_iter()
            .filter(|u| u.role == Role::Student && u.course_code.as_deref() == Some(course_code))
            .collect())
    }
}

pub fn roster_stats(students: &[UserRecord]) -> RosterStats {
    let active = students.iter().filter(|s| s.access).count();
    RosterStats {
        total: students.len(),
        active,
        disabled: students.len() - active,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::store::{KeyValueStore, MemoryStore};

    fn directory() -> (Arc<MemoryStore>, DirectoryStore) {
        let store = Arc::new(MemoryStore::new());
        (store.clone(), DirectoryStore::new(store))
    }

    #[tokio::test]
    async fn test_initialize_seeds_expected_size() {
        let (_, dir) = directory();
        let inserted = dir.initialize().await.unwrap();

        // 2 staff + 7 offerings x 100 codes; the official roster shadows 13 INF codes.
        assert_eq!(inserted, 702);
        assert_eq!(dir.load().await.unwrap().len(), 702);
    }

    #[tokio::test]
    async fn test_official_roster_wins_over_generated_codes() {
        let (_, dir) = directory();
        dir.initialize().await.unwrap();

        let user = dir.find_by_access_code("WA-INF-2025-0013").await.unwrap().unwrap();
        assert_eq!(user.name, "Evelyne Dormeus");
        assert!(!user.editable_name);

        let user = dir.find_by_access_code("WA-INF-2025-0014").await.unwrap().unwrap();
        assert_eq!(user.name, "Student WA-INF-2025-0014");
        assert!(user.editable_name);
    }

    #[tokio::test]
    async fn test_initialize_keeps_existing_records() {
        let (_, dir) = directory();
        dir.initialize().await.unwrap();
        dir.upsert_field(
            "WA-CAN-2025-0005",
            &UserPatch {
                name: Some("Marie Joseph".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(dir.initialize().await.unwrap(), 0);
        let user = dir.find_by_access_code("WA-CAN-2025-0005").await.unwrap().unwrap();
        assert_eq!(user.name, "Marie Joseph");
    }

    #[tokio::test]
    async fn test_malformed_directory_is_reseeded() {
        let (store, dir) = directory();
        store.set(DIRECTORY_KEY, "[{\"broken\":").await.unwrap();

        assert_eq!(dir.initialize().await.unwrap(), 702);
    }

    #[tokio::test]
    async fn test_lookup_is_case_insensitive_and_trimmed() {
        let (_, dir) = directory();
        dir.initialize().await.unwrap();

        let user = dir.find_by_access_code("  wa-prof-2025-0001\n").await.unwrap();
        assert_eq!(user.map(|u| u.role), Some(Role::Professor));
    }

    #[tokio::test]
    async fn test_upsert_unknown_code_is_noop() {
        let (_, dir) = directory();
        dir.initialize().await.unwrap();
        let before = dir.load().await.unwrap();

        let result = dir
            .upsert_field(
                "WA-NOPE-2025-0001",
                &UserPatch {
                    access: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(result.is_none());
        assert_eq!(dir.load().await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_list_students_and_stats() {
        let (_, dir) = directory();
        dir.initialize().await.unwrap();
        dir.upsert_field(
            "WA-SUB-2025-0002",
            &UserPatch {
                access: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let students = dir.list_students("SUB-001").await.unwrap();
        assert_eq!(
            roster_stats(&students),
            RosterStats {
                total: 100,
                active: 99,
                disabled: 1
            }
        );
    }
}
