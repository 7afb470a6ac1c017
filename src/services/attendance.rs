// src/services/attendance.rs

use chrono::NaiveDate;

use crate::{
    config::{ABSENCE_WARNING_THRESHOLD, ATTENDANCE_PASS_RATE},
    error::AppError,
    models::attendance::{AttendanceData, AttendanceSummary, PaymentLedger},
    store::{PAYMENT_LEDGER_KEY, SharedStore, attendance_key, load_json, save_json},
    utils::codes::normalize_access_code,
};

use super::seed::{ATTENDANCE_COURSE_CODE, attendance_days};

/// Calendar of the tracked course offering.
#[derive(Debug, Clone)]
pub struct AttendanceOffering {
    pub course_code: String,
    pub days: Vec<NaiveDate>,
}

impl AttendanceOffering {
    /// The Informatique offering, Saturdays from December to April.
    pub fn informatique() -> Self {
        Self {
            course_code: ATTENDANCE_COURSE_CODE.to_string(),
            days: attendance_days(),
        }
    }

    fn fresh_ledger(&self) -> AttendanceData {
        let first = self.days.first().copied().unwrap_or_default();
        let last = self.days.last().copied().unwrap_or(first);
        AttendanceData {
            course_code: self.course_code.clone(),
            start_date: first,
            end_date: last,
            days: self.days.clone(),
            records: Default::default(),
        }
    }
}

/// Explicit absences (`false`) on calendar days. Unmarked days are not absences.
pub fn absence_count(data: &AttendanceData, student_code: &str) -> usize {
    let Some(records) = data.records.get(student_code) else {
        return 0;
    };
    data.days
        .iter()
        .filter(|d| records.get(d) == Some(&false))
        .count()
}

/// `(days - absences) / days * 100`. Unmarked days count as present.
/// An empty calendar is treated as one day, so it reads as 100%.
pub fn attendance_rate(data: &AttendanceData, student_code: &str) -> f64 {
    let total = data.days.len().max(1);
    let absences = absence_count(data, student_code);
    (total - absences) as f64 / total as f64 * 100.0
}

pub fn summarize(data: &AttendanceData, student_code: &str) -> AttendanceSummary {
    let absences = absence_count(data, student_code);
    let rate = attendance_rate(data, student_code);
    AttendanceSummary {
        student_code: student_code.to_string(),
        total_days: data.days.len(),
        absences,
        rate,
        warning: absences >= ABSENCE_WARNING_THRESHOLD,
        passing: rate >= ATTENDANCE_PASS_RATE,
    }
}

/// Owns the presence records of one course offering.
#[derive(Clone)]
pub struct AttendanceLedger {
    store: SharedStore,
    offering: AttendanceOffering,
}

impl AttendanceLedger {
    pub fn new(store: SharedStore, offering: AttendanceOffering) -> Self {
        Self { store, offering }
    }

    pub fn course_code(&self) -> &str {
        &self.offering.course_code
    }

    fn key(&self) -> String {
        attendance_key(&self.offering.course_code)
    }

    /// Writes an empty ledger when none (or an unreadable one) is stored.
    /// Returns whether a ledger was written.
    pub async fn initialize(&self) -> Result<bool, AppError> {
        let existing: Option<AttendanceData> = load_json(self.store.as_ref(), &self.key()).await?;
        if existing.is_some() {
            return Ok(false);
        }

        save_json(self.store.as_ref(), &self.key(), &self.offering.fresh_ledger()).await?;
        tracing::info!("Attendance ledger seeded for {}", self.offering.course_code);
        Ok(true)
    }

    /// Current ledger, reseeding it first if it is missing or unreadable.
    pub async fn load(&self) -> Result<AttendanceData, AppError> {
        if let Some(data) = load_json(self.store.as_ref(), &self.key()).await? {
            return Ok(data);
        }

        let data = self.offering.fresh_ledger();
        save_json(self.store.as_ref(), &self.key(), &data).await?;
        Ok(data)
    }

    /// Records presence for one student on one calendar day.
    ///
    /// * `BadRequest` when `date` is not a session day.
    /// * `PaymentRequired` when a payment ledger exists and explicitly marks
    ///   the month of `date` unpaid for the student. Without a payment
    ///   ledger the write always goes through.
    pub async fn mark_attendance(
        &self,
        student_code: &str,
        date: NaiveDate,
        present: bool,
    ) -> Result<AttendanceData, AppError> {
        let student_code = normalize_access_code(student_code);
        let mut data = self.load().await?;

        if !data.days.contains(&date) {
            return Err(AppError::BadRequest(format!(
                "{} is not a session date of {}",
                date, data.course_code
            )));
        }

        let month = date.format("%b").to_string();
        let payments: Option<PaymentLedger> =
            load_json(self.store.as_ref(), PAYMENT_LEDGER_KEY).await?;
        let unpaid = payments
            .as_ref()
            .and_then(|p| p.get(&student_code))
            .and_then(|months| months.get(&month))
            == Some(&false);
        if unpaid {
            tracing::warn!("Attendance for {} on {} blocked: {} unpaid", student_code, date, month);
            return Err(AppError::PaymentRequired { month });
        }

        data.records
            .entry(student_code)
            .or_default()
            .insert(date, present);
        save_json(self.store.as_ref(), &self.key(), &data).await?;

        Ok(data)
    }

    pub async fn absence_count(&self, student_code: &str) -> Result<usize, AppError> {
        let data = self.load().await?;
        Ok(absence_count(&data, &normalize_access_code(student_code)))
    }

    pub async fn attendance_rate(&self, student_code: &str) -> Result<f64, AppError> {
        let data = self.load().await?;
        Ok(attendance_rate(&data, &normalize_access_code(student_code)))
    }

    pub async fn summary(&self, student_code: &str) -> Result<AttendanceSummary, AppError> {
        let data = self.load().await?;
        Ok(summarize(&data, &normalize_access_code(student_code)))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::store::{KeyValueStore, MemoryStore};

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn ledger() -> (Arc<MemoryStore>, AttendanceLedger) {
        let store = Arc::new(MemoryStore::new());
        (
            store.clone(),
            AttendanceLedger::new(store, AttendanceOffering::informatique()),
        )
    }

    #[tokio::test]
    async fn test_seeded_calendar() {
        let (_, ledger) = ledger();
        assert!(ledger.initialize().await.unwrap());
        assert!(!ledger.initialize().await.unwrap());

        let data = ledger.load().await.unwrap();
        assert_eq!(data.days.len(), 21);
        assert_eq!(data.start_date, date("2025-12-06"));
        assert_eq!(data.end_date, date("2026-04-25"));
        assert!(data.records.is_empty());
    }

    #[tokio::test]
    async fn test_unmarked_days_count_as_present() {
        let (_, ledger) = ledger();
        ledger.mark_attendance("WA-INF-2025-0001", date("2025-12-06"), false).await.unwrap();
        ledger.mark_attendance("WA-INF-2025-0001", date("2025-12-13"), true).await.unwrap();

        assert_eq!(ledger.absence_count("WA-INF-2025-0001").await.unwrap(), 1);
        let rate = ledger.attendance_rate("WA-INF-2025-0001").await.unwrap();
        assert!((rate - 20.0 / 21.0 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_calendar_rate() {
        let data = AttendanceData {
            course_code: "INF-001".to_string(),
            start_date: date("2025-12-06"),
            end_date: date("2025-12-06"),
            days: Vec::new(),
            records: Default::default(),
        };
        assert_eq!(attendance_rate(&data, "WA-INF-2025-0001"), 100.0);
        assert!(summarize(&data, "WA-INF-2025-0001").passing);
    }

    #[tokio::test]
    async fn test_summary_flags() {
        let (_, ledger) = ledger();
        for d in ["2025-12-06", "2025-12-13", "2025-12-20"] {
            ledger.mark_attendance("WA-INF-2025-0002", date(d), false).await.unwrap();
        }

        let summary = ledger.summary("wa-inf-2025-0002").await.unwrap();
        assert_eq!(summary.absences, 3);
        assert!(summary.warning);
        assert!(summary.passing);
    }

    #[tokio::test]
    async fn test_remarking_overwrites() {
        let (_, ledger) = ledger();
        ledger.mark_attendance("WA-INF-2025-0003", date("2026-01-03"), false).await.unwrap();
        let data = ledger.mark_attendance("WA-INF-2025-0003", date("2026-01-03"), true).await.unwrap();

        assert_eq!(data.records["WA-INF-2025-0003"][&date("2026-01-03")], true);
        assert_eq!(absence_count(&data, "WA-INF-2025-0003"), 0);
    }

    #[tokio::test]
    async fn test_paid_month_allows_write() {
        let (store, ledger) = ledger();
        store
            .set(PAYMENT_LEDGER_KEY, r#"{"WA-INF-2025-0004":{"Jan":true,"Feb":false}}"#)
            .await
            .unwrap();

        assert!(ledger.mark_attendance("WA-INF-2025-0004", date("2026-01-10"), true).await.is_ok());
        let blocked = ledger.mark_attendance("WA-INF-2025-0004", date("2026-02-07"), true).await;
        assert!(matches!(blocked, Err(AppError::PaymentRequired { month }) if month == "Feb"));
    }

    #[tokio::test]
    async fn test_malformed_ledger_is_reseeded() {
        let (store, ledger) = ledger();
        store.set("attendance:INF-001", "{{{").await.unwrap();

        let data = ledger.load().await.unwrap();
        assert_eq!(data.days.len(), 21);
    }
}
