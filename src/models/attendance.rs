// src/models/attendance.rs

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Presence records for one course offering.
///
/// A missing date under a student means "not yet marked"; `false` is an
/// explicit absence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceData {
    pub course_code: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Session calendar, fixed at initialization.
    pub days: Vec<NaiveDate>,
    #[serde(default)]
    pub records: BTreeMap<String, BTreeMap<NaiveDate, bool>>,
}

/// Paid flags per student access code, then per month abbreviation ("Jan").
pub type PaymentLedger = BTreeMap<String, BTreeMap<String, bool>>;

/// Attendance figures for one student, with the staff display thresholds.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceSummary {
    pub student_code: String,
    pub total_days: usize,
    pub absences: usize,
    pub rate: f64,
    /// Absences reached the warning threshold.
    pub warning: bool,
    /// Rate at or above the display pass line.
    pub passing: bool,
}

/// DTO for a staff attendance write.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkAttendanceRequest {
    pub student_code: String,
    pub date: NaiveDate,
    pub present: bool,
}
