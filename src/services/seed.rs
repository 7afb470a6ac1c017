// src/services/seed.rs

//! Fixed first-run content: staff accounts, the official roster, generated
//! course-offering codes and the attendance calendar.

use chrono::NaiveDate;

use crate::models::user::{Role, UserRecord};
use crate::utils::codes::sequential_access_code;

/// Codes generated per course offering.
pub const CODES_PER_OFFERING: u32 = 100;

pub const SEED_CREATED_AT: &str = "2025-01-01";

pub struct CourseOffering {
    pub course: &'static str,
    pub course_code: &'static str,
    pub prefix: &'static str,
}

pub const COURSE_OFFERINGS: &[CourseOffering] = &[
    CourseOffering { course: "Informatique", course_code: "INF-001", prefix: "WA-INF-2025-" },
    CourseOffering { course: "Canva Mastery", course_code: "CAN-001", prefix: "WA-CAN-2025-" },
    CourseOffering { course: "WordPress de A à Z", course_code: "WP-001", prefix: "WA-WP-2025-" },
    CourseOffering { course: "Création de Radio en Ligne", course_code: "RAD-001", prefix: "WA-RAD-2025-" },
    CourseOffering { course: "Master Réseaux Sociaux", course_code: "SOC-001", prefix: "WA-SOC-2025-" },
    CourseOffering { course: "Sublimation", course_code: "SUB-001", prefix: "WA-SUB-2025-" },
    CourseOffering { course: "Tableaux Personnalisés", course_code: "TAB-001", prefix: "WA-TAB-2025-" },
];

/// Official roster of the Informatique offering, in code order from 0001.
pub const OFFICIAL_INF_ROSTER: &[&str] = &[
    "Bertony Pompee",
    "Bonhomme Semexant",
    "Cherline Dieudone",
    "Darenky Ciceus",
    "Emirlens Lliome Est",
    "Germinal Wichiglaine",
    "Jude Lormestoire",
    "Kerline Dieudone",
    "Nahima Dieudonne",
    "Philippe Ciceus",
    "Sophanie Altidor",
    "Tinor Jesulien",
    "Evelyne Dormeus",
];

/// Offering whose attendance is tracked.
pub const ATTENDANCE_COURSE_CODE: &str = "INF-001";

const ATTENDANCE_DATES_INF: &[&str] = &[
    "2025-12-06", "2025-12-13", "2025-12-20", "2025-12-27",
    "2026-01-03", "2026-01-10", "2026-01-17", "2026-01-24", "2026-01-31",
    "2026-02-07", "2026-02-14", "2026-02-21", "2026-02-28",
    "2026-03-07", "2026-03-14", "2026-03-21", "2026-03-28",
    "2026-04-04", "2026-04-11", "2026-04-18", "2026-04-25",
];

fn staff(access_code: &str, name: &str, role: Role) -> UserRecord {
    UserRecord {
        access_code: access_code.to_string(),
        name: name.to_string(),
        role,
        course: None,
        course_code: None,
        access: true,
        editable_name: false,
        photo: None,
        quiz_scores: Default::default(),
        courses: Vec::new(),
        last_active_course: None,
        created_at: None,
    }
}

fn student(access_code: String, name: String, offering: &CourseOffering, editable_name: bool) -> UserRecord {
    UserRecord {
        access_code,
        name,
        role: Role::Student,
        course: Some(offering.course.to_string()),
        course_code: Some(offering.course_code.to_string()),
        access: true,
        editable_name,
        photo: None,
        quiz_scores: Default::default(),
        courses: Vec::new(),
        last_active_course: None,
        created_at: Some(SEED_CREATED_AT.to_string()),
    }
}

/// Every record a fresh directory must contain, in insertion order.
/// Official entries come before the generated codes they shadow.
pub fn seed_records() -> Vec<UserRecord> {
    let mut records = vec![
        staff("WA-PROF-2025-0001", "Wanky Massenat", Role::Professor),
        staff("WA-ADM-2025-0001", "Admin Academy", Role::Admin),
    ];

    let informatique = &COURSE_OFFERINGS[0];
    for (i, name) in OFFICIAL_INF_ROSTER.iter().enumerate() {
        let code = sequential_access_code(informatique.prefix, i as u32 + 1);
        records.push(student(code, name.to_string(), informatique, false));
    }

    for offering in COURSE_OFFERINGS {
        for n in 1..=CODES_PER_OFFERING {
            let code = sequential_access_code(offering.prefix, n);
            let name = format!("Student {}", code);
            records.push(student(code, name, offering, true));
        }
    }

    records
}

/// Session calendar of the tracked offering.
pub fn attendance_days() -> Vec<NaiveDate> {
    ATTENDANCE_DATES_INF
        .iter()
        .filter_map(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
        .collect()
}
