// src/config.rs

use std::env;
use dotenvy::dotenv;

/// Minimum quiz percentage that certifies a course and unlocks its certificate.
pub const PASSING_SCORE_PERCENTAGE: u32 = 70;

/// Explicit absences at which staff views raise a warning.
pub const ABSENCE_WARNING_THRESHOLD: usize = 3;

/// Attendance rate (percent) shown as passing on staff views.
pub const ATTENDANCE_PASS_RATE: f64 = 70.0;

/// Extra attempts granted to the question generator after the first one.
pub const QUIZ_GENERATION_RETRIES: u32 = 2;

/// Number of questions requested from the question generator.
pub const GENERATED_QUESTION_COUNT: usize = 10;

/// Taps needed on the staff trigger before the PIN prompt opens.
pub const STAFF_TAP_COUNT: u32 = 5;

/// Maximum gap between two taps before the counter restarts.
pub const STAFF_TAP_WINDOW_MS: i64 = 5000;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub rust_log: String,
    pub port: u16,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub certificate_store_url: Option<String>,
    pub staff_pin: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://academy.db?mode=rwc".to_string());

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);

        let gemini_api_key = env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty());

        let gemini_model =
            env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-2.0-flash".to_string());

        let certificate_store_url = env::var("CERTIFICATE_STORE_URL")
            .ok()
            .filter(|u| !u.is_empty());

        let staff_pin = env::var("STAFF_PIN").unwrap_or_else(|_| "1999".to_string());

        Self {
            database_url,
            rust_log,
            port,
            gemini_api_key,
            gemini_model,
            certificate_store_url,
            staff_pin,
        }
    }
}

impl Default for Config {
    /// In-memory defaults used by tests and ephemeral runs.
    fn default() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            rust_log: "info".to_string(),
            port: 3000,
            gemini_api_key: None,
            gemini_model: "gemini-2.0-flash".to_string(),
            certificate_store_url: None,
            staff_pin: "1999".to_string(),
        }
    }
}
