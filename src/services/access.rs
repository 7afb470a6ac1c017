// src/services/access.rs

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    config::{STAFF_TAP_COUNT, STAFF_TAP_WINDOW_MS},
    error::AppError,
    models::user::{Role, UserPatch, UserRecord},
};

use super::directory::DirectoryStore;

/// Portal a role lands on after login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PortalRoute {
    StudentPortal,
    StaffDashboard,
}

/// Professors and admins share the staff dashboard.
pub fn route_for_role(role: Role) -> PortalRoute {
    if role.is_staff() {
        PortalRoute::StaffDashboard
    } else {
        PortalRoute::StudentPortal
    }
}

/// Enables and disables logins.
#[derive(Clone)]
pub struct AccessGate {
    directory: DirectoryStore,
}

impl AccessGate {
    pub fn new(directory: DirectoryStore) -> Self {
        Self { directory }
    }

    /// Flips the login gate of one record. Open sessions are not affected.
    pub async fn toggle_access(&self, access_code: &str) -> Result<UserRecord, AppError> {
        let user = self
            .directory
            .find_by_access_code(access_code)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("No user with code {}", access_code.trim())))?;

        let patch = UserPatch {
            access: Some(!user.access),
            ..Default::default()
        };
        let updated = self
            .directory
            .upsert_field(&user.access_code, &patch)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("No user with code {}", user.access_code)))?;

        tracing::info!(
            "Access for {} set to {}",
            updated.access_code,
            if updated.access { "enabled" } else { "disabled" }
        );
        Ok(updated)
    }
}

/// Counts rapid taps on the staff trigger.
///
/// Each tap must follow the previous one within the window, otherwise the
/// count restarts at one. Reaching the tap count opens the PIN prompt and
/// resets the counter. The prompt stays open until one PIN submission
/// consumes it.
#[derive(Debug, Default)]
pub struct TapCounter {
    count: u32,
    last_tap: Option<DateTime<Utc>>,
    prompt_open: bool,
}

impl TapCounter {
    /// Returns true when this tap opens the PIN prompt.
    pub fn register(&mut self, now: DateTime<Utc>) -> bool {
        let within_window = self
            .last_tap
            .is_some_and(|last| (now - last).num_milliseconds() <= STAFF_TAP_WINDOW_MS);

        self.count = if within_window { self.count + 1 } else { 1 };
        self.last_tap = Some(now);

        if self.count >= STAFF_TAP_COUNT {
            self.count = 0;
            self.prompt_open = true;
            return true;
        }
        false
    }

    /// Closes the PIN prompt. Returns whether it was open.
    pub fn take_prompt(&mut self) -> bool {
        std::mem::take(&mut self.prompt_open)
    }
}

/// Out-of-band staff route guarded only by a fixed PIN.
///
/// Known weakness kept for compatibility: it bypasses the access-code and
/// role checks. It only yields a route decision; no session is created.
pub struct StaffBypass {
    pin: String,
}

impl StaffBypass {
    pub fn new(pin: impl Into<String>) -> Self {
        Self { pin: pin.into() }
    }

    /// Checks `pin` against the prompt opened by the tap sequence.
    ///
    /// Without an open prompt the PIN is not even compared. Any submission
    /// closes the prompt, so a wrong PIN needs a new tap sequence.
    pub fn unlock(&self, taps: &mut TapCounter, pin: &str) -> Result<PortalRoute, AppError> {
        if !taps.take_prompt() {
            return Err(AppError::Forbidden("PIN prompt is not open".to_string()));
        }
        self.verify_pin(pin)
    }

    pub fn verify_pin(&self, pin: &str) -> Result<PortalRoute, AppError> {
        if pin != self.pin {
            return Err(AppError::Forbidden(
                "Access reserved for the administration".to_string(),
            ));
        }
        tracing::warn!("Staff dashboard reached through the PIN route");
        Ok(PortalRoute::StaffDashboard)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[test]
    fn test_route_for_role() {
        assert_eq!(route_for_role(Role::Student), PortalRoute::StudentPortal);
        assert_eq!(route_for_role(Role::Professor), PortalRoute::StaffDashboard);
        assert_eq!(route_for_role(Role::Admin), PortalRoute::StaffDashboard);
    }

    #[test]
    fn test_five_quick_taps_open_prompt() {
        let mut counter = TapCounter::default();
        let start = Utc::now();

        let opened: Vec<bool> = (0..5)
            .map(|i| counter.register(start + Duration::milliseconds(i * 800)))
            .collect();
        assert_eq!(opened, vec![false, false, false, false, true]);
    }

    #[test]
    fn test_slow_tap_restarts_count() {
        let mut counter = TapCounter::default();
        let start = Utc::now();

        for i in 0..4 {
            assert!(!counter.register(start + Duration::seconds(i)));
        }
        // Gap longer than the window: this tap counts as the first again.
        assert!(!counter.register(start + Duration::seconds(10)));
        for i in 1..4 {
            assert!(!counter.register(start + Duration::seconds(10 + i)));
        }
        assert!(counter.register(start + Duration::seconds(14)));
    }

    fn open_prompt(counter: &mut TapCounter) {
        let start = Utc::now();
        for i in 0..5 {
            counter.register(start + Duration::milliseconds(i * 100));
        }
    }

    #[test]
    fn test_pin_needs_open_prompt() {
        let bypass = StaffBypass::new("1999");
        let mut counter = TapCounter::default();

        let err = bypass.unlock(&mut counter, "1999").unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        open_prompt(&mut counter);
        assert_eq!(bypass.unlock(&mut counter, "1999").unwrap(), PortalRoute::StaffDashboard);

        // The prompt was consumed by the successful unlock
        assert!(bypass.unlock(&mut counter, "1999").is_err());
    }

    #[test]
    fn test_wrong_pin_closes_prompt() {
        let bypass = StaffBypass::new("1999");
        let mut counter = TapCounter::default();

        open_prompt(&mut counter);
        assert!(bypass.unlock(&mut counter, "0000").is_err());
        assert!(bypass.unlock(&mut counter, "1999").is_err());
    }

    #[test]
    fn test_pin_check() {
        let bypass = StaffBypass::new("1999");
        assert_eq!(bypass.verify_pin("1999").unwrap(), PortalRoute::StaffDashboard);
        assert!(matches!(bypass.verify_pin("0000"), Err(AppError::Forbidden(_))));
    }
}
