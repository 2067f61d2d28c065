//! Override tracker — remembers manual changes between scheduled edges.
//!
//! ```text
//!                 manual (outside window)
//!   (false,false) ───────────────────────▶ (true,false)
//!        │    ▲                                 │
//!        │    └────── end trigger (any) ────────┤
//!        │ manual (inside window)               │ manual (inside window)
//!        ▼                                      ▼
//!    (true,true) ◀──────────────────────────────┘
//! ```
//!
//! Only the end-of-window trigger resets the flags, which bounds an
//! override's lifetime to one schedule cycle.

use crate::schedule::Schedule;
use crate::time::TimeOfDay;

/// Per-relay manual action memory. Never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OverrideState {
    /// A manual action happened since the last end-of-window reset.
    pub manual_override: bool,
    /// A manual action happened while inside the scheduled window.
    pub manual_during_window: bool,
}

impl OverrideState {
    /// Record a manual action taken at `now`.
    ///
    /// Without a schedule the flags are still set; they simply stay dormant.
    pub fn record_manual(&mut self, now: TimeOfDay, schedule: Option<&Schedule>) {
        self.manual_override = true;
        if schedule.is_some_and(|s| s.contains(now)) {
            self.manual_during_window = true;
        }
    }

    /// Whether the next start-of-window trigger must leave the relay alone.
    #[must_use]
    pub fn suppresses_scheduled_on(&self) -> bool {
        self.manual_during_window
    }

    /// Forget every manual action (end-of-window).
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tod(raw: &str) -> TimeOfDay {
        raw.parse().unwrap()
    }

    fn office_hours() -> Schedule {
        Schedule::new(tod("09:00"), tod("17:00"))
    }

    #[test]
    fn should_start_with_both_flags_cleared() {
        let state = OverrideState::default();
        assert!(!state.manual_override);
        assert!(!state.suppresses_scheduled_on());
    }

    #[test]
    fn should_flag_window_when_manual_inside_window() {
        let mut state = OverrideState::default();
        state.record_manual(tod("10:00"), Some(&office_hours()));
        assert!(state.manual_override);
        assert!(state.manual_during_window);
        assert!(state.suppresses_scheduled_on());
    }

    #[test]
    fn should_only_flag_override_when_manual_outside_window() {
        let mut state = OverrideState::default();
        state.record_manual(tod("20:00"), Some(&office_hours()));
        assert!(state.manual_override);
        assert!(!state.manual_during_window);
    }

    #[test]
    fn should_count_manual_at_end_minute_as_inside_window() {
        let mut state = OverrideState::default();
        state.record_manual(tod("17:00"), Some(&office_hours()));
        assert!(state.manual_during_window);
    }

    #[test]
    fn should_set_dormant_flag_without_schedule() {
        let mut state = OverrideState::default();
        state.record_manual(tod("10:00"), None);
        assert!(state.manual_override);
        assert!(!state.manual_during_window);
    }

    #[test]
    fn should_keep_window_flag_after_later_manual_outside_window() {
        let mut state = OverrideState::default();
        state.record_manual(tod("10:00"), Some(&office_hours()));
        state.record_manual(tod("18:00"), Some(&office_hours()));
        assert!(state.manual_during_window);
    }

    #[test]
    fn should_clear_both_flags_on_reset() {
        let mut state = OverrideState::default();
        state.record_manual(tod("10:00"), Some(&office_hours()));
        state.reset();
        assert_eq!(state, OverrideState::default());
    }
}
