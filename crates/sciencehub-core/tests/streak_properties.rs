//! Property tests for streak invariants.
//!
//! Drives the tracker with arbitrary day-gap sequences and asserts the
//! record invariants hold after every check-in.

use proptest::prelude::*;
use sciencehub_core::{DayId, MemoryStore, StreakTracker, MILESTONES};

fn start_day() -> DayId {
    "2026-01-01".parse().unwrap()
}

proptest! {
    /// current_streak never exceeds longest_streak, whatever the gaps.
    #[test]
    fn current_never_exceeds_longest(gaps in prop::collection::vec(0i64..10, 1..60)) {
        let mut tracker = StreakTracker::new(MemoryStore::new());
        let mut today = start_day();

        for gap in gaps {
            today = today.offset(gap);
            tracker.check_in_on(today).unwrap();

            let record = tracker.record();
            prop_assert!(record.current_streak <= record.longest_streak);
        }
    }

    /// Milestones are unique and drawn only from the fixed list.
    #[test]
    fn milestones_are_unique_and_valid(gaps in prop::collection::vec(1i64..4, 1..120)) {
        let mut tracker = StreakTracker::new(MemoryStore::new());
        let mut today = start_day();

        for gap in gaps {
            today = today.offset(gap);
            tracker.check_in_on(today).unwrap();
        }

        let reached = tracker.record().milestones_reached;
        for m in &reached {
            prop_assert!(MILESTONES.contains(m));
        }
        let unique: std::collections::HashSet<u32> = reached.iter().copied().collect();
        prop_assert_eq!(unique.len(), reached.len());
    }

    /// last_active_date never moves backwards and always lands on the day
    /// of the latest successful check-in.
    #[test]
    fn last_active_date_is_monotonic(gaps in prop::collection::vec(0i64..8, 1..60)) {
        let mut tracker = StreakTracker::new(MemoryStore::new());
        let mut today = start_day();
        let mut prev: Option<DayId> = None;

        for gap in gaps {
            today = today.offset(gap);
            tracker.check_in_on(today).unwrap();

            let last = tracker.record().last_active_date.unwrap();
            prop_assert_eq!(last, today);
            if let Some(p) = prev {
                prop_assert!(last >= p);
            }
            prev = Some(last);
        }
    }

    /// A second check-in on the same day never changes the record.
    #[test]
    fn same_day_checkin_is_idempotent(gaps in prop::collection::vec(1i64..5, 1..40)) {
        let mut tracker = StreakTracker::new(MemoryStore::new());
        let mut today = start_day();

        for gap in gaps {
            today = today.offset(gap);
            tracker.check_in_on(today).unwrap();
            let before = serde_json::to_string(&tracker.record()).unwrap();

            let second = tracker.check_in_on(today).unwrap();
            prop_assert!(!second.streak_updated);
            let after = serde_json::to_string(&tracker.record()).unwrap();
            prop_assert_eq!(before, after);
        }
    }
}
