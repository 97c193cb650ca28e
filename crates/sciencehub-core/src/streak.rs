//! Daily learning streak tracking.
//!
//! Rules:
//! - Streak increases when the user checks in on a new day
//! - Missing exactly one day is forgiven (streak keeps counting)
//! - Missing two or more days resets the streak to 1
//! - Milestones at 7, 30, 60, 100, 180 and 365 days fire once each
//!
//! The tracker is a state machine over the day distance between `today`
//! and the last recorded check-in. A check-in reads, computes and writes
//! the record in one `&mut self` call; there is no global state.

use serde::{Deserialize, Serialize};

use crate::date::{self, days_between, DayId};
use crate::error::Result;
use crate::storage::KeyValueStore;

/// Fixed milestone thresholds, ascending.
pub const MILESTONES: [u32; 6] = [7, 30, 60, 100, 180, 365];

const STORAGE_KEY: &str = "sh_streak";

/// Persisted streak state. Stored as camelCase JSON under [`STORAGE_KEY`],
/// matching the layout the hub front end wrote.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StreakRecord {
    /// Consecutive-day count, including today once checked in.
    pub current_streak: u32,
    /// Maximum `current_streak` ever observed. Never decreases.
    pub longest_streak: u32,
    /// Day of the most recent successful check-in.
    pub last_active_date: Option<DayId>,
    /// One entry per check-in day, insertion order = chronological order.
    pub streak_history: Vec<HistoryEntry>,
    /// Milestones already celebrated, each at most once.
    pub milestones_reached: Vec<u32>,
}

impl Default for StreakRecord {
    fn default() -> Self {
        Self {
            current_streak: 0,
            longest_streak: 0,
            last_active_date: None,
            streak_history: Vec::new(),
            milestones_reached: Vec::new(),
        }
    }
}

/// A single check-in day in the streak history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub date: DayId,
    /// Streak value after this check-in.
    pub streak: u32,
    /// One missed day was forgiven to keep this streak alive.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub forgiven: bool,
    /// The streak was reset on this check-in.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub reset: bool,
    /// Streak value before a reset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_streak: Option<u32>,
}

impl HistoryEntry {
    fn plain(date: DayId, streak: u32) -> Self {
        Self {
            date,
            streak,
            forgiven: false,
            reset: false,
            previous_streak: None,
        }
    }
}

/// Outcome of a check-in.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckinResult {
    /// False when the user had already checked in today.
    pub streak_updated: bool,
    pub current_streak: u32,
    /// Milestone newly reached by this check-in, if any.
    pub milestone_reached: Option<u32>,
    /// Display message for the presenter.
    pub message: String,
    /// The streak was reset by this check-in.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub was_reset: bool,
    /// Streak value lost to a reset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_streak: Option<u32>,
}

/// Streak status relative to today, for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StreakStatus {
    /// No check-in has ever happened.
    New,
    /// Already checked in today.
    CheckedIn,
    /// Exactly one day since last activity; resets tomorrow if ignored.
    AtRisk,
    /// Two or more days since last activity.
    Expired,
}

/// The next milestone ahead of the current streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextMilestone {
    pub days: u32,
    pub days_away: u32,
}

/// Read-only streak view for display.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakInfo {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub last_active_date: Option<DayId>,
    pub status: StreakStatus,
    pub days_since_last_activity: Option<u32>,
    pub next_milestone: Option<NextMilestone>,
    pub milestones_reached: Vec<u32>,
}

/// One calendar day in the history window view.
#[derive(Debug, Clone, Serialize)]
pub struct DayActivity {
    pub date: DayId,
    pub active: bool,
    /// Streak value recorded that day, 0 when inactive.
    pub streak: u32,
}

/// Daily streak tracker over an injected store.
#[derive(Debug)]
pub struct StreakTracker<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> StreakTracker<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The current persisted record, or the default when absent or corrupt.
    pub fn record(&self) -> StreakRecord {
        self.store
            .get(STORAGE_KEY)
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default()
    }

    fn save(&mut self, record: &StreakRecord) -> Result<()> {
        let raw = serde_json::to_string(record)?;
        self.store.set(STORAGE_KEY, &raw)?;
        Ok(())
    }

    /// Record streak activity for today.
    ///
    /// Reads, computes and writes the record in one call. A second call on
    /// the same calendar day is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error only when the updated record cannot be written to
    /// the store. Unreadable existing state is treated as a fresh start.
    pub fn check_in(&mut self) -> Result<CheckinResult> {
        self.check_in_on(date::today())
    }

    /// Check-in with an explicit "today", for deterministic callers.
    pub fn check_in_on(&mut self, today: DayId) -> Result<CheckinResult> {
        let mut record = self.record();

        // Already checked in today
        if record.last_active_date == Some(today) {
            return Ok(CheckinResult {
                streak_updated: false,
                current_streak: record.current_streak,
                milestone_reached: None,
                message: "Already checked in today!".to_string(),
                was_reset: false,
                old_streak: None,
            });
        }

        // First ever check-in
        let Some(last_active) = record.last_active_date else {
            record.current_streak = 1;
            record.longest_streak = record.longest_streak.max(1);
            record.last_active_date = Some(today);
            record.streak_history.push(HistoryEntry::plain(today, 1));
            self.save(&record)?;

            return Ok(CheckinResult {
                streak_updated: true,
                current_streak: 1,
                milestone_reached: None,
                message: "Streak started! Day 1!".to_string(),
                was_reset: false,
                old_streak: None,
            });
        };

        match days_between(last_active, today) {
            // Consecutive day
            1 => {
                record.current_streak += 1;
                record.last_active_date = Some(today);
                record
                    .streak_history
                    .push(HistoryEntry::plain(today, record.current_streak));
                record.longest_streak = record.longest_streak.max(record.current_streak);

                let milestone =
                    check_milestone(record.current_streak, &record.milestones_reached);
                if let Some(m) = milestone {
                    record.milestones_reached.push(m);
                }
                self.save(&record)?;

                let message = match milestone {
                    Some(m) => format!("{m} day streak! Amazing!"),
                    None => format!("Day {}! Keep it up!", record.current_streak),
                };
                Ok(CheckinResult {
                    streak_updated: true,
                    current_streak: record.current_streak,
                    milestone_reached: milestone,
                    message,
                    was_reset: false,
                    old_streak: None,
                })
            }
            // Missed exactly one day: forgiveness, the streak keeps counting
            2 => {
                record.current_streak += 1;
                record.last_active_date = Some(today);
                record.streak_history.push(HistoryEntry {
                    forgiven: true,
                    ..HistoryEntry::plain(today, record.current_streak)
                });
                record.longest_streak = record.longest_streak.max(record.current_streak);
                self.save(&record)?;

                Ok(CheckinResult {
                    streak_updated: true,
                    current_streak: record.current_streak,
                    milestone_reached: None,
                    message: format!(
                        "Back on track! Day {} (missed yesterday but we're counting it!)",
                        record.current_streak
                    ),
                    was_reset: false,
                    old_streak: None,
                })
            }
            // Missed two or more days: reset
            days_away => {
                let old_streak = record.current_streak;
                record.current_streak = 1;
                record.last_active_date = Some(today);
                record.streak_history.push(HistoryEntry {
                    reset: true,
                    previous_streak: Some(old_streak),
                    ..HistoryEntry::plain(today, 1)
                });
                self.save(&record)?;

                Ok(CheckinResult {
                    streak_updated: true,
                    current_streak: 1,
                    milestone_reached: None,
                    message: format!(
                        "Streak reset after {days_away} days away. Starting fresh! Day 1!"
                    ),
                    was_reset: true,
                    old_streak: Some(old_streak),
                })
            }
        }
    }

    /// Derived read-only view of the streak for display.
    pub fn streak_info(&self) -> StreakInfo {
        self.streak_info_on(date::today())
    }

    /// Streak info with an explicit "today", for deterministic callers.
    pub fn streak_info_on(&self, today: DayId) -> StreakInfo {
        let record = self.record();
        let days_since = record
            .last_active_date
            .map(|last| days_between(last, today));

        let status = match (record.last_active_date, days_since) {
            (None, _) => StreakStatus::New,
            (Some(last), _) if last == today => StreakStatus::CheckedIn,
            (_, Some(1)) => StreakStatus::AtRisk,
            _ => StreakStatus::Expired,
        };

        StreakInfo {
            current_streak: record.current_streak,
            longest_streak: record.longest_streak,
            last_active_date: record.last_active_date,
            status,
            days_since_last_activity: days_since,
            next_milestone: next_milestone(record.current_streak),
            milestones_reached: record.milestones_reached,
        }
    }

    /// Activity view of the last `days` calendar days, ending today.
    pub fn history(&self, days: u32) -> Vec<DayActivity> {
        self.history_ending(days, date::today())
    }

    /// History window with an explicit end day, for deterministic callers.
    pub fn history_ending(&self, days: u32, today: DayId) -> Vec<DayActivity> {
        let record = self.record();
        (0..days)
            .rev()
            .map(|i| {
                let date = today.offset(-(i as i64));
                let entry = record.streak_history.iter().find(|h| h.date == date);
                DayActivity {
                    date,
                    active: entry.is_some(),
                    streak: entry.map_or(0, |h| h.streak),
                }
            })
            .collect()
    }

    /// Remove the record entirely, as if no check-in ever happened.
    pub fn reset(&mut self) -> Result<()> {
        self.store.remove(STORAGE_KEY)?;
        Ok(())
    }

    /// Seed a synthetic `days`-day streak ending today, with history and
    /// every milestone at or below `days`. Admin/demo helper.
    pub fn simulate(&mut self, days: u32) -> Result<()> {
        let today = date::today();
        let record = StreakRecord {
            current_streak: days,
            longest_streak: days,
            last_active_date: Some(today),
            streak_history: (0..days)
                .map(|i| HistoryEntry::plain(today.offset(i as i64 + 1 - days as i64), i + 1))
                .collect(),
            milestones_reached: MILESTONES.iter().copied().filter(|&m| m <= days).collect(),
        };
        self.save(&record)
    }
}

/// First unreached milestone equal to `streak`, scanning ascending.
/// At most one milestone per check-in.
fn check_milestone(streak: u32, reached: &[u32]) -> Option<u32> {
    MILESTONES
        .iter()
        .copied()
        .find(|&m| m == streak && !reached.contains(&m))
}

/// Smallest milestone above the current streak, or `None` when all reached.
fn next_milestone(current_streak: u32) -> Option<NextMilestone> {
    MILESTONES
        .iter()
        .copied()
        .find(|&m| current_streak < m)
        .map(|m| NextMilestone {
            days: m,
            days_away: m - current_streak,
        })
}
