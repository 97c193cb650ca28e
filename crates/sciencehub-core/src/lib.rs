//! # Science Hub Core Library
//!
//! This library provides the gamification and progress-tracking logic for
//! the Science Learning Hub. Presenters (widgets, pages) are thin rendering
//! layers over this crate; all state lives in a client-local key-value
//! store.
//!
//! ## Architecture
//!
//! - **Streak Tracker**: A calendar-day state machine with forgiveness and
//!   reset rules and one-time milestones
//! - **XP Tracker**: XP awards, levels and rank titles
//! - **Achievement Tracker**: One-shot badge unlocks with XP rewards
//! - **Progress Tracker**: Per-module lesson completion and last-visited
//!   tracking
//! - **Storage**: A key-value store seam with file-backed and in-memory
//!   backends, plus TOML-based configuration
//!
//! Trackers hold no global state: each takes an explicit
//! [`KeyValueStore`], so tests run against [`MemoryStore`] while the
//! desktop shell uses [`FileStore`].
//!
//! ## Key Components
//!
//! - [`StreakTracker`]: Daily check-in state machine
//! - [`XpTracker`]: XP and level persistence
//! - [`AchievementTracker`]: Badge unlock state
//! - [`ProgressTracker`]: Lesson completion state
//! - [`Config`]: Application configuration management

pub mod achievements;
pub mod date;
pub mod error;
pub mod progress;
pub mod storage;
pub mod streak;
pub mod xp;

pub use achievements::{
    AchievementDef, AchievementRecord, AchievementStats, AchievementStatus, AchievementTracker,
    ACHIEVEMENTS,
};
pub use date::{days_between, today, DayId};
pub use error::{ConfigError, CoreError, StorageError};
pub use progress::{LastVisited, ModuleProgress, ProgressTracker};
pub use storage::{Config, FileStore, KeyValueStore, MemoryStore};
pub use streak::{
    CheckinResult, DayActivity, HistoryEntry, NextMilestone, StreakInfo, StreakRecord,
    StreakStatus, StreakTracker, MILESTONES,
};
pub use xp::{AwardResult, LevelInfo, XpRecord, XpSource, XpStats, XpTracker};
