//! XP and level tracking.
//!
//! XP earning:
//! - Complete lesson: 100 XP
//! - Complete activity: 50 XP
//! - Perfect quiz score: 25 XP bonus
//! - Streak bonus: 10 XP per day of streak
//! - First lesson of day: 25 XP bonus
//!
//! Level formula: XP needed to clear level L is `L * 200` (level 1 takes
//! 200 XP, level 2 takes 400 XP, and so on).

use serde::{Deserialize, Serialize};

use crate::date::{self, DayId};
use crate::error::Result;
use crate::storage::KeyValueStore;

/// XP for completing a lesson.
pub const XP_LESSON_COMPLETE: u32 = 100;
/// XP for completing an activity.
pub const XP_ACTIVITY_COMPLETE: u32 = 50;
/// Bonus XP for a perfect quiz score.
pub const XP_PERFECT_QUIZ: u32 = 25;
/// Bonus XP per day of an active streak.
pub const XP_STREAK_BONUS_PER_DAY: u32 = 10;
/// Bonus XP for the first lesson completed each day.
pub const XP_FIRST_LESSON_OF_DAY: u32 = 25;
/// Daily login bonus. Defined for the wire format but nothing awards it
/// yet; the first-lesson-of-day bonus covers daily engagement.
pub const XP_DAILY_LOGIN: u32 = 10;

const STORAGE_KEY: &str = "sh_xp";
/// XP history entries kept per record.
const HISTORY_CAP: usize = 100;

/// Level-to-rank title table. Rank for a level is the highest entry at or
/// below it.
const LEVEL_RANKS: &[(u32, &str)] = &[
    (1, "Novice Explorer"),
    (2, "Curious Learner"),
    (3, "Science Enthusiast"),
    (4, "Knowledge Seeker"),
    (5, "Cell Specialist"),
    (6, "Biology Apprentice"),
    (7, "Lab Assistant"),
    (8, "Research Student"),
    (9, "Junior Scientist"),
    (10, "Science Scholar"),
    (15, "Senior Researcher"),
    (20, "Master Biologist"),
    (25, "Science Professor"),
    (30, "Nobel Candidate"),
    (40, "Legendary Scientist"),
    (50, "Science Icon"),
];

const DEFAULT_RANK: &str = "Science Student";

/// Where an XP award came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum XpSource {
    Lesson,
    Activity,
    PerfectQuiz,
    Achievement,
}

/// Persisted XP state, camelCase JSON under `sh_xp`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct XpRecord {
    pub total_xp: u32,
    pub current_level: u32,
    pub xp_in_current_level: u32,
    /// Most recent awards, capped at [`HISTORY_CAP`] entries.
    pub xp_history: Vec<XpEvent>,
    /// Lesson ids already awarded, for dedupe.
    pub lessons_completed: Vec<String>,
    /// `lesson-activity` keys already awarded, for dedupe.
    pub activities_completed: Vec<String>,
    /// Day the first-lesson-of-day bonus was last granted.
    pub last_daily_bonus_date: Option<DayId>,
}

impl Default for XpRecord {
    fn default() -> Self {
        Self {
            total_xp: 0,
            current_level: 1,
            xp_in_current_level: 0,
            xp_history: Vec::new(),
            lessons_completed: Vec::new(),
            activities_completed: Vec::new(),
            last_daily_bonus_date: None,
        }
    }
}

/// A single XP award in the history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct XpEvent {
    pub date: DayId,
    pub amount: u32,
    pub source: XpSource,
    /// Lesson or activity key the award was for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub new_total: u32,
    pub level: u32,
}

/// Level breakdown derived from a total XP value.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelInfo {
    pub level: u32,
    pub xp_in_current_level: u32,
    pub xp_needed_for_next_level: u32,
    pub progress_percent: f64,
}

/// Outcome of an award attempt.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AwardResult {
    /// False when the award was deduplicated.
    pub awarded: bool,
    /// Why nothing was awarded, when `awarded` is false.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub amount: u32,
    /// First-lesson-of-day portion of `amount`, zero for other awards.
    pub first_lesson_bonus: u32,
    /// Streak portion of `amount`, zero for other awards.
    pub streak_bonus: u32,
    pub new_total: u32,
    pub new_level: u32,
    pub leveled_up: bool,
    pub old_level: u32,
}

/// XP summary for display.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct XpStats {
    pub total_xp: u32,
    pub current_level: u32,
    pub rank: &'static str,
    pub next_rank: Option<&'static str>,
    pub next_rank_level: Option<u32>,
    pub xp_in_current_level: u32,
    pub xp_needed_for_next_level: u32,
    pub xp_to_next_level: u32,
    pub progress_percent: f64,
    pub lessons_completed: usize,
    pub activities_completed: usize,
}

/// XP needed to clear `level`.
pub fn xp_for_level(level: u32) -> u32 {
    level * 200
}

/// Level breakdown for a total XP value.
pub fn calculate_level(total_xp: u32) -> LevelInfo {
    let mut level = 1;
    let mut remaining = total_xp;
    while remaining >= xp_for_level(level) {
        remaining -= xp_for_level(level);
        level += 1;
    }

    let needed = xp_for_level(level);
    LevelInfo {
        level,
        xp_in_current_level: remaining,
        xp_needed_for_next_level: needed,
        progress_percent: f64::from(remaining) / f64::from(needed) * 100.0,
    }
}

/// Rank title for a level.
pub fn rank_for_level(level: u32) -> &'static str {
    LEVEL_RANKS
        .iter()
        .rev()
        .find(|&&(l, _)| l <= level)
        .map_or(DEFAULT_RANK, |&(_, rank)| rank)
}

/// The next rank entry above `level`, if any.
pub fn next_rank_level(level: u32) -> Option<u32> {
    LEVEL_RANKS.iter().find(|&&(l, _)| l > level).map(|&(l, _)| l)
}

/// XP tracker over an injected store.
#[derive(Debug)]
pub struct XpTracker<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> XpTracker<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The current persisted record, or the default when absent or corrupt.
    pub fn record(&self) -> XpRecord {
        self.store
            .get(STORAGE_KEY)
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default()
    }

    fn save(&mut self, record: &XpRecord) -> Result<()> {
        let raw = serde_json::to_string(record)?;
        self.store.set(STORAGE_KEY, &raw)?;
        Ok(())
    }

    /// Award XP for completing a lesson.
    ///
    /// Deduplicated by lesson id. Adds the first-lesson-of-day bonus once
    /// per calendar day and a streak bonus when `streak_days > 1`.
    pub fn award_lesson_xp(&mut self, lesson_id: &str, streak_days: u32) -> Result<AwardResult> {
        self.award_lesson_xp_on(lesson_id, streak_days, date::today())
    }

    /// Lesson award with an explicit "today", for deterministic callers.
    pub fn award_lesson_xp_on(
        &mut self,
        lesson_id: &str,
        streak_days: u32,
        today: DayId,
    ) -> Result<AwardResult> {
        let mut record = self.record();

        if record.lessons_completed.iter().any(|id| id == lesson_id) {
            return Ok(duplicate(&record, "Lesson already completed"));
        }
        record.lessons_completed.push(lesson_id.to_string());

        let mut first_lesson_bonus = 0;
        if record.last_daily_bonus_date != Some(today) {
            first_lesson_bonus = XP_FIRST_LESSON_OF_DAY;
            record.last_daily_bonus_date = Some(today);
        }
        let streak_bonus = if streak_days > 1 {
            streak_days * XP_STREAK_BONUS_PER_DAY
        } else {
            0
        };
        let amount = XP_LESSON_COMPLETE + first_lesson_bonus + streak_bonus;

        let mut result = self.apply_award(record, amount, XpSource::Lesson, lesson_id, today)?;
        result.first_lesson_bonus = first_lesson_bonus;
        result.streak_bonus = streak_bonus;
        Ok(result)
    }

    /// Award XP for completing an activity, deduplicated per lesson/activity.
    pub fn award_activity_xp(&mut self, lesson_id: &str, activity_id: &str) -> Result<AwardResult> {
        self.award_activity_xp_on(lesson_id, activity_id, date::today())
    }

    /// Activity award with an explicit "today", for deterministic callers.
    pub fn award_activity_xp_on(
        &mut self,
        lesson_id: &str,
        activity_id: &str,
        today: DayId,
    ) -> Result<AwardResult> {
        let mut record = self.record();

        let activity_key = format!("{lesson_id}-{activity_id}");
        if record.activities_completed.iter().any(|k| *k == activity_key) {
            return Ok(duplicate(&record, "Activity already completed"));
        }
        record.activities_completed.push(activity_key.clone());

        self.apply_award(
            record,
            XP_ACTIVITY_COMPLETE,
            XpSource::Activity,
            &activity_key,
            today,
        )
    }

    /// Award the perfect-quiz bonus. Not deduplicated.
    pub fn award_perfect_quiz_xp(&mut self, lesson_id: &str) -> Result<AwardResult> {
        let record = self.record();
        self.apply_award(
            record,
            XP_PERFECT_QUIZ,
            XpSource::PerfectQuiz,
            lesson_id,
            date::today(),
        )
    }

    /// Award a badge's XP reward. Badge unlocks are one-shot upstream, so
    /// this is not deduplicated.
    pub fn award_achievement_xp(
        &mut self,
        achievement_id: &str,
        amount: u32,
    ) -> Result<AwardResult> {
        self.award_achievement_xp_on(achievement_id, amount, date::today())
    }

    /// Badge award with an explicit "today", for deterministic callers.
    pub fn award_achievement_xp_on(
        &mut self,
        achievement_id: &str,
        amount: u32,
        today: DayId,
    ) -> Result<AwardResult> {
        let record = self.record();
        self.apply_award(record, amount, XpSource::Achievement, achievement_id, today)
    }

    fn apply_award(
        &mut self,
        mut record: XpRecord,
        amount: u32,
        source: XpSource,
        detail: &str,
        today: DayId,
    ) -> Result<AwardResult> {
        let old_level = record.current_level;
        record.total_xp += amount;

        let level_info = calculate_level(record.total_xp);
        record.current_level = level_info.level;
        record.xp_in_current_level = level_info.xp_in_current_level;

        record.xp_history.push(XpEvent {
            date: today,
            amount,
            source,
            detail: Some(detail.to_string()),
            new_total: record.total_xp,
            level: record.current_level,
        });
        if record.xp_history.len() > HISTORY_CAP {
            let excess = record.xp_history.len() - HISTORY_CAP;
            record.xp_history.drain(..excess);
        }

        self.save(&record)?;

        Ok(AwardResult {
            awarded: true,
            reason: None,
            amount,
            first_lesson_bonus: 0,
            streak_bonus: 0,
            new_total: record.total_xp,
            new_level: record.current_level,
            leveled_up: record.current_level > old_level,
            old_level,
        })
    }

    /// XP summary for display.
    pub fn stats(&self) -> XpStats {
        let record = self.record();
        // Derived from the total rather than the stored level fields, so a
        // hand-edited record cannot produce an inconsistent view.
        let level_info = calculate_level(record.total_xp);
        let next_rank = next_rank_level(level_info.level);

        XpStats {
            total_xp: record.total_xp,
            current_level: level_info.level,
            rank: rank_for_level(level_info.level),
            next_rank: next_rank.map(rank_for_level),
            next_rank_level: next_rank,
            xp_in_current_level: level_info.xp_in_current_level,
            xp_needed_for_next_level: level_info.xp_needed_for_next_level,
            xp_to_next_level: level_info.xp_needed_for_next_level
                - level_info.xp_in_current_level,
            progress_percent: level_info.progress_percent,
            lessons_completed: record.lessons_completed.len(),
            activities_completed: record.activities_completed.len(),
        }
    }

    /// Remove the record entirely.
    pub fn reset(&mut self) -> Result<()> {
        self.store.remove(STORAGE_KEY)?;
        Ok(())
    }
}

fn duplicate(record: &XpRecord, reason: &str) -> AwardResult {
    AwardResult {
        awarded: false,
        reason: Some(reason.to_string()),
        amount: 0,
        first_lesson_bonus: 0,
        streak_bonus: 0,
        new_total: record.total_xp,
        new_level: record.current_level,
        leveled_up: false,
        old_level: record.current_level,
    }
}
