//! Achievement (badge) tracking.
//!
//! Badge categories:
//! - Progress: complete lessons, modules
//! - Performance: perfect scores, speed completions
//! - Streak: maintain learning streaks
//! - Explorer: try different features, visit all sections
//! - Special: easter eggs, hidden achievements
//!
//! Unlocks are one-shot. Each unlocked badge carries an XP reward; callers
//! hand the reward to [`crate::XpTracker::award_achievement_xp`] so the
//! badge and XP records stay in their own keys.

use chrono::{DateTime, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::storage::KeyValueStore;

const STORAGE_KEY: &str = "sh_achievements";

/// Badge category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementCategory {
    Progress,
    Performance,
    Streak,
    Explorer,
    Special,
}

/// Badge rarity tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Epic,
}

/// A badge definition from the fixed catalog.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementDef {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub category: AchievementCategory,
    pub xp_reward: u32,
    pub rarity: Rarity,
}

macro_rules! badge {
    ($id:literal, $name:literal, $desc:literal, $icon:literal, $cat:ident, $xp:literal, $rarity:ident) => {
        AchievementDef {
            id: $id,
            name: $name,
            description: $desc,
            icon: $icon,
            category: AchievementCategory::$cat,
            xp_reward: $xp,
            rarity: Rarity::$rarity,
        }
    };
}

/// The full badge catalog.
pub const ACHIEVEMENTS: &[AchievementDef] = &[
    // Progress
    badge!("first_lesson", "First Steps", "Complete your first lesson", "shoe", Progress, 50, Common),
    badge!("lesson_starter", "Lesson Starter", "Complete 5 lessons", "book-open", Progress, 100, Common),
    badge!("lesson_warrior", "Lesson Warrior", "Complete 15 lessons", "sword", Progress, 250, Uncommon),
    badge!("lesson_master", "Lesson Master", "Complete 30 lessons", "crown", Progress, 500, Rare),
    badge!("module_explorer", "Module Explorer", "Complete all lessons in a module", "compass", Progress, 300, Uncommon),
    // Performance
    badge!("perfect_score", "Perfectionist", "Get 100% on a quiz", "star", Performance, 100, Uncommon),
    badge!("speed_reader", "Speed Reader", "Complete a lesson in under 10 minutes", "zap", Performance, 75, Uncommon),
    badge!("quiz_champion", "Quiz Champion", "Get 5 perfect quiz scores in a row", "trophy", Performance, 300, Rare),
    badge!("attention_to_detail", "Detail Oriented", "Complete all activities in a lesson", "search", Performance, 100, Common),
    // Streak
    badge!("streak_starter", "Getting Warm", "Maintain a 3-day streak", "flame", Streak, 100, Common),
    badge!("streak_seeker", "On Fire", "Maintain a 7-day streak", "flame", Streak, 200, Uncommon),
    badge!("streak_champion", "Unstoppable", "Maintain a 30-day streak", "flame", Streak, 500, Rare),
    badge!("streak_legend", "Legendary", "Maintain a 100-day streak", "flame", Streak, 1000, Epic),
    // Explorer
    badge!("night_owl", "Night Owl", "Complete a lesson between 10 PM and 6 AM", "moon", Explorer, 75, Uncommon),
    badge!("early_bird", "Early Bird", "Complete a lesson before 8 AM", "sun", Explorer, 75, Uncommon),
    badge!("weekend_warrior", "Weekend Warrior", "Complete lessons on both Saturday and Sunday", "calendar", Explorer, 150, Uncommon),
    badge!("completionist", "Completionist", "Read every section including \"Copy Into Books\"", "check-circle", Explorer, 100, Common),
    // Special
    badge!("comeback_kid", "Comeback Kid", "Return after losing a streak and start a new one", "refresh-cw", Special, 150, Uncommon),
    badge!("first_visit", "Welcome Aboard", "Visit the Science Hub for the first time", "hand", Special, 25, Common),
    badge!("dedicated_student", "Dedicated Student", "Study for 7 days in a single week", "award", Special, 200, Uncommon),
    badge!("knowledge_seeker", "Knowledge Seeker", "Open 3 different Deep Dive sections in one lesson", "book-marked", Special, 100, Uncommon),
];

/// Look up a badge definition by id.
pub fn achievement(id: &str) -> Option<&'static AchievementDef> {
    ACHIEVEMENTS.iter().find(|a| a.id == id)
}

/// Lesson-count thresholds for the progress badges.
const LESSON_BADGES: &[(&str, usize)] = &[
    ("first_lesson", 1),
    ("lesson_starter", 5),
    ("lesson_warrior", 15),
    ("lesson_master", 30),
];

/// Streak-length thresholds for the streak badges.
const STREAK_BADGES: &[(&str, u32)] = &[
    ("streak_starter", 3),
    ("streak_seeker", 7),
    ("streak_champion", 30),
    ("streak_legend", 100),
];

/// Consecutive perfect quizzes needed for `quiz_champion`.
const QUIZ_CHAMPION_RUN: u32 = 5;
/// Distinct deep-dive sections in one lesson for `knowledge_seeker`.
const KNOWLEDGE_SEEKER_DIVES: usize = 3;

/// A single unlocked badge in the record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnlockEntry {
    pub id: String,
    pub unlocked_at: DateTime<Utc>,
}

/// One opened deep-dive section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeepDive {
    pub lesson_id: String,
    pub section_id: String,
}

/// Persisted achievement state, camelCase JSON under `sh_achievements`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AchievementRecord {
    pub unlocked: Vec<UnlockEntry>,
    pub first_visit: Option<DateTime<Utc>>,
    /// Lesson ids counted toward the progress badges, deduped.
    pub lessons_completed: Vec<String>,
    pub perfect_quizzes: u32,
    /// Current run of perfect quizzes; an imperfect score resets it.
    pub consecutive_perfect_quizzes: u32,
    pub deep_dives_opened: Vec<DeepDive>,
    /// "saturday" / "sunday" markers for the weekend badge.
    pub weekend_days: Vec<String>,
}

/// Unlock counts per category.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct CategoryCounts {
    pub progress: u32,
    pub performance: u32,
    pub streak: u32,
    pub explorer: u32,
    pub special: u32,
}

/// Achievement summary for display.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementStats {
    pub total: usize,
    pub unlocked: usize,
    /// Rounded percentage of badges unlocked.
    pub progress: u32,
    /// Sum of XP rewards of unlocked badges.
    pub total_xp_earned: u32,
    pub by_category: CategoryCounts,
}

/// A catalog entry with its unlock state.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementStatus {
    #[serde(flatten)]
    pub def: AchievementDef,
    pub unlocked: bool,
    pub unlocked_at: Option<DateTime<Utc>>,
}

/// Achievement tracker over an injected store.
#[derive(Debug)]
pub struct AchievementTracker<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> AchievementTracker<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The current persisted record, or the default when absent or corrupt.
    pub fn record(&self) -> AchievementRecord {
        self.store
            .get(STORAGE_KEY)
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default()
    }

    fn save(&mut self, record: &AchievementRecord) -> Result<()> {
        let raw = serde_json::to_string(record)?;
        self.store.set(STORAGE_KEY, &raw)?;
        Ok(())
    }

    /// Count a completed lesson and check the progress badges.
    /// Returns the badges newly unlocked by this call.
    pub fn record_lesson_complete(
        &mut self,
        lesson_id: &str,
    ) -> Result<Vec<&'static AchievementDef>> {
        let mut record = self.record();
        if !record.lessons_completed.iter().any(|l| l == lesson_id) {
            record.lessons_completed.push(lesson_id.to_string());
        }

        let count = record.lessons_completed.len();
        let mut newly = Vec::new();
        for &(id, needed) in LESSON_BADGES {
            if count >= needed {
                unlock(&mut record, id, &mut newly);
            }
        }
        self.save(&record)?;
        Ok(newly)
    }

    /// Count a quiz result and check the performance badges.
    pub fn record_quiz_complete(&mut self, perfect: bool) -> Result<Vec<&'static AchievementDef>> {
        let mut record = self.record();
        if perfect {
            record.perfect_quizzes += 1;
            record.consecutive_perfect_quizzes += 1;
        } else {
            record.consecutive_perfect_quizzes = 0;
        }

        let mut newly = Vec::new();
        if perfect {
            unlock(&mut record, "perfect_score", &mut newly);
        }
        if record.consecutive_perfect_quizzes >= QUIZ_CHAMPION_RUN {
            unlock(&mut record, "quiz_champion", &mut newly);
        }
        self.save(&record)?;
        Ok(newly)
    }

    /// Check the streak badges against the current streak length.
    pub fn record_streak_update(
        &mut self,
        streak_days: u32,
    ) -> Result<Vec<&'static AchievementDef>> {
        let mut record = self.record();
        let mut newly = Vec::new();
        for &(id, needed) in STREAK_BADGES {
            if streak_days >= needed {
                unlock(&mut record, id, &mut newly);
            }
        }
        self.save(&record)?;
        Ok(newly)
    }

    /// Check the comeback badge after a streak reset: a previous streak
    /// existed and the new one is back at day 1.
    pub fn record_streak_lost(
        &mut self,
        previous_streak: u32,
        new_streak: u32,
    ) -> Result<Vec<&'static AchievementDef>> {
        let mut record = self.record();
        let mut newly = Vec::new();
        if previous_streak > 0 && new_streak == 1 {
            unlock(&mut record, "comeback_kid", &mut newly);
        }
        self.save(&record)?;
        Ok(newly)
    }

    /// Record the first ever visit. Later calls are no-ops.
    pub fn record_first_visit(&mut self) -> Result<Vec<&'static AchievementDef>> {
        let mut record = self.record();
        if record.first_visit.is_some() {
            return Ok(Vec::new());
        }
        record.first_visit = Some(Utc::now());

        let mut newly = Vec::new();
        unlock(&mut record, "first_visit", &mut newly);
        self.save(&record)?;
        Ok(newly)
    }

    /// Record an opened deep-dive section and check `knowledge_seeker`
    /// (three distinct sections within one lesson).
    pub fn record_deep_dive(
        &mut self,
        lesson_id: &str,
        section_id: &str,
    ) -> Result<Vec<&'static AchievementDef>> {
        let mut record = self.record();
        let dive = DeepDive {
            lesson_id: lesson_id.to_string(),
            section_id: section_id.to_string(),
        };
        if !record.deep_dives_opened.contains(&dive) {
            record.deep_dives_opened.push(dive);
        }

        let in_lesson = record
            .deep_dives_opened
            .iter()
            .filter(|d| d.lesson_id == lesson_id)
            .count();
        let mut newly = Vec::new();
        if in_lesson >= KNOWLEDGE_SEEKER_DIVES {
            unlock(&mut record, "knowledge_seeker", &mut newly);
        }
        self.save(&record)?;
        Ok(newly)
    }

    /// Check the time-of-day badges using the local clock.
    pub fn check_time_based(&mut self) -> Result<Vec<&'static AchievementDef>> {
        use chrono::{Datelike, Local, Timelike};
        let now = Local::now();
        self.record_time_check(now.hour(), now.weekday())
    }

    /// Time-of-day badge check with an explicit clock, for deterministic
    /// callers: night owl (10 PM - 6 AM), early bird (before 8 AM), and the
    /// weekend badge once both Saturday and Sunday have seen activity.
    pub fn record_time_check(
        &mut self,
        hour: u32,
        weekday: Weekday,
    ) -> Result<Vec<&'static AchievementDef>> {
        let mut record = self.record();
        let mut newly = Vec::new();

        if hour >= 22 || hour < 6 {
            unlock(&mut record, "night_owl", &mut newly);
        }
        if hour < 8 {
            unlock(&mut record, "early_bird", &mut newly);
        }

        let marker = match weekday {
            Weekday::Sat => Some("saturday"),
            Weekday::Sun => Some("sunday"),
            _ => None,
        };
        if let Some(day) = marker {
            if !record.weekend_days.iter().any(|d| d == day) {
                record.weekend_days.push(day.to_string());
            }
        }
        if record.weekend_days.iter().any(|d| d == "saturday")
            && record.weekend_days.iter().any(|d| d == "sunday")
        {
            unlock(&mut record, "weekend_warrior", &mut newly);
        }

        self.save(&record)?;
        Ok(newly)
    }

    /// Whether a badge has been unlocked.
    pub fn is_unlocked(&self, achievement_id: &str) -> bool {
        self.record().unlocked.iter().any(|u| u.id == achievement_id)
    }

    /// When a badge was unlocked, if it has been.
    pub fn unlock_date(&self, achievement_id: &str) -> Option<DateTime<Utc>> {
        self.record()
            .unlocked
            .iter()
            .find(|u| u.id == achievement_id)
            .map(|u| u.unlocked_at)
    }

    /// The full catalog with unlock state, in catalog order.
    pub fn all(&self) -> Vec<AchievementStatus> {
        let record = self.record();
        ACHIEVEMENTS
            .iter()
            .map(|def| {
                let entry = record.unlocked.iter().find(|u| u.id == def.id);
                AchievementStatus {
                    def: *def,
                    unlocked: entry.is_some(),
                    unlocked_at: entry.map(|u| u.unlocked_at),
                }
            })
            .collect()
    }

    /// Achievement summary for display.
    pub fn stats(&self) -> AchievementStats {
        let all = self.all();
        let unlocked: Vec<&AchievementStatus> = all.iter().filter(|a| a.unlocked).collect();

        let mut by_category = CategoryCounts::default();
        for status in &unlocked {
            let slot = match status.def.category {
                AchievementCategory::Progress => &mut by_category.progress,
                AchievementCategory::Performance => &mut by_category.performance,
                AchievementCategory::Streak => &mut by_category.streak,
                AchievementCategory::Explorer => &mut by_category.explorer,
                AchievementCategory::Special => &mut by_category.special,
            };
            *slot += 1;
        }

        AchievementStats {
            total: all.len(),
            unlocked: unlocked.len(),
            progress: (unlocked.len() as f64 / all.len() as f64 * 100.0).round() as u32,
            total_xp_earned: unlocked.iter().map(|a| a.def.xp_reward).sum(),
            by_category,
        }
    }

    /// Remove the record entirely.
    pub fn reset(&mut self) -> Result<()> {
        self.store.remove(STORAGE_KEY)?;
        Ok(())
    }
}

/// Unlock `id` if it exists in the catalog and has not been unlocked yet.
fn unlock(
    record: &mut AchievementRecord,
    id: &str,
    newly: &mut Vec<&'static AchievementDef>,
) {
    if record.unlocked.iter().any(|u| u.id == id) {
        return;
    }
    if let Some(def) = achievement(id) {
        record.unlocked.push(UnlockEntry {
            id: id.to_string(),
            unlocked_at: Utc::now(),
        });
        newly.push(def);
    }
}
