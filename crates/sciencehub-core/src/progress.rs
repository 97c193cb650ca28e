//! Lesson progress and last-visited tracking.
//!
//! Per-module completion lists, the last visited lesson, and small JSON
//! user preferences. Keys are prefixed so [`ProgressTracker::clear_all`] can
//! wipe every hub record in one pass.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::storage::KeyValueStore;

const PREFIX: &str = "scienceHub_";
/// Prefix used by the gamification records (streak, XP).
const GAMIFICATION_PREFIX: &str = "sh_";

const LAST_VISITED_KEY: &str = "scienceHub_lastVisited";

/// Pointer to the most recently visited lesson.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastVisited {
    pub year_level: String,
    pub module: String,
    pub lesson: String,
    pub timestamp: DateTime<Utc>,
}

/// Per-module completion state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModuleProgress {
    /// Completed lesson ids, in completion order.
    pub completed: Vec<String>,
    pub last_accessed: Option<DateTime<Utc>>,
}

/// Progress tracker over an injected store.
#[derive(Debug)]
pub struct ProgressTracker<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> ProgressTracker<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    fn module_key(year_level: &str, module: &str) -> String {
        format!("{PREFIX}progress_{year_level}_{module}")
    }

    /// Record the current lesson as last visited.
    pub fn save_last_visited(
        &mut self,
        year_level: &str,
        module: &str,
        lesson: &str,
    ) -> Result<()> {
        let data = LastVisited {
            year_level: year_level.to_string(),
            module: module.to_string(),
            lesson: lesson.to_string(),
            timestamp: Utc::now(),
        };
        let raw = serde_json::to_string(&data)?;
        self.store.set(LAST_VISITED_KEY, &raw)?;
        Ok(())
    }

    /// The last visited lesson, if any was recorded.
    pub fn last_visited(&self) -> Option<LastVisited> {
        self.store
            .get(LAST_VISITED_KEY)
            .and_then(|raw| serde_json::from_str(&raw).ok())
    }

    /// Mark a lesson complete. Idempotent; returns true when the lesson was
    /// newly marked.
    pub fn mark_lesson_complete(
        &mut self,
        year_level: &str,
        module: &str,
        lesson: &str,
    ) -> Result<bool> {
        let key = Self::module_key(year_level, module);
        let mut progress = self.module_record(&key);

        if progress.completed.iter().any(|l| l == lesson) {
            return Ok(false);
        }
        progress.completed.push(lesson.to_string());
        progress.last_accessed = Some(Utc::now());

        let raw = serde_json::to_string(&progress)?;
        self.store.set(&key, &raw)?;
        Ok(true)
    }

    /// Whether a lesson has been completed.
    pub fn is_lesson_complete(&self, year_level: &str, module: &str, lesson: &str) -> bool {
        self.module_record(&Self::module_key(year_level, module))
            .completed
            .iter()
            .any(|l| l == lesson)
    }

    /// Completed lesson ids for a module.
    pub fn module_progress(&self, year_level: &str, module: &str) -> Vec<String> {
        self.module_record(&Self::module_key(year_level, module))
            .completed
    }

    /// Module completion percentage, rounded to the nearest whole percent.
    /// A module with no lessons reports 0.
    pub fn completion_percentage(&self, year_level: &str, module: &str, total_lessons: u32) -> u32 {
        if total_lessons == 0 {
            return 0;
        }
        let completed = self.module_progress(year_level, module).len() as f64;
        (completed / f64::from(total_lessons) * 100.0).round() as u32
    }

    /// Store a JSON user preference.
    pub fn set_preference(&mut self, key: &str, value: &serde_json::Value) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.store.set(&format!("{PREFIX}pref_{key}"), &raw)?;
        Ok(())
    }

    /// Fetch a JSON user preference.
    pub fn preference(&self, key: &str) -> Option<serde_json::Value> {
        self.store
            .get(&format!("{PREFIX}pref_{key}"))
            .and_then(|raw| serde_json::from_str(&raw).ok())
    }

    /// Remove every hub record: progress, preferences and gamification keys.
    pub fn clear_all(&mut self) -> Result<()> {
        for key in self.store.keys() {
            if key.starts_with(PREFIX) || key.starts_with(GAMIFICATION_PREFIX) {
                self.store.remove(&key)?;
            }
        }
        Ok(())
    }

    fn module_record(&self, key: &str) -> ModuleProgress {
        self.store
            .get(key)
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn tracker() -> ProgressTracker<MemoryStore> {
        ProgressTracker::new(MemoryStore::new())
    }

    #[test]
    fn mark_complete_is_idempotent() {
        let mut t = tracker();
        assert!(t
            .mark_lesson_complete("hsc-biology", "module-5-heredity", "lesson-12")
            .unwrap());
        assert!(!t
            .mark_lesson_complete("hsc-biology", "module-5-heredity", "lesson-12")
            .unwrap());

        assert_eq!(
            t.module_progress("hsc-biology", "module-5-heredity"),
            vec!["lesson-12"]
        );
    }

    #[test]
    fn completion_is_scoped_per_module() {
        let mut t = tracker();
        t.mark_lesson_complete("hsc-biology", "module-5-heredity", "lesson-1")
            .unwrap();

        assert!(t.is_lesson_complete("hsc-biology", "module-5-heredity", "lesson-1"));
        assert!(!t.is_lesson_complete("hsc-biology", "module-6-genetic-change", "lesson-1"));
    }

    #[test]
    fn completion_percentage_rounds() {
        let mut t = tracker();
        t.mark_lesson_complete("y", "m", "l1").unwrap();
        t.mark_lesson_complete("y", "m", "l2").unwrap();

        assert_eq!(t.completion_percentage("y", "m", 3), 67);
        assert_eq!(t.completion_percentage("y", "m", 0), 0);
    }

    #[test]
    fn last_visited_roundtrips() {
        let mut t = tracker();
        assert!(t.last_visited().is_none());

        t.save_last_visited("hsc-biology", "module-5-heredity", "lesson-12")
            .unwrap();
        let visited = t.last_visited().unwrap();
        assert_eq!(visited.year_level, "hsc-biology");
        assert_eq!(visited.lesson, "lesson-12");
    }

    #[test]
    fn preferences_store_json_values() {
        let mut t = tracker();
        t.set_preference("reduced_motion", &serde_json::json!(true))
            .unwrap();
        assert_eq!(t.preference("reduced_motion"), Some(serde_json::json!(true)));
        assert_eq!(t.preference("missing"), None);
    }

    #[test]
    fn clear_all_removes_hub_keys_only() {
        let mut store = MemoryStore::new();
        store.set("sh_streak", "{}").unwrap();
        store.set("scienceHub_lastVisited", "{}").unwrap();
        store.set("unrelated", "keep").unwrap();

        let mut t = ProgressTracker::new(store);
        t.mark_lesson_complete("y", "m", "l1").unwrap();
        t.clear_all().unwrap();

        assert!(t.last_visited().is_none());
        assert!(t.module_progress("y", "m").is_empty());
        assert_eq!(t.store.get("sh_streak"), None);
        assert_eq!(t.store.get("unrelated").as_deref(), Some("keep"));
    }

    #[test]
    fn corrupt_module_record_reads_as_empty() {
        let mut store = MemoryStore::new();
        store
            .set("scienceHub_progress_y_m", "not json")
            .unwrap();
        let t = ProgressTracker::new(store);
        assert!(t.module_progress("y", "m").is_empty());
    }
}
