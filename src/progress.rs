//! Lesson progress for the dashboard.
//!
//! Three keys are kept in step: the list of completed lesson ids, one flag per
//! lesson, and an aggregate record with score and badges.

use querylab_core::KeyValueStore;
use serde::{Deserialize, Serialize};

pub const COMPLETED_LESSONS_KEY: &str = "completedLessons";
pub const USER_PROGRESS_KEY: &str = "userProgress";

/// Per-lesson completion flag key
pub fn lesson_flag_key(lesson_id: &str) -> String {
    format!("lesson_{}_completed", lesson_id)
}

/// Badges in award order: (id, completed lessons needed, total score needed)
const BADGES: [(&str, usize, u32); 5] = [
    ("first-lesson", 1, 0),
    ("getting-started", 3, 0),
    ("sql-apprentice", 5, 0),
    ("query-master", 10, 0),
    ("high-scorer", 0, 500),
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    #[serde(default)]
    pub completed_lessons: Vec<String>,
    #[serde(default)]
    pub total_score: u32,
    #[serde(default)]
    pub badges: Vec<String>,
}

/// Dashboard numbers for a catalog of `total` lessons
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressSummary {
    pub completed: usize,
    pub total: usize,
    pub percent: f64,
    pub total_score: u32,
    pub badges: Vec<String>,
}

pub struct ProgressTracker<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> ProgressTracker<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Aggregate record; malformed or missing data reads as empty
    pub fn record(&self) -> ProgressRecord {
        self.read_json(USER_PROGRESS_KEY).unwrap_or_default()
    }

    pub fn completed_lessons(&self) -> Vec<String> {
        self.read_json(COMPLETED_LESSONS_KEY).unwrap_or_default()
    }

    pub fn is_completed(&self, lesson_id: &str) -> bool {
        self.store
            .get(&lesson_flag_key(lesson_id))
            .map(|v| v == "true")
            .unwrap_or(false)
    }

    /// Mark a lesson complete and add its score.
    ///
    /// Completing an already completed lesson changes nothing.
    ///
    /// # Returns
    /// Badges newly awarded by this completion
    pub fn complete_lesson(&mut self, lesson_id: &str, score: u32) -> Vec<String> {
        let mut completed = self.completed_lessons();
        if completed.iter().any(|id| id == lesson_id) {
            return Vec::new();
        }
        completed.push(lesson_id.to_string());

        let mut record = self.record();
        record.completed_lessons = completed.clone();
        record.total_score = record.total_score.saturating_add(score);

        let mut awarded = Vec::new();
        for (badge, lessons_needed, score_needed) in BADGES {
            let earned = completed.len() >= lessons_needed && record.total_score >= score_needed;
            if earned && !record.badges.iter().any(|b| b == badge) {
                record.badges.push(badge.to_string());
                awarded.push(badge.to_string());
            }
        }

        self.write_json(COMPLETED_LESSONS_KEY, &completed);
        self.store.set(&lesson_flag_key(lesson_id), "true");
        self.write_json(USER_PROGRESS_KEY, &record);

        tracing::info!(
            lesson_id,
            score,
            total_score = record.total_score,
            "Lesson completed"
        );
        awarded
    }

    pub fn summary(&self, total_lessons: usize) -> ProgressSummary {
        let record = self.record();
        let completed = self.completed_lessons().len();
        let percent = if total_lessons == 0 {
            0.0
        } else {
            (completed as f64 / total_lessons as f64 * 100.0).min(100.0)
        };
        ProgressSummary {
            completed,
            total: total_lessons,
            percent,
            total_score: record.total_score,
            badges: record.badges,
        }
    }

    pub fn into_store(self) -> S {
        self.store
    }

    fn read_json<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.store.get(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Ignoring malformed value under '{}': {}", key, e);
                None
            }
        }
    }

    fn write_json<T: Serialize>(&mut self, key: &str, value: &T) {
        match serde_json::to_string(value) {
            Ok(json) => self.store.set(key, &json),
            Err(e) => tracing::warn!("Could not serialize '{}': {}", key, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use querylab_core::InMemoryStore;

    fn tracker() -> ProgressTracker<InMemoryStore> {
        ProgressTracker::new(InMemoryStore::new())
    }

    #[test]
    fn test_empty_progress() {
        let tracker = tracker();
        assert_eq!(tracker.record(), ProgressRecord::default());
        assert!(tracker.completed_lessons().is_empty());
        assert!(!tracker.is_completed("intro"));
    }

    #[test]
    fn test_complete_lesson_updates_all_keys() {
        let mut tracker = tracker();
        let awarded = tracker.complete_lesson("intro", 100);
        assert_eq!(awarded, vec!["first-lesson".to_string()]);

        assert!(tracker.is_completed("intro"));
        assert_eq!(tracker.completed_lessons(), vec!["intro".to_string()]);

        let record = tracker.record();
        assert_eq!(record.total_score, 100);
        assert_eq!(record.completed_lessons, vec!["intro".to_string()]);

        let store = tracker.into_store();
        assert_eq!(store.get("lesson_intro_completed").as_deref(), Some("true"));
        assert_eq!(store.get(COMPLETED_LESSONS_KEY).as_deref(), Some("[\"intro\"]"));
        assert!(store.get(USER_PROGRESS_KEY).unwrap().contains("\"totalScore\":100"));
    }

    #[test]
    fn test_completion_is_idempotent() {
        let mut tracker = tracker();
        tracker.complete_lesson("joins", 50);
        assert!(tracker.complete_lesson("joins", 50).is_empty());
        assert_eq!(tracker.record().total_score, 50);
        assert_eq!(tracker.completed_lessons().len(), 1);
    }

    #[test]
    fn test_badge_thresholds() {
        let mut tracker = tracker();
        let mut all = Vec::new();
        for i in 0..10 {
            all.extend(tracker.complete_lesson(&format!("l{}", i), 60));
        }
        assert_eq!(
            all,
            vec![
                "first-lesson",
                "getting-started",
                "sql-apprentice",
                "high-scorer",
                "query-master"
            ]
        );
        assert_eq!(tracker.record().badges.len(), 5);
    }

    #[test]
    fn test_summary() {
        let mut tracker = tracker();
        assert_eq!(tracker.summary(0).percent, 0.0);

        tracker.complete_lesson("a", 10);
        tracker.complete_lesson("b", 10);
        let summary = tracker.summary(8);
        assert_eq!(summary.completed, 2);
        assert_eq!(summary.total, 8);
        assert_eq!(summary.percent, 25.0);
        assert_eq!(summary.total_score, 20);

        // More completions than the catalog knows about
        assert_eq!(tracker.summary(1).percent, 100.0);
    }

    #[test]
    fn test_malformed_values_read_as_defaults() {
        let store = InMemoryStore::with_values([
            (USER_PROGRESS_KEY, "nope"),
            (COMPLETED_LESSONS_KEY, "{}"),
        ]);
        let mut tracker = ProgressTracker::new(store);
        assert_eq!(tracker.record(), ProgressRecord::default());
        assert!(tracker.completed_lessons().is_empty());

        tracker.complete_lesson("x", 5);
        assert_eq!(tracker.record().total_score, 5);
    }
}
