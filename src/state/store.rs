//! Timer entity store and its persisted representation

use std::{cmp::Ordering, collections::HashSet};

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::warn;

use super::timer::{SoundType, Timer, TimerId, DEFAULT_VOLUME};
use crate::error::StorageError;

/// All timers, kept in insertion order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimerStore {
    timers: Vec<Timer>,
}

impl TimerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Timers in insertion order
    pub fn list(&self) -> &[Timer] {
        &self.timers
    }

    pub fn get(&self, id: TimerId) -> Option<&Timer> {
        self.timers.iter().find(|t| t.id == id)
    }

    /// Add a timer. Returns false, leaving the store unchanged, if the id is already taken.
    pub fn insert(&mut self, timer: Timer) -> bool {
        if self.get(timer.id).is_some() {
            return false;
        }
        self.timers.push(timer);
        true
    }

    /// Apply `patch` to the timer with the given id and return the patched timer
    pub fn patch<F>(&mut self, id: TimerId, patch: F) -> Option<&Timer>
    where
        F: FnOnce(&mut Timer),
    {
        let timer = self.timers.iter_mut().find(|t| t.id == id)?;
        patch(&mut *timer);
        Some(timer)
    }

    pub fn remove(&mut self, id: TimerId) -> Option<Timer> {
        let index = self.timers.iter().position(|t| t.id == id)?;
        Some(self.timers.remove(index))
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Timer> {
        self.timers.iter_mut()
    }

    /// Timers in display order: unfinished before completed, running before
    /// stopped, then newest first.
    pub fn sorted(&self) -> Vec<Timer> {
        let mut sorted = self.timers.clone();
        sorted.sort_by(display_order);
        sorted
    }

    /// Serialize the store into its persisted blob
    pub fn serialize(&self) -> Result<String, StorageError> {
        Ok(serde_json::to_string(&self.timers)?)
    }

    /// Rebuild a store from a persisted blob.
    ///
    /// Never fails: a missing or unreadable blob yields an empty store, and
    /// records that cannot be repaired are dropped.
    pub fn deserialize(blob: Option<&str>) -> Self {
        let Some(blob) = blob else {
            return Self::new();
        };

        let records: Vec<serde_json::Value> = match serde_json::from_str(blob) {
            Ok(records) => records,
            Err(e) => {
                warn!("Discarding malformed timer state: {}", e);
                return Self::new();
            }
        };

        let mut store = Self::new();
        let mut seen = HashSet::new();
        for value in records {
            let record = match serde_json::from_value::<TimerRecord>(value) {
                Ok(record) => record,
                Err(e) => {
                    warn!("Skipping unreadable timer record: {}", e);
                    continue;
                }
            };
            let id = record.id;
            match record.into_timer() {
                Some(timer) if seen.insert(timer.id) => {
                    store.timers.push(timer);
                }
                Some(_) => warn!("Skipping duplicate timer record {}", id),
                None => warn!("Skipping invalid timer record {}", id),
            }
        }
        store
    }
}

fn display_order(a: &Timer, b: &Timer) -> Ordering {
    a.is_completed
        .cmp(&b.is_completed)
        .then_with(|| b.is_running.cmp(&a.is_running))
        .then_with(|| b.created_at.cmp(&a.created_at))
}

/// Persisted timer layout. Fields added after the first schema are optional.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TimerRecord {
    id: TimerId,
    #[serde(default)]
    label: String,
    total_duration: f64,
    #[serde(default)]
    remaining_time: Option<f64>,
    #[serde(default)]
    is_running: bool,
    #[serde(default)]
    is_completed: bool,
    #[serde(default)]
    is_looping: bool,
    #[serde(default)]
    sound: Option<String>,
    #[serde(default)]
    use_notification: bool,
    #[serde(default)]
    volume: Option<f64>,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    created_at: Option<DateTime<Utc>>,
}

impl TimerRecord {
    fn into_timer(self) -> Option<Timer> {
        if !self.total_duration.is_finite() || self.total_duration <= 0.0 {
            return None;
        }

        let total = self.total_duration;
        let remaining = self
            .remaining_time
            .filter(|r| r.is_finite())
            .unwrap_or(total)
            .clamp(0.0, total);
        let volume = self
            .volume
            .filter(|v| v.is_finite())
            .unwrap_or(DEFAULT_VOLUME)
            .clamp(0.0, 1.0);
        let sound = self
            .sound
            .and_then(|s| s.parse().ok())
            .unwrap_or(SoundType::Beep);

        let mut timer = Timer {
            id: self.id,
            label: self.label,
            total_duration: total,
            remaining_time: remaining,
            is_running: self.is_running,
            is_completed: self.is_completed,
            is_looping: self.is_looping,
            sound,
            use_notification: self.use_notification,
            volume,
            created_at: self.created_at.unwrap_or_default(),
        };

        if timer.is_completed {
            timer.remaining_time = 0.0;
            timer.is_running = false;
        }

        Some(timer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn timer(label: &str, total: f64) -> Timer {
        Timer::new(label.to_string(), total, SoundType::Digital, true, false, 0.8)
    }

    #[test]
    fn should_keep_insertion_order() {
        let mut store = TimerStore::new();
        let a = timer("a", 5.0);
        let b = timer("b", 10.0);
        store.insert(a.clone());
        store.insert(b.clone());
        let labels: Vec<_> = store.list().iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels, ["a", "b"]);
    }

    #[test]
    fn should_reject_duplicate_ids() {
        let mut store = TimerStore::new();
        let a = timer("a", 5.0);
        assert!(store.insert(a.clone()));
        assert!(!store.insert(a));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn should_patch_and_remove_by_id() {
        let mut store = TimerStore::new();
        let a = timer("a", 5.0);
        let id = a.id;
        store.insert(a);

        let patched = store.patch(id, |t| t.label = "renamed".to_string()).unwrap();
        assert_eq!(patched.label, "renamed");

        assert!(store.remove(id).is_some());
        assert!(store.remove(id).is_none());
        assert!(store.patch(id, |_| {}).is_none());
    }

    #[test]
    fn should_sort_running_first_completed_last_then_newest() {
        let base = Utc::now();
        let mut old_idle = timer("old idle", 5.0);
        old_idle.created_at = base;
        let mut new_idle = timer("new idle", 5.0);
        new_idle.created_at = base + Duration::seconds(10);
        let mut running = timer("running", 5.0);
        running.created_at = base - Duration::seconds(10);
        running.is_running = true;
        let mut done = timer("done", 5.0);
        done.created_at = base + Duration::seconds(20);
        done.is_completed = true;
        done.remaining_time = 0.0;

        let mut store = TimerStore::new();
        for t in [done, old_idle, running, new_idle] {
            store.insert(t);
        }

        let labels: Vec<_> = store.sorted().into_iter().map(|t| t.label).collect();
        assert_eq!(labels, ["running", "new idle", "old idle", "done"]);
    }

    #[test]
    fn should_roundtrip_through_blob() {
        let mut store = TimerStore::new();
        let mut a = timer("a", 90.0);
        a.remaining_time = 12.345_678;
        a.is_running = true;
        store.insert(a);
        let mut b = timer("", 1.5);
        b.is_looping = true;
        store.insert(b);

        let blob = store.serialize().unwrap();
        assert_eq!(TimerStore::deserialize(Some(&blob)), store);
    }

    #[test]
    fn should_yield_empty_store_when_blob_missing_or_malformed() {
        assert!(TimerStore::deserialize(None).is_empty());
        assert!(TimerStore::deserialize(Some("{not json")).is_empty());
        assert!(TimerStore::deserialize(Some(r#"{"id": 1}"#)).is_empty());
    }

    #[test]
    fn should_default_fields_missing_from_older_schema() {
        let blob = r#"[{
            "id": "5f0c6a3e-7d3b-4c43-9d2a-0a5e4f5b6c7d",
            "label": "Pasta",
            "totalDuration": 480,
            "remainingTime": 300,
            "isRunning": false,
            "isCompleted": false,
            "createdAt": 1700000000000,
            "sound": "alarm",
            "useNotification": true,
            "theme": "dark"
        }]"#;

        let store = TimerStore::deserialize(Some(blob));
        let t = &store.list()[0];
        assert_eq!(t.volume, DEFAULT_VOLUME);
        assert!(!t.is_looping);
        assert_eq!(t.sound, SoundType::Alarm);
        assert_eq!(t.remaining_time, 300.0);
        assert_eq!(t.created_at.timestamp_millis(), 1_700_000_000_000);
    }

    #[test]
    fn should_drop_invalid_records_and_repair_the_rest() {
        let blob = r#"[
            {"id": "not-a-uuid", "totalDuration": 10},
            {"id": "11111111-1111-4111-8111-111111111111", "totalDuration": -3},
            {"id": "22222222-2222-4222-8222-222222222222", "totalDuration": 10,
             "remainingTime": 25, "volume": 7, "sound": "kazoo"},
            {"id": "33333333-3333-4333-8333-333333333333", "totalDuration": 10,
             "remainingTime": 4, "isRunning": true, "isCompleted": true}
        ]"#;

        let store = TimerStore::deserialize(Some(blob));
        assert_eq!(store.len(), 2);

        let clamped = &store.list()[0];
        assert_eq!(clamped.remaining_time, 10.0);
        assert_eq!(clamped.volume, 1.0);
        assert_eq!(clamped.sound, SoundType::Beep);

        let completed = &store.list()[1];
        assert_eq!(completed.remaining_time, 0.0);
        assert!(!completed.is_running);
    }
}
