mod clock;

use crate::config::HistoryConfig;
use crate::diary::format_diary;
use crate::emotion::{BehavioralData, EmotionLabel, Landmark, PhysiologicalData};
use crate::summary::{generate_summary, EmotionSummary};
use crate::util::RingBuffer;
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use serde::{Deserialize, Serialize};
use std::{fmt, sync::Arc};
use uuid::Uuid;

pub use clock::{Clock, ManualClock, SystemClock};

/// Records shown in the diary trend line.
pub const DIARY_TREND_LEN: usize = 20;

/// One emotion observation. Immutable once stored.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EmotionRecord {
    pub id: Uuid,
    pub timestamp: DateTime<Local>,
    pub emotion: EmotionLabel,
    pub confidence: f32,
    pub landmarks: Vec<Landmark>,
    #[serde(rename = "behavioralData")]
    pub behavioral: BehavioralData,
    #[serde(rename = "physiologicalData")]
    pub physiological: PhysiologicalData,
    #[serde(default, rename = "userNotes", skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Notified with the rolling summary when the store's reporting rule fires.
pub trait SummaryObserver: Send + Sync {
    fn on_summary(&self, summary: &EmotionSummary);
}

/// Bounded, insertion-ordered, in-memory emotion log.
///
/// Values are stored as given; confidence and label are not validated.
pub struct EmotionHistoryStore {
    records: RingBuffer<EmotionRecord>,
    config: HistoryConfig,
    clock: Arc<dyn Clock>,
    observers: Vec<Arc<dyn SummaryObserver>>,
}

impl fmt::Debug for EmotionHistoryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmotionHistoryStore")
            .field("len", &self.records.len())
            .field("config", &self.config)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl Default for EmotionHistoryStore {
    fn default() -> Self {
        Self::new(HistoryConfig::default())
    }
}

impl EmotionHistoryStore {
    pub fn new(config: HistoryConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: HistoryConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            records: RingBuffer::new(config.max_records.max(1)),
            config,
            clock,
            observers: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, observer: Arc<dyn SummaryObserver>) {
        self.observers.push(observer);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn config(&self) -> HistoryConfig {
        self.config
    }

    /// Appends a record stamped with the current time, evicting the oldest when full.
    /// Returns the new record's id.
    pub fn add_record(
        &mut self,
        emotion: EmotionLabel,
        confidence: f32,
        landmarks: Vec<Landmark>,
        behavioral: BehavioralData,
        physiological: PhysiologicalData,
        notes: Option<String>,
    ) -> Uuid {
        let id = Uuid::new_v4();
        let record = EmotionRecord {
            id,
            timestamp: self.clock.now(),
            emotion,
            confidence,
            landmarks,
            behavioral,
            physiological,
            notes,
        };

        if let Some(evicted) = self.records.push(record) {
            tracing::trace!(id = %evicted.id, "evicted oldest emotion record");
        }

        self.check_summary_due();
        id
    }

    fn interval(&self) -> TimeDelta {
        TimeDelta::from_std(self.config.summary_interval).unwrap_or(TimeDelta::MAX)
    }

    /// Fires observers when the newest record is older than one summary interval.
    ///
    /// This is the literal reporting rule: it triggers on a stale newest record,
    /// not after an interval's worth of new data has accumulated.
    fn check_summary_due(&self) {
        if self.observers.is_empty() {
            return;
        }
        let Some(newest) = self.records.newest() else {
            return;
        };
        let age = self.clock.now().signed_duration_since(newest.timestamp);
        if age > self.interval() {
            let summary = self.summary();
            tracing::debug!(
                dominant = %summary.dominant_emotion,
                records = summary.record_count(),
                "periodic emotion summary"
            );
            for observer in &self.observers {
                observer.on_summary(&summary);
            }
        }
    }

    /// The last `limit` records, newest first.
    pub fn recent_records(&self, limit: usize) -> Vec<EmotionRecord> {
        self.records.iter().rev().take(limit).cloned().collect()
    }

    pub fn records(&self) -> impl DoubleEndedIterator<Item = &EmotionRecord> + '_ {
        self.records.iter()
    }

    /// Records stamped within `date`, local time, inclusive.
    pub fn records_by_date(&self, date: NaiveDate) -> Vec<EmotionRecord> {
        self.records_by_date_range(date, date)
    }

    /// Records from 00:00:00.000 on `start` through 23:59:59.999 on `end`, local time.
    pub fn records_by_date_range(&self, start: NaiveDate, end: NaiveDate) -> Vec<EmotionRecord> {
        let (from, to) = day_bounds(start, end);
        self.records
            .iter()
            .filter(|r| {
                let t = r.timestamp.naive_local();
                t >= from && t <= to
            })
            .cloned()
            .collect()
    }

    /// Records no older than the summary interval.
    pub fn rolling_window(&self) -> Vec<&EmotionRecord> {
        let now = self.clock.now();
        let interval = self.interval();
        self.records
            .iter()
            .filter(|r| now.signed_duration_since(r.timestamp) <= interval)
            .collect()
    }

    pub fn summary(&self) -> EmotionSummary {
        generate_summary(self.rolling_window())
    }

    pub fn summary_by_date(&self, date: NaiveDate) -> EmotionSummary {
        generate_summary(&self.records_by_date(date))
    }

    pub fn diary_entry(&self) -> String {
        format_diary(&self.summary(), &self.recent_records(DIARY_TREND_LEN))
    }

    pub fn clear_history(&mut self) {
        tracing::info!(records = self.records.len(), "clearing emotion history");
        self.records.clear();
    }
}

fn day_bounds(start: NaiveDate, end: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
    let last_ms = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN);
    (start.and_time(NaiveTime::MIN), end.and_time(last_ms))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use std::sync::Mutex;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn add(store: &mut EmotionHistoryStore, emotion: EmotionLabel, activity: &str) -> Uuid {
        store.add_record(
            emotion,
            0.8,
            vec![Landmark::new(0.1, 0.2, 0.3)],
            BehavioralData {
                activity: activity.to_owned(),
                ..Default::default()
            },
            PhysiologicalData::default(),
            None,
        )
    }

    fn store_at(start: DateTime<Local>) -> (EmotionHistoryStore, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(start));
        let store = EmotionHistoryStore::with_clock(HistoryConfig::default(), clock.clone());
        (store, clock)
    }

    #[test]
    fn capacity_evicts_oldest_first() {
        let (mut store, clock) = store_at(at(2024, 5, 14, 8, 0));
        let mut ids = Vec::new();
        for _ in 0..1001 {
            ids.push(add(&mut store, EmotionLabel::Neutral, "idle"));
            clock.advance(Duration::seconds(1));
        }

        assert_eq!(store.len(), 1000);
        let kept: Vec<Uuid> = store.records().map(|r| r.id).collect();
        assert_eq!(kept, ids[1..].to_vec());
    }

    #[test]
    fn recent_records_are_newest_first() {
        let (mut store, clock) = store_at(at(2024, 5, 14, 8, 0));
        for label in [EmotionLabel::Happy, EmotionLabel::Sad, EmotionLabel::Angry] {
            add(&mut store, label, "x");
            clock.advance(Duration::minutes(1));
        }

        let recent: Vec<EmotionLabel> = store.recent_records(2).iter().map(|r| r.emotion).collect();
        assert_eq!(recent, vec![EmotionLabel::Angry, EmotionLabel::Sad]);
        assert_eq!(store.recent_records(10).len(), 3);
    }

    #[test]
    fn invalid_values_are_stored_as_is() {
        let (mut store, _) = store_at(at(2024, 5, 14, 8, 0));
        let id = store.add_record(
            EmotionLabel::Bored,
            -3.5,
            Vec::new(),
            BehavioralData::default(),
            PhysiologicalData::default(),
            Some("note".to_owned()),
        );
        let record = &store.recent_records(1)[0];
        assert_eq!(record.id, id);
        assert_eq!(record.confidence, -3.5);
        assert_eq!(record.notes.as_deref(), Some("note"));
    }

    #[test]
    fn date_queries_use_inclusive_day_bounds() {
        let (mut store, clock) = store_at(at(2024, 5, 13, 23, 59));
        add(&mut store, EmotionLabel::Happy, "late");
        clock.set(at(2024, 5, 14, 0, 0));
        add(&mut store, EmotionLabel::Sad, "midnight");
        clock.set(at(2024, 5, 14, 23, 59));
        add(&mut store, EmotionLabel::Angry, "evening");
        clock.set(at(2024, 5, 15, 0, 0));
        add(&mut store, EmotionLabel::Fear, "next day");

        let day = NaiveDate::from_ymd_opt(2024, 5, 14).unwrap();
        let by_date = store.records_by_date(day);
        let labels: Vec<EmotionLabel> = by_date.iter().map(|r| r.emotion).collect();
        assert_eq!(labels, vec![EmotionLabel::Sad, EmotionLabel::Angry]);
        assert_eq!(store.records_by_date_range(day, day), by_date);

        let range = store.records_by_date_range(
            NaiveDate::from_ymd_opt(2024, 5, 13).unwrap(),
            NaiveDate::from_ymd_opt(2024, 5, 14).unwrap(),
        );
        assert_eq!(range.len(), 3);
    }

    #[test]
    fn clear_history_empties_store() {
        let (mut store, _) = store_at(at(2024, 5, 14, 8, 0));
        add(&mut store, EmotionLabel::Happy, "x");
        store.clear_history();
        assert!(store.is_empty());
        assert_eq!(store.summary(), EmotionSummary::empty());
    }

    #[test]
    fn rolling_window_excludes_old_records() {
        let (mut store, clock) = store_at(at(2024, 5, 14, 8, 0));
        add(&mut store, EmotionLabel::Sad, "old");
        clock.advance(Duration::minutes(45));
        add(&mut store, EmotionLabel::Happy, "new");
        clock.advance(Duration::minutes(5));

        let window = store.rolling_window();
        assert_eq!(window.len(), 1);
        assert_eq!(window[0].emotion, EmotionLabel::Happy);
        assert_eq!(store.summary().dominant_emotion, EmotionLabel::Happy);
    }

    #[derive(Default)]
    struct Recorder(Mutex<Vec<EmotionSummary>>);

    impl SummaryObserver for Recorder {
        fn on_summary(&self, summary: &EmotionSummary) {
            self.0.lock().unwrap().push(summary.clone());
        }
    }

    /// Clock that jumps forward every time it is read after arming.
    struct SkewedClock {
        inner: ManualClock,
        step: Duration,
    }

    impl Clock for SkewedClock {
        fn now(&self) -> DateTime<Local> {
            let now = self.inner.now();
            self.inner.advance(self.step);
            now
        }
    }

    #[test]
    fn fresh_append_does_not_notify() {
        let (mut store, _) = store_at(at(2024, 5, 14, 8, 0));
        let recorder = Arc::new(Recorder::default());
        store.subscribe(recorder.clone());

        add(&mut store, EmotionLabel::Happy, "x");
        assert!(recorder.0.lock().unwrap().is_empty());
    }

    #[test]
    fn stale_newest_record_notifies_observers() {
        let clock = Arc::new(SkewedClock {
            inner: ManualClock::new(at(2024, 5, 14, 8, 0)),
            step: Duration::minutes(31),
        });
        let mut store = EmotionHistoryStore::with_clock(HistoryConfig::default(), clock);
        let recorder = Arc::new(Recorder::default());
        store.subscribe(recorder.clone());

        add(&mut store, EmotionLabel::Stressed, "work");

        let seen = recorder.0.lock().unwrap();
        assert_eq!(seen.len(), 1);
        // the only record is already outside the rolling window
        assert_eq!(seen[0], EmotionSummary::empty());
    }

    #[test]
    fn summary_by_date_uses_that_day_only() {
        let (mut store, clock) = store_at(at(2024, 5, 14, 9, 0));
        add(&mut store, EmotionLabel::Sad, "sleep");
        clock.advance(Duration::minutes(10));
        add(&mut store, EmotionLabel::Sad, "sleep");
        clock.set(at(2024, 5, 15, 9, 0));
        add(&mut store, EmotionLabel::Happy, "walk");

        let summary = store.summary_by_date(NaiveDate::from_ymd_opt(2024, 5, 14).unwrap());
        assert_eq!(summary.emotion_counts.total(), 2);
        assert_eq!(summary.dominant_emotion, EmotionLabel::Sad);
        assert!((summary.duration_minutes - 10.0).abs() < 1e-6);
    }

    #[test]
    fn record_json_uses_camel_case_field_names() {
        let (mut store, _) = store_at(at(2024, 5, 14, 9, 0));
        add(&mut store, EmotionLabel::Focused, "coding");
        let value = serde_json::to_value(store.recent_records(1)).unwrap();
        assert_eq!(value[0]["behavioralData"]["activity"], "coding");
        assert_eq!(value[0]["emotion"], "focused");
        assert!(value[0].get("userNotes").is_none());
    }
}
