//! Rolling statistics over a window of emotion records.

mod suggestions;

use crate::emotion::{EmotionCounts, EmotionLabel};
use crate::history::EmotionRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub use suggestions::{improvement_suggestions, ActivityCategory};

const TOP_N: usize = 3;

/// Behaviour aggregated over all records sharing one emotion.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BehavioralPattern {
    pub common_activities: Vec<String>,
    pub common_locations: Vec<String>,
    pub common_postures: Vec<String>,
    pub average_heart_rate: f32,
    pub average_breathing_rate: f32,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EmotionSummary {
    pub dominant_emotion: EmotionLabel,
    pub emotion_counts: EmotionCounts,
    pub average_confidence: f32,
    pub duration_minutes: f32,
    pub behavioral_patterns: BTreeMap<EmotionLabel, BehavioralPattern>,
    pub improvement_suggestions: Vec<String>,
}

impl EmotionSummary {
    pub fn empty() -> Self {
        Self {
            dominant_emotion: EmotionLabel::Neutral,
            emotion_counts: EmotionCounts::default(),
            average_confidence: 0.0,
            duration_minutes: 0.0,
            behavioral_patterns: BTreeMap::new(),
            improvement_suggestions: Vec::new(),
        }
    }

    pub fn record_count(&self) -> u32 {
        self.emotion_counts.total()
    }
}

impl Default for EmotionSummary {
    fn default() -> Self {
        Self::empty()
    }
}

/// Insertion-ordered frequency table; the first value seen wins ties.
#[derive(Default)]
struct Frequency<'a> {
    entries: Vec<(&'a str, usize)>,
}

impl<'a> Frequency<'a> {
    fn add(&mut self, value: &'a str) {
        match self.entries.iter_mut().find(|(v, _)| *v == value) {
            Some((_, n)) => *n += 1,
            None => self.entries.push((value, 1)),
        }
    }

    fn top(mut self, n: usize) -> Vec<String> {
        // stable sort keeps first-seen order among equal counts
        self.entries.sort_by(|a, b| b.1.cmp(&a.1));
        self.entries
            .into_iter()
            .take(n)
            .map(|(v, _)| v.to_owned())
            .collect()
    }
}

#[derive(Default)]
struct PatternAccumulator<'a> {
    activities: Frequency<'a>,
    locations: Frequency<'a>,
    postures: Frequency<'a>,
    heart_rate_sum: f64,
    breathing_rate_sum: f64,
    count: usize,
}

impl<'a> PatternAccumulator<'a> {
    fn add(&mut self, record: &'a EmotionRecord) {
        self.activities.add(&record.behavioral.activity);
        self.locations.add(&record.behavioral.location);
        self.postures.add(&record.behavioral.posture);
        self.heart_rate_sum += f64::from(record.physiological.heart_rate);
        self.breathing_rate_sum += f64::from(record.physiological.breathing_rate);
        self.count += 1;
    }

    fn finish(self) -> BehavioralPattern {
        let n = self.count.max(1) as f64;
        BehavioralPattern {
            common_activities: self.activities.top(TOP_N),
            common_locations: self.locations.top(TOP_N),
            common_postures: self.postures.top(TOP_N),
            average_heart_rate: (self.heart_rate_sum / n) as f32,
            average_breathing_rate: (self.breathing_rate_sum / n) as f32,
        }
    }
}

/// Summarizes an ordered window of records.
///
/// An empty window yields [`EmotionSummary::empty`]. Duration spans the first to
/// the last record of the window.
pub fn generate_summary<'a, I>(records: I) -> EmotionSummary
where
    I: IntoIterator<Item = &'a EmotionRecord>,
{
    let mut counts = EmotionCounts::default();
    let mut confidence_sum = 0.0f64;
    let mut accumulators: BTreeMap<EmotionLabel, PatternAccumulator<'a>> = BTreeMap::new();
    let mut first: Option<&EmotionRecord> = None;
    let mut last: Option<&EmotionRecord> = None;

    for record in records {
        counts.increment(record.emotion);
        confidence_sum += f64::from(record.confidence);
        accumulators.entry(record.emotion).or_default().add(record);
        if first.is_none() {
            first = Some(record);
        }
        last = Some(record);
    }

    let total = counts.total();
    if total == 0 {
        return EmotionSummary::empty();
    }

    let behavioral_patterns: BTreeMap<EmotionLabel, BehavioralPattern> = accumulators
        .into_iter()
        .map(|(label, acc)| (label, acc.finish()))
        .collect();

    let dominant_emotion = counts.dominant();
    let improvement_suggestions = behavioral_patterns
        .get(&dominant_emotion)
        .map(|pattern| improvement_suggestions(dominant_emotion, pattern))
        .unwrap_or_default();

    let duration_minutes = match (first, last) {
        (Some(first), Some(last)) => {
            let elapsed = last.timestamp.signed_duration_since(first.timestamp);
            elapsed.num_milliseconds() as f32 / 60_000.0
        }
        _ => 0.0,
    };

    EmotionSummary {
        dominant_emotion,
        emotion_counts: counts,
        average_confidence: (confidence_sum / f64::from(total)) as f32,
        duration_minutes,
        behavioral_patterns,
        improvement_suggestions,
    }
}
