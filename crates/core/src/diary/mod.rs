//! Human-readable rendering of an emotion summary.

use crate::history::EmotionRecord;
use crate::summary::EmotionSummary;

pub const INSUFFICIENT_TREND_DATA: &str = "Not enough data to analyze the trend.";
pub const TREND_SEPARATOR: &str = " -> ";

/// Trend line over `recent`, which is newest first as returned by the store.
/// The line itself reads oldest to newest.
pub fn emotion_trend(recent: &[EmotionRecord]) -> String {
    if recent.len() < 2 {
        return INSUFFICIENT_TREND_DATA.to_owned();
    }
    let steps: Vec<String> = recent
        .iter()
        .rev()
        .map(|r| format!("{} ({})", r.emotion, r.behavioral.activity))
        .collect();
    format!("Recent emotion changes: {}", steps.join(TREND_SEPARATOR))
}

pub fn format_diary(summary: &EmotionSummary, recent: &[EmotionRecord]) -> String {
    let distribution: Vec<String> = summary
        .emotion_counts
        .iter()
        .filter(|(_, count)| *count > 0)
        .map(|(label, count)| format!("{label}: {count} times"))
        .collect();

    let mut lines = vec![
        "Emotion summary:".to_owned(),
        format!("Dominant emotion: {}", summary.dominant_emotion),
        format!("Distribution: {}", distribution.join(", ")),
        format!(
            "Average confidence: {:.1}%",
            summary.average_confidence * 100.0
        ),
        format!("Duration: {:.1} minutes", summary.duration_minutes),
        String::new(),
        "Behavior patterns:".to_owned(),
    ];

    for (label, pattern) in summary
        .behavioral_patterns
        .iter()
        .filter(|(_, p)| !p.common_activities.is_empty())
    {
        lines.push(format!("When {label}:"));
        lines.push(format!("- Activities: {}", pattern.common_activities.join(", ")));
        lines.push(format!("- Locations: {}", pattern.common_locations.join(", ")));
        lines.push(format!("- Postures: {}", pattern.common_postures.join(", ")));
        lines.push(format!("- Average heart rate: {:.1} bpm", pattern.average_heart_rate));
        lines.push(format!(
            "- Average breathing rate: {:.1} breaths/min",
            pattern.average_breathing_rate
        ));
    }

    lines.push(String::new());
    lines.push("Suggestions:".to_owned());
    lines.extend(summary.improvement_suggestions.iter().map(|s| format!("- {s}")));

    lines.push(String::new());
    lines.push("Emotion trend:".to_owned());
    lines.push(emotion_trend(recent));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emotion::{BehavioralData, EmotionLabel, PhysiologicalData};
    use crate::summary::generate_summary;
    use chrono::{Duration, Local, TimeZone};
    use uuid::Uuid;

    fn record(minute: i64, emotion: EmotionLabel, activity: &str) -> EmotionRecord {
        EmotionRecord {
            id: Uuid::new_v4(),
            timestamp: Local.with_ymd_and_hms(2024, 5, 14, 9, 0, 0).unwrap()
                + Duration::minutes(minute),
            emotion,
            confidence: 0.75,
            landmarks: Vec::new(),
            behavioral: BehavioralData {
                activity: activity.to_owned(),
                location: "home".to_owned(),
                posture: "sitting".to_owned(),
                ..Default::default()
            },
            physiological: PhysiologicalData {
                heart_rate: 72.0,
                breathing_rate: 14.0,
                ..Default::default()
            },
            notes: None,
        }
    }

    #[test]
    fn trend_needs_two_records() {
        assert_eq!(emotion_trend(&[]), INSUFFICIENT_TREND_DATA);
        assert_eq!(
            emotion_trend(&[record(0, EmotionLabel::Happy, "x")]),
            INSUFFICIENT_TREND_DATA
        );
    }

    #[test]
    fn trend_reads_oldest_to_newest() {
        // newest first, as the store hands them out
        let recent = vec![
            record(2, EmotionLabel::Sad, "tv"),
            record(1, EmotionLabel::Neutral, "lunch"),
            record(0, EmotionLabel::Happy, "work"),
        ];
        assert_eq!(
            emotion_trend(&recent),
            "Recent emotion changes: happy (work) -> neutral (lunch) -> sad (tv)"
        );
    }

    #[test]
    fn diary_lists_counts_percentages_and_patterns() {
        let records = vec![
            record(0, EmotionLabel::Happy, "work"),
            record(3, EmotionLabel::Happy, "work"),
            record(6, EmotionLabel::Sad, "tv"),
        ];
        let summary = generate_summary(&records);
        let recent: Vec<EmotionRecord> = records.iter().rev().cloned().collect();
        let text = format_diary(&summary, &recent);

        assert!(text.contains("Dominant emotion: happy"));
        assert!(text.contains("Distribution: happy: 2 times, sad: 1 times"));
        assert!(text.contains("Average confidence: 75.0%"));
        assert!(text.contains("Duration: 6.0 minutes"));
        assert!(text.contains("When happy:\n- Activities: work"));
        assert!(text.contains("- Average heart rate: 72.0 bpm"));
        assert!(text.ends_with("happy (work) -> happy (work) -> sad (tv)"));
    }

    #[test]
    fn empty_diary_layout() {
        let text = format_diary(&EmotionSummary::empty(), &[]);
        let expected = [
            "Emotion summary:",
            "Dominant emotion: neutral",
            "Distribution: ",
            "Average confidence: 0.0%",
            "Duration: 0.0 minutes",
            "",
            "Behavior patterns:",
            "",
            "Suggestions:",
            "",
            "Emotion trend:",
            INSUFFICIENT_TREND_DATA,
        ]
        .join("\n");
        assert_eq!(text, expected);
    }

    #[test]
    fn empty_diary_is_well_formed() {
        let text = format_diary(&EmotionSummary::empty(), &[]);
        assert!(text.contains("Dominant emotion: neutral"));
        assert!(text.contains("Average confidence: 0.0%"));
        assert!(text.ends_with(INSUFFICIENT_TREND_DATA));
    }
}
