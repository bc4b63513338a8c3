use crate::emotion::EmotionLabel;
use crate::summary::BehavioralPattern;

const HIGH_HEART_RATE_BPM: f32 = 90.0;

pub const SUGGEST_WORK_BREAKS: &str =
    "Take short breaks while working and try a deep-breathing exercise.";
pub const SUGGEST_RELAXATION: &str =
    "Your heart rate is elevated; try a relaxing activity such as meditation or light exercise.";
pub const SUGGEST_GO_OUTSIDE: &str =
    "Spending long periods in the bedroom can deepen a low mood; try some time outdoors.";
pub const SUGGEST_DAILY_EXERCISE: &str =
    "Moderate exercise can lift your mood; aim for 30 minutes every day.";

/// Coarse buckets that free-text activities and locations are matched against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActivityCategory {
    Work,
    Bedroom,
    Exercise,
}

impl ActivityCategory {
    fn keywords(self) -> &'static [&'static str] {
        match self {
            ActivityCategory::Work => &["work", "working", "office", "工作"],
            ActivityCategory::Bedroom => &["bedroom", "卧室"],
            ActivityCategory::Exercise => &["exercise", "workout", "运动"],
        }
    }

    pub fn matches(self, value: &str) -> bool {
        let value = value.trim().to_lowercase();
        self.keywords().iter().any(|k| *k == value)
    }

    pub fn any_in(self, values: &[String]) -> bool {
        values.iter().any(|v| self.matches(v))
    }
}

/// Rule table keyed on the dominant emotion and its behaviour pattern.
pub fn improvement_suggestions(dominant: EmotionLabel, pattern: &BehavioralPattern) -> Vec<String> {
    let mut out = Vec::new();

    match dominant {
        EmotionLabel::Stressed | EmotionLabel::Anxious => {
            if ActivityCategory::Work.any_in(&pattern.common_activities) {
                out.push(SUGGEST_WORK_BREAKS.to_owned());
            }
            if pattern.average_heart_rate > HIGH_HEART_RATE_BPM {
                out.push(SUGGEST_RELAXATION.to_owned());
            }
        }
        EmotionLabel::Sad => {
            if ActivityCategory::Bedroom.any_in(&pattern.common_locations) {
                out.push(SUGGEST_GO_OUTSIDE.to_owned());
            }
            if !ActivityCategory::Exercise.any_in(&pattern.common_activities) {
                out.push(SUGGEST_DAILY_EXERCISE.to_owned());
            }
        }
        EmotionLabel::Happy
        | EmotionLabel::Neutral
        | EmotionLabel::Angry
        | EmotionLabel::Fear
        | EmotionLabel::Surprise
        | EmotionLabel::Disgust
        | EmotionLabel::Confused
        | EmotionLabel::Bored
        | EmotionLabel::Focused => {}
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(activities: &[&str], locations: &[&str], heart_rate: f32) -> BehavioralPattern {
        BehavioralPattern {
            common_activities: activities.iter().map(|s| s.to_string()).collect(),
            common_locations: locations.iter().map(|s| s.to_string()).collect(),
            common_postures: Vec::new(),
            average_heart_rate: heart_rate,
            average_breathing_rate: 15.0,
        }
    }

    #[test]
    fn anxious_at_work_suggests_breaks_only_when_heart_rate_normal() {
        let s = improvement_suggestions(
            EmotionLabel::Anxious,
            &pattern(&["Work", "coffee"], &["office"], 80.0),
        );
        assert_eq!(s, vec![SUGGEST_WORK_BREAKS.to_owned()]);
    }

    #[test]
    fn stressed_heart_rate_threshold_is_strict() {
        let at_threshold =
            improvement_suggestions(EmotionLabel::Stressed, &pattern(&["reading"], &[], 90.0));
        assert!(at_threshold.is_empty());

        let above =
            improvement_suggestions(EmotionLabel::Stressed, &pattern(&["reading"], &[], 90.5));
        assert_eq!(above, vec![SUGGEST_RELAXATION.to_owned()]);
    }

    #[test]
    fn sad_in_bedroom_without_exercise() {
        let s = improvement_suggestions(
            EmotionLabel::Sad,
            &pattern(&["sleep"], &["卧室", "kitchen"], 60.0),
        );
        assert_eq!(
            s,
            vec![SUGGEST_GO_OUTSIDE.to_owned(), SUGGEST_DAILY_EXERCISE.to_owned()]
        );

        let exercising =
            improvement_suggestions(EmotionLabel::Sad, &pattern(&["exercise"], &["gym"], 60.0));
        assert!(exercising.is_empty());
    }

    #[test]
    fn other_emotions_get_nothing() {
        let p = pattern(&["work"], &["bedroom"], 120.0);
        for label in [EmotionLabel::Happy, EmotionLabel::Angry, EmotionLabel::Focused] {
            assert!(improvement_suggestions(label, &p).is_empty());
        }
    }
}
