use crate::emotion::EmotionLabel;
use serde::{Deserialize, Serialize};

/// Inclusive numeric range.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct Range {
    pub min: f32,
    pub max: f32,
}

impl Range {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExpectedRanges {
    pub heart_rate: Range,
    pub heart_rate_variability: Range,
    pub pitch: Range,
    pub intensity: Range,
}

const fn ranges(
    hr: (f32, f32),
    hrv: (f32, f32),
    pitch: (f32, f32),
    intensity: (f32, f32),
) -> ExpectedRanges {
    ExpectedRanges {
        heart_rate: Range::new(hr.0, hr.1),
        heart_rate_variability: Range::new(hrv.0, hrv.1),
        pitch: Range::new(pitch.0, pitch.1),
        intensity: Range::new(intensity.0, intensity.1),
    }
}

/// Physiological and vocal ranges typical of each emotion.
pub fn expected_ranges(label: EmotionLabel) -> ExpectedRanges {
    match label {
        EmotionLabel::Happy => ranges((70.0, 100.0), (30.0, 100.0), (200.0, 400.0), (0.6, 1.0)),
        EmotionLabel::Neutral => ranges((60.0, 80.0), (20.0, 60.0), (100.0, 200.0), (0.3, 0.6)),
        EmotionLabel::Sad => ranges((50.0, 70.0), (10.0, 40.0), (80.0, 150.0), (0.1, 0.4)),
        EmotionLabel::Angry => ranges((80.0, 120.0), (10.0, 30.0), (150.0, 300.0), (0.7, 1.0)),
        EmotionLabel::Fear => ranges((90.0, 130.0), (5.0, 25.0), (250.0, 450.0), (0.5, 0.9)),
        EmotionLabel::Surprise => ranges((75.0, 110.0), (15.0, 45.0), (300.0, 500.0), (0.6, 1.0)),
        EmotionLabel::Disgust => ranges((65.0, 95.0), (15.0, 35.0), (100.0, 250.0), (0.4, 0.8)),
        EmotionLabel::Stressed => ranges((85.0, 115.0), (5.0, 25.0), (150.0, 300.0), (0.5, 0.9)),
        EmotionLabel::Anxious => ranges((90.0, 130.0), (5.0, 25.0), (200.0, 350.0), (0.4, 0.8)),
        EmotionLabel::Confused => ranges((70.0, 100.0), (20.0, 50.0), (120.0, 250.0), (0.3, 0.7)),
        EmotionLabel::Bored => ranges((55.0, 75.0), (15.0, 35.0), (80.0, 150.0), (0.2, 0.5)),
        EmotionLabel::Focused => ranges((65.0, 85.0), (25.0, 55.0), (100.0, 200.0), (0.3, 0.6)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_are_inclusive() {
        let r = Range::new(60.0, 80.0);
        assert!(r.contains(60.0));
        assert!(r.contains(80.0));
        assert!(!r.contains(80.01));
        assert!(!r.contains(f32::NAN));
    }

    #[test]
    fn every_label_has_ordered_ranges() {
        for label in EmotionLabel::ALL {
            let e = expected_ranges(label);
            for r in [e.heart_rate, e.heart_rate_variability, e.pitch, e.intensity] {
                assert!(r.min < r.max, "{label}: {r:?}");
            }
        }
    }
}
