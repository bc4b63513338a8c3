mod detector;

use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt, str::FromStr};

pub use detector::{
    detect_emotion, BoundingBox, Classification, DetectionError, EmotionClassifier,
    FaceDetection, FaceDetector, LabeledLandmark, VideoFrame,
};

/// The closed set of emotion categories tracked everywhere in the crate.
///
/// Declaration order is significant: it is the traversal order for tallies
/// and the tie-break order when picking a dominant emotion.
#[derive(
    Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(rename_all = "lowercase")]
pub enum EmotionLabel {
    Happy,
    #[default]
    Neutral,
    Sad,
    Angry,
    Fear,
    Surprise,
    Disgust,
    Stressed,
    Anxious,
    Confused,
    Bored,
    Focused,
}

impl EmotionLabel {
    pub const COUNT: usize = 12;

    pub const ALL: [EmotionLabel; Self::COUNT] = [
        EmotionLabel::Happy,
        EmotionLabel::Neutral,
        EmotionLabel::Sad,
        EmotionLabel::Angry,
        EmotionLabel::Fear,
        EmotionLabel::Surprise,
        EmotionLabel::Disgust,
        EmotionLabel::Stressed,
        EmotionLabel::Anxious,
        EmotionLabel::Confused,
        EmotionLabel::Bored,
        EmotionLabel::Focused,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EmotionLabel::Happy => "happy",
            EmotionLabel::Neutral => "neutral",
            EmotionLabel::Sad => "sad",
            EmotionLabel::Angry => "angry",
            EmotionLabel::Fear => "fear",
            EmotionLabel::Surprise => "surprise",
            EmotionLabel::Disgust => "disgust",
            EmotionLabel::Stressed => "stressed",
            EmotionLabel::Anxious => "anxious",
            EmotionLabel::Confused => "confused",
            EmotionLabel::Bored => "bored",
            EmotionLabel::Focused => "focused",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for EmotionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown emotion label: {0}")]
pub struct UnknownEmotion(pub String);

impl FromStr for EmotionLabel {
    type Err = UnknownEmotion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        EmotionLabel::ALL
            .into_iter()
            .find(|label| label.as_str() == needle)
            .ok_or_else(|| UnknownEmotion(s.to_owned()))
    }
}

/// Dense per-label tally. Every label always has an entry, zero by default.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    into = "BTreeMap<EmotionLabel, u32>",
    from = "BTreeMap<EmotionLabel, u32>"
)]
pub struct EmotionCounts([u32; EmotionLabel::COUNT]);

impl EmotionCounts {
    pub fn increment(&mut self, label: EmotionLabel) {
        self.0[label.index()] += 1;
    }

    pub fn get(&self, label: EmotionLabel) -> u32 {
        self.0[label.index()]
    }

    pub fn total(&self) -> u32 {
        self.0.iter().sum()
    }

    /// All labels with their counts, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (EmotionLabel, u32)> + '_ {
        EmotionLabel::ALL.into_iter().map(|label| (label, self.get(label)))
    }

    /// First label in declaration order holding the highest count, or
    /// `Neutral` for an empty tally.
    pub fn dominant(&self) -> EmotionLabel {
        if self.total() == 0 {
            return EmotionLabel::Neutral;
        }
        let mut best = EmotionLabel::Happy;
        for (label, count) in self.iter() {
            if count > self.get(best) {
                best = label;
            }
        }
        best
    }
}

impl From<EmotionCounts> for BTreeMap<EmotionLabel, u32> {
    fn from(counts: EmotionCounts) -> Self {
        counts.iter().collect()
    }
}

impl From<BTreeMap<EmotionLabel, u32>> for EmotionCounts {
    fn from(map: BTreeMap<EmotionLabel, u32>) -> Self {
        let mut counts = EmotionCounts::default();
        for (label, count) in map {
            counts.0[label.index()] = count;
        }
        counts
    }
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Free-text snapshot of what the user was doing at capture time.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BehavioralData {
    pub activity: String,
    pub location: String,
    pub posture: String,
    pub facial_expression: String,
    pub interaction: String,
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PhysiologicalData {
    pub heart_rate: f32,
    pub breathing_rate: f32,
    pub skin_temperature: f32,
    /// 0.0 (still) to 1.0 (vigorous)
    pub movement_intensity: f32,
}
