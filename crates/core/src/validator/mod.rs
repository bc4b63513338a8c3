//! Cross-checks one multimodal snapshot against per-emotion expected ranges.

mod ranges;

use crate::config::SensorConfig;
use crate::emotion::{EmotionLabel, Landmark};
use serde::{Deserialize, Serialize};

pub use ranges::{expected_ranges, ExpectedRanges, Range};

/// Fixed confidence assigned to the physiological channel.
pub const PHYSIOLOGICAL_CONFIDENCE: f32 = 0.8;

const VIDEO_WEIGHT: f32 = 0.4;
const AUDIO_WEIGHT: f32 = 0.3;
const PHYSIOLOGICAL_WEIGHT: f32 = 0.3;
const LOW_CHANNEL_CONFIDENCE: f32 = 0.5;
const MIN_PLAUSIBLE_HEART_RATE: f32 = 40.0;
const MAX_PLAUSIBLE_HEART_RATE: f32 = 200.0;

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct VideoChannel {
    pub emotion: EmotionLabel,
    pub confidence: f32,
    #[serde(default)]
    pub landmarks: Vec<Landmark>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct AudioChannel {
    #[serde(default)]
    pub text: String,
    pub sentiment: EmotionLabel,
    pub confidence: f32,
    pub pitch: f32,
    pub intensity: f32,
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PhysiologicalChannel {
    pub heart_rate: f32,
    pub heart_rate_variability: f32,
    #[serde(default)]
    pub skin_conductance: f32,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct MultimodalSnapshot {
    pub video: VideoChannel,
    pub audio: AudioChannel,
    pub physiological: PhysiologicalChannel,
    /// Milliseconds since the Unix epoch.
    #[serde(default)]
    pub timestamp: i64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub confidence: f32,
    pub reasons: Vec<String>,
    pub suggestions: Vec<String>,
}

impl ValidationResult {
    fn valid() -> Self {
        Self {
            is_valid: true,
            confidence: 1.0,
            reasons: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    fn reject(&mut self, reason: String, suggestion: Option<&str>) {
        self.is_valid = false;
        self.reasons.push(reason);
        if let Some(s) = suggestion {
            self.suggestions.push(s.to_owned());
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Video,
    Audio,
    Physiological,
}

/// Channel with the highest confidence; ties go to video, then audio.
pub fn primary_channel(snapshot: &MultimodalSnapshot) -> Channel {
    let video = snapshot.video.confidence;
    let audio = snapshot.audio.confidence;
    let max = video.max(audio).max(PHYSIOLOGICAL_CONFIDENCE);

    if video == max {
        Channel::Video
    } else if audio == max {
        Channel::Audio
    } else {
        Channel::Physiological
    }
}

/// Heart rate > 100 is angry, < 60 sad, HRV > 50 happy, otherwise neutral.
pub fn physiological_emotion(physiological: &PhysiologicalChannel) -> EmotionLabel {
    if physiological.heart_rate > 100.0 {
        EmotionLabel::Angry
    } else if physiological.heart_rate < 60.0 {
        EmotionLabel::Sad
    } else if physiological.heart_rate_variability > 50.0 {
        EmotionLabel::Happy
    } else {
        EmotionLabel::Neutral
    }
}

pub fn primary_emotion(snapshot: &MultimodalSnapshot) -> EmotionLabel {
    match primary_channel(snapshot) {
        Channel::Video => snapshot.video.emotion,
        Channel::Audio => snapshot.audio.sentiment,
        Channel::Physiological => physiological_emotion(&snapshot.physiological),
    }
}

/// Weighted blend of channel confidences, used once a snapshot is inconsistent.
pub fn overall_confidence(snapshot: &MultimodalSnapshot) -> f32 {
    snapshot.video.confidence * VIDEO_WEIGHT
        + snapshot.audio.confidence * AUDIO_WEIGHT
        + PHYSIOLOGICAL_CONFIDENCE * PHYSIOLOGICAL_WEIGHT
}

pub fn validate(snapshot: &MultimodalSnapshot) -> ValidationResult {
    let mut result = ValidationResult::valid();
    let primary = primary_emotion(snapshot);
    let expected = expected_ranges(primary);

    let physio = &snapshot.physiological;
    if !expected.heart_rate.contains(physio.heart_rate) {
        result.reject(
            format!("heart rate ({}) does not match {primary}", physio.heart_rate),
            Some("Check that the physiological sensor is working."),
        );
    }
    if !expected
        .heart_rate_variability
        .contains(physio.heart_rate_variability)
    {
        result.reject(
            format!(
                "heart rate variability ({}) does not match {primary}",
                physio.heart_rate_variability
            ),
            None,
        );
    }

    let audio = &snapshot.audio;
    if !expected.pitch.contains(audio.pitch) {
        result.reject(
            format!("pitch ({}Hz) does not match {primary}", audio.pitch),
            Some("Make sure the room is quiet and speak clearly."),
        );
    }
    if !expected.intensity.contains(audio.intensity) {
        result.reject(
            format!("voice intensity ({}) does not match {primary}", audio.intensity),
            None,
        );
    }

    if snapshot.video.emotion != primary {
        result.reject(
            format!(
                "facial expression ({}) disagrees with the other channels",
                snapshot.video.emotion
            ),
            Some("Make sure your face is clearly visible and well lit."),
        );
    }

    if !result.is_valid {
        result.confidence = overall_confidence(snapshot);
        tracing::debug!(
            %primary,
            reasons = result.reasons.len(),
            confidence = result.confidence,
            "multimodal snapshot inconsistent"
        );
    }

    result
}

/// Per-channel signal quality for the channels enabled in `sensors`.
pub fn check_quality(snapshot: &MultimodalSnapshot, sensors: &SensorConfig) -> ValidationResult {
    let mut result = ValidationResult::valid();

    if sensors.video && snapshot.video.confidence < LOW_CHANNEL_CONFIDENCE {
        result.reject(
            "video emotion confidence is low".to_owned(),
            Some("Make sure your face is clearly visible."),
        );
        result.confidence *= snapshot.video.confidence;
    }

    if sensors.audio && snapshot.audio.confidence < LOW_CHANNEL_CONFIDENCE {
        result.reject(
            "audio emotion confidence is low".to_owned(),
            Some("Make sure the room is quiet and speak clearly."),
        );
        result.confidence *= snapshot.audio.confidence;
    }

    let hr = snapshot.physiological.heart_rate;
    if sensors.physiological
        && !(MIN_PLAUSIBLE_HEART_RATE..=MAX_PLAUSIBLE_HEART_RATE).contains(&hr)
    {
        result.reject(
            "heart rate reading is abnormal".to_owned(),
            Some("Check the sensor connection."),
        );
    }

    result
}
