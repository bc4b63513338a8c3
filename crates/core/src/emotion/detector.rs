use crate::emotion::{EmotionLabel, Landmark};
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug)]
pub enum DetectionError {
    #[error("model not loaded: {0}")]
    ModelUnavailable(String),
    #[error("frame rejected: {0}")]
    InvalidFrame(String),
    #[error("inference failed: {0}")]
    Inference(String),
}

/// A decoded RGBA video frame as delivered by the camera collaborator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VideoFrame {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LabeledLandmark {
    pub label: String,
    pub point: Landmark,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FaceDetection {
    pub bounding_box: BoundingBox,
    pub landmarks: Vec<LabeledLandmark>,
}

impl FaceDetection {
    pub fn points(&self) -> Vec<Landmark> {
        self.landmarks.iter().map(|l| l.point).collect()
    }
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Classification {
    pub emotion: EmotionLabel,
    pub confidence: f32,
}

impl Classification {
    /// Result reported when no face is present in the frame.
    pub const NO_FACE: Classification = Classification {
        emotion: EmotionLabel::Neutral,
        confidence: 0.0,
    };
}

/// Face/landmark model. Returns at most one face per frame.
pub trait FaceDetector: Send + Sync {
    fn detect<'a>(
        &'a self,
        frame: &'a VideoFrame,
    ) -> BoxFuture<'a, Result<Option<FaceDetection>, DetectionError>>;
}

/// Emotion model applied to a detected face region.
pub trait EmotionClassifier: Send + Sync {
    fn classify<'a>(
        &'a self,
        frame: &'a VideoFrame,
        face: &'a FaceDetection,
    ) -> BoxFuture<'a, Result<Classification, DetectionError>>;
}

/// Runs detection then classification on one frame.
///
/// A frame without a face yields [`Classification::NO_FACE`] and no landmarks.
/// Classifier output is passed through untouched.
pub async fn detect_emotion<D, C>(
    detector: &D,
    classifier: &C,
    frame: &VideoFrame,
) -> Result<(Classification, Vec<Landmark>), DetectionError>
where
    D: FaceDetector + ?Sized,
    C: EmotionClassifier + ?Sized,
{
    let Some(face) = detector.detect(frame).await? else {
        tracing::trace!("no face in frame");
        return Ok((Classification::NO_FACE, Vec::new()));
    };

    let classification = classifier.classify(frame, &face).await?;
    Ok((classification, face.points()))
}
