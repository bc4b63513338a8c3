mod google;

use bytes::Bytes;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

pub use google::GoogleSpeechClient;

/// A recorded utterance: 16-bit little-endian linear PCM, mono.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AudioPayload {
    pub pcm_le16: Bytes,
    pub sample_rate_hz: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Transcript {
    pub text: String,
}

#[derive(thiserror::Error, Debug)]
pub enum SpeechError {
    #[error("speech api key not configured")]
    MissingApiKey,

    #[error("http error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("speech api error {0}: {1}")]
    Api(u16, String),

    #[error("no transcription results")]
    NoResults,

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

pub trait SpeechToText: Send + Sync {
    fn transcribe(&self, audio: AudioPayload) -> BoxFuture<'_, Result<Transcript, SpeechError>>;
}
