use crate::config::{ApiKey, SpeechConfig};
use crate::speech::{AudioPayload, SpeechError, SpeechToText, Transcript};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use futures::future::BoxFuture;
use futures::FutureExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

/// Cloud speech-to-text over the v1 `speech:recognize` REST endpoint.
#[derive(Clone)]
pub struct GoogleSpeechClient {
    client: Client,
    endpoint: Url,
    language_code: String,
    api_key: ApiKey,
}

impl GoogleSpeechClient {
    pub fn new(config: &SpeechConfig) -> Result<Self, SpeechError> {
        let api_key = config.api_key.clone().ok_or(SpeechError::MissingApiKey)?;
        Ok(Self {
            client: Client::new(),
            endpoint: config.endpoint.clone(),
            language_code: config.language_code.clone(),
            api_key,
        })
    }

    fn request_url(&self) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("key", self.api_key.expose());
        url
    }

    fn build_request(&self, audio: &AudioPayload) -> RecognizeRequest {
        RecognizeRequest {
            config: RecognitionConfig {
                encoding: "LINEAR16",
                sample_rate_hertz: audio.sample_rate_hz,
                language_code: self.language_code.clone(),
                enable_automatic_punctuation: true,
            },
            audio: RecognitionAudio {
                content: STANDARD.encode(&audio.pcm_le16),
            },
        }
    }
}

#[derive(Serialize)]
struct RecognizeRequest {
    config: RecognitionConfig,
    audio: RecognitionAudio,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RecognitionConfig {
    encoding: &'static str,
    sample_rate_hertz: u32,
    language_code: String,
    enable_automatic_punctuation: bool,
}

#[derive(Serialize)]
struct RecognitionAudio {
    content: String,
}

#[derive(Deserialize)]
struct RecognizeResponse {
    #[serde(default)]
    results: Vec<RecognitionResult>,
}

#[derive(Deserialize)]
struct RecognitionResult {
    #[serde(default)]
    alternatives: Vec<RecognitionAlternative>,
}

#[derive(Deserialize)]
struct RecognitionAlternative {
    transcript: String,
}

fn parse_response(response: RecognizeResponse) -> Result<Transcript, SpeechError> {
    let first = response
        .results
        .into_iter()
        .next()
        .ok_or(SpeechError::NoResults)?;
    let alternative = first
        .alternatives
        .into_iter()
        .next()
        .ok_or_else(|| SpeechError::InvalidResponse("result has no alternatives".to_owned()))?;
    Ok(Transcript {
        text: alternative.transcript,
    })
}

impl SpeechToText for GoogleSpeechClient {
    fn transcribe(&self, audio: AudioPayload) -> BoxFuture<'_, Result<Transcript, SpeechError>> {
        async move {
            let request = self.build_request(&audio);
            tracing::debug!(
                bytes = audio.pcm_le16.len(),
                sample_rate_hz = audio.sample_rate_hz,
                language = %self.language_code,
                "sending speech recognition request"
            );

            let response = self
                .client
                .post(self.request_url())
                .json(&request)
                .send()
                .await?;

            if !response.status().is_success() {
                let status = response.status().as_u16();
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                tracing::warn!(status, "speech recognition failed");
                return Err(SpeechError::Api(status, body));
            }

            let body: RecognizeResponse = response
                .json()
                .await
                .map_err(|e| SpeechError::InvalidResponse(format!("Failed to parse JSON: {e}")))?;

            parse_response(body)
        }
        .boxed()
    }
}
