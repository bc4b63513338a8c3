//! Voice chat: transcribe a recording, append it to the conversation, answer it.

use crate::speech::{AudioPayload, SpeechError, SpeechToText};
use chrono::{DateTime, Local};
use futures::future::BoxFuture;
use futures::FutureExt;
use serde::Serialize;

pub const CANNED_REPLY: &str = "This is the assistant's reply.";

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub text: String,
    pub is_user: bool,
    pub timestamp: DateTime<Local>,
}

pub trait Responder: Send + Sync {
    fn respond(&self, utterance: String) -> BoxFuture<'_, String>;
}

/// Answers every utterance with the same text.
#[derive(Clone, Debug)]
pub struct CannedResponder {
    reply: String,
}

impl CannedResponder {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
        }
    }
}

impl Default for CannedResponder {
    fn default() -> Self {
        Self::new(CANNED_REPLY)
    }
}

impl Responder for CannedResponder {
    fn respond(&self, _utterance: String) -> BoxFuture<'_, String> {
        async move { self.reply.clone() }.boxed()
    }
}

pub struct VoiceChatSession<S, R> {
    stt: S,
    responder: R,
    messages: Vec<ChatMessage>,
}

impl<S, R> VoiceChatSession<S, R>
where
    S: SpeechToText,
    R: Responder,
{
    pub fn new(stt: S, responder: R) -> Self {
        Self {
            stt,
            responder,
            messages: Vec::new(),
        }
    }

    /// Transcribes `audio`, records the user turn and the reply, and returns the reply.
    ///
    /// A failed transcription leaves the conversation untouched.
    pub async fn handle_recording(&mut self, audio: AudioPayload) -> Result<String, SpeechError> {
        let transcript = self.stt.transcribe(audio).await.map_err(|e| {
            tracing::warn!(error = %e, "transcription failed");
            e
        })?;
        tracing::info!(chars = transcript.text.chars().count(), "user utterance");

        self.push(transcript.text.clone(), true);
        let reply = self.responder.respond(transcript.text).await;
        self.push(reply.clone(), false);
        Ok(reply)
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    fn push(&mut self, text: String, is_user: bool) {
        self.messages.push(ChatMessage {
            text,
            is_user,
            timestamp: Local::now(),
        });
    }
}
