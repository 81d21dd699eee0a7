//! Text-to-speech client.
//!
//! Talks to an OpenAI-compatible `/v1/audio/speech` endpoint and returns MP3
//! bytes. The client is constructed once per pipeline run; construction fails
//! fast when no API key can be found so a misconfigured deployment is caught
//! before any model tokens are spent.

use crate::config::GenerationConfig;
use crate::error::LectureError;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

#[derive(Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    input: &'a str,
    voice: &'a str,
    response_format: &'a str,
}

/// Client for one speech-synthesis endpoint.
pub struct TtsClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    voice: String,
}

impl TtsClient {
    /// Build a client from the generation config.
    ///
    /// The key comes from `config.tts_api_key`, falling back to the
    /// `OPENAI_API_KEY` environment variable.
    pub fn new(config: &GenerationConfig) -> Result<Self, LectureError> {
        let api_key = config
            .tts_api_key
            .clone()
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| LectureError::ServiceMisconfigured {
                service: "tts".to_string(),
                hint: "set tts_api_key in the config or the OPENAI_API_KEY environment variable"
                    .to_string(),
            })?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.tts_timeout_secs))
            .build()
            .map_err(|e| LectureError::Internal(format!("http client: {e}")))?;

        Ok(Self {
            http,
            endpoint: config.tts_endpoint.clone(),
            api_key,
            model: config.tts_model.clone(),
            voice: config.voice.clone(),
        })
    }

    /// Synthesize one text chunk into MP3 bytes.
    pub async fn synthesize(&self, text: &str) -> Result<Vec<u8>, LectureError> {
        let body = SpeechRequest {
            model: &self.model,
            input: text,
            voice: &self.voice,
            response_format: "mp3",
        };

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() || e.is_connect() {
                    LectureError::ServiceUnavailable {
                        service: "tts".to_string(),
                        detail: format!("{e}"),
                    }
                } else {
                    LectureError::Internal(format!("tts request: {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 | 403 => LectureError::ServiceMisconfigured {
                    service: "tts".to_string(),
                    hint: format!("{status}: {detail}"),
                },
                429 | 500..=599 => LectureError::ServiceUnavailable {
                    service: "tts".to_string(),
                    detail: format!("{status}: {detail}"),
                },
                _ => LectureError::Internal(format!("tts returned {status}: {detail}")),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| LectureError::ServiceUnavailable {
                service: "tts".to_string(),
                detail: format!("body read: {e}"),
            })?;

        if bytes.is_empty() {
            return Err(LectureError::ServiceUnavailable {
                service: "tts".to_string(),
                detail: "endpoint returned an empty audio body".to_string(),
            });
        }

        debug!("tts: synthesized {} chars into {} bytes", text.len(), bytes.len());
        Ok(bytes.to_vec())
    }
}

/// Split `text` into chunks of at most `max_chars` characters, preferring
/// sentence boundaries.
///
/// A chunk boundary is placed after the last sentence terminator (`.`, `!`,
/// `?`, or a newline) that fits; when a single sentence exceeds the budget it
/// is split at the last whitespace, and only as a final resort mid-word.
/// Chunks are trimmed; empty chunks never appear in the output.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut rest = text.trim();

    while !rest.is_empty() {
        if rest.chars().count() <= max_chars {
            chunks.push(rest.to_string());
            break;
        }

        // Byte index of the max_chars-th character.
        let hard_end = rest
            .char_indices()
            .nth(max_chars)
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        let window = &rest[..hard_end];

        let cut = window
            .rfind(['.', '!', '?', '\n'])
            .map(|i| i + 1)
            .or_else(|| window.rfind(char::is_whitespace))
            .unwrap_or(hard_end);
        // A boundary at position 0 would make no progress.
        let cut = if cut == 0 { hard_end } else { cut };

        let (head, tail) = rest.split_at(cut);
        let head = head.trim();
        if !head.is_empty() {
            chunks.push(head.to_string());
        }
        rest = tail.trim_start();
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_one_chunk() {
        let chunks = chunk_text("Hello there.", 100);
        assert_eq!(chunks, vec!["Hello there.".to_string()]);
    }

    #[test]
    fn splits_at_sentence_boundary() {
        let text = "First sentence. Second sentence. Third sentence.";
        let chunks = chunk_text(text, 20);
        assert!(chunks.len() >= 2);
        assert!(chunks[0].ends_with('.'));
        for c in &chunks {
            assert!(c.chars().count() <= 20, "chunk too long: {c:?}");
            assert!(!c.trim().is_empty());
        }
        assert_eq!(chunks.join(" "), text);
    }

    #[test]
    fn unbroken_text_still_makes_progress() {
        let text = "a".repeat(50);
        let chunks = chunk_text(&text, 8);
        assert!(chunks.iter().all(|c| c.chars().count() <= 8));
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn missing_key_is_misconfiguration() {
        let config = GenerationConfig::default();
        if std::env::var("OPENAI_API_KEY").is_err() {
            assert!(matches!(
                TtsClient::new(&config),
                Err(LectureError::ServiceMisconfigured { .. })
            ));
        }
    }
}
