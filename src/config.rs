//! Configuration for lecture-video generation.
//!
//! All behaviour is controlled through [`GenerationConfig`], built via its
//! [`GenerationConfigBuilder`]. Keeping every knob in one struct makes it
//! trivial to share a config across requests, log it, and diff two runs to
//! understand why their outputs differ.
//!
//! Temperatures are fixed per call type, not user input: cleaning and
//! outlining want determinism, narration wants a conversational register.

use crate::error::LectureError;
use edgequake_llm::LLMProvider;
use std::fmt;
use std::sync::Arc;

/// Configuration for one or more pipeline invocations.
///
/// Built via [`GenerationConfig::builder()`] or [`GenerationConfig::default()`].
/// Read-only after construction; a single instance is shared by every request
/// the server handles.
#[derive(Clone)]
pub struct GenerationConfig {
    /// LLM model identifier, e.g. "gpt-4o". If None, uses the provider default.
    pub model: Option<String>,

    /// LLM provider name (e.g. "openai", "anthropic", "ollama").
    /// If None along with `provider`, the provider is auto-detected from the
    /// environment.
    pub provider_name: Option<String>,

    /// Pre-constructed LLM provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Temperature for the text-cleaning call. Default: 0.2.
    ///
    /// Cleaning must be faithful to the extracted text; a near-deterministic
    /// setting keeps the model from paraphrasing content it should only strip
    /// noise from.
    pub refine_temperature: f32,

    /// Temperature for the outline call. Default: 0.5.
    pub outline_temperature: f32,

    /// Temperature for the narration call. Default: 0.7.
    ///
    /// Narration is the one place creativity helps: the model expands outline
    /// bullets into spoken prose rather than transcribing them.
    pub narration_temperature: f32,

    /// Maximum tokens the model may generate per call. Default: 4096.
    pub max_tokens: usize,

    /// Maximum retry attempts on a transient model failure. Default: 3.
    ///
    /// Only rate-limit/connection/timeout failures are retried; auth and
    /// validation errors surface immediately.
    pub max_retries: u32,

    /// Initial retry delay in milliseconds (exponential backoff). Default: 500.
    pub retry_backoff_ms: u64,

    /// Per-model-call timeout in seconds. Default: 120.
    pub api_timeout_secs: u64,

    /// TTS voice selector. Default: "alloy".
    pub voice: String,

    /// TTS model identifier. Default: "tts-1".
    pub tts_model: String,

    /// OpenAI-compatible speech-synthesis endpoint.
    pub tts_endpoint: String,

    /// TTS API key. If None, read from `OPENAI_API_KEY` at client construction.
    pub tts_api_key: Option<String>,

    /// Maximum characters per TTS call. Default: 3000.
    ///
    /// Longer page segments are chunked at sentence boundaries and the chunk
    /// audio is concatenated back into one per-page file.
    pub tts_chunk_chars: usize,

    /// Per-TTS-call timeout in seconds. Default: 120.
    pub tts_timeout_secs: u64,

    /// Headless document converter binary. Default: "soffice".
    pub converter_bin: String,

    /// Bounded wait for the document converter, in seconds. Default: 60.
    ///
    /// The converter runs inside a synchronous request; an unbounded wait
    /// would let one wedged LibreOffice process hold a request open forever.
    pub converter_timeout_secs: u64,

    /// ffmpeg binary used for clip building and muxing. Default: "ffmpeg".
    pub ffmpeg_bin: String,

    /// ffprobe binary used for audio-duration probing. Default: "ffprobe".
    pub ffprobe_bin: String,

    /// Bounded wait for each ffmpeg invocation, in seconds. Default: 300.
    pub mux_timeout_secs: u64,

    /// Output video frame rate. Default: 24.
    pub fps: u32,

    /// Maximum rendered slide dimension (width or height) in pixels. Default: 1920.
    ///
    /// Caps pdfium's allocation regardless of the deck's physical page size;
    /// the other dimension scales proportionally.
    pub slide_pixels: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: None,
            provider_name: None,
            provider: None,
            refine_temperature: 0.2,
            outline_temperature: 0.5,
            narration_temperature: 0.7,
            max_tokens: 4096,
            max_retries: 3,
            retry_backoff_ms: 500,
            api_timeout_secs: 120,
            voice: "alloy".to_string(),
            tts_model: "tts-1".to_string(),
            tts_endpoint: "https://api.openai.com/v1/audio/speech".to_string(),
            tts_api_key: None,
            tts_chunk_chars: 3000,
            tts_timeout_secs: 120,
            converter_bin: "soffice".to_string(),
            converter_timeout_secs: 60,
            ffmpeg_bin: "ffmpeg".to_string(),
            ffprobe_bin: "ffprobe".to_string(),
            mux_timeout_secs: 300,
            fps: 24,
            slide_pixels: 1920,
        }
    }
}

impl fmt::Debug for GenerationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationConfig")
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("refine_temperature", &self.refine_temperature)
            .field("outline_temperature", &self.outline_temperature)
            .field("narration_temperature", &self.narration_temperature)
            .field("max_tokens", &self.max_tokens)
            .field("max_retries", &self.max_retries)
            .field("voice", &self.voice)
            .field("tts_model", &self.tts_model)
            .field("converter_bin", &self.converter_bin)
            .field("fps", &self.fps)
            .field("slide_pixels", &self.slide_pixels)
            .finish()
    }
}

impl GenerationConfig {
    /// Create a new builder for `GenerationConfig`.
    pub fn builder() -> GenerationConfigBuilder {
        GenerationConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`GenerationConfig`].
#[derive(Debug)]
pub struct GenerationConfigBuilder {
    config: GenerationConfig,
}

impl GenerationConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn refine_temperature(mut self, t: f32) -> Self {
        self.config.refine_temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn outline_temperature(mut self, t: f32) -> Self {
        self.config.outline_temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn narration_temperature(mut self, t: f32) -> Self {
        self.config.narration_temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.config.max_retries = n;
        self
    }

    pub fn retry_backoff_ms(mut self, ms: u64) -> Self {
        self.config.retry_backoff_ms = ms;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn voice(mut self, voice: impl Into<String>) -> Self {
        self.config.voice = voice.into();
        self
    }

    pub fn tts_model(mut self, model: impl Into<String>) -> Self {
        self.config.tts_model = model.into();
        self
    }

    pub fn tts_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.tts_endpoint = endpoint.into();
        self
    }

    pub fn tts_api_key(mut self, key: impl Into<String>) -> Self {
        self.config.tts_api_key = Some(key.into());
        self
    }

    pub fn tts_chunk_chars(mut self, n: usize) -> Self {
        self.config.tts_chunk_chars = n.max(1);
        self
    }

    pub fn tts_timeout_secs(mut self, secs: u64) -> Self {
        self.config.tts_timeout_secs = secs;
        self
    }

    pub fn converter_bin(mut self, bin: impl Into<String>) -> Self {
        self.config.converter_bin = bin.into();
        self
    }

    pub fn converter_timeout_secs(mut self, secs: u64) -> Self {
        self.config.converter_timeout_secs = secs;
        self
    }

    pub fn ffmpeg_bin(mut self, bin: impl Into<String>) -> Self {
        self.config.ffmpeg_bin = bin.into();
        self
    }

    pub fn ffprobe_bin(mut self, bin: impl Into<String>) -> Self {
        self.config.ffprobe_bin = bin.into();
        self
    }

    pub fn mux_timeout_secs(mut self, secs: u64) -> Self {
        self.config.mux_timeout_secs = secs;
        self
    }

    pub fn fps(mut self, fps: u32) -> Self {
        self.config.fps = fps;
        self
    }

    pub fn slide_pixels(mut self, px: u32) -> Self {
        self.config.slide_pixels = px.max(100);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<GenerationConfig, LectureError> {
        let c = &self.config;
        if c.fps == 0 || c.fps > 60 {
            return Err(LectureError::Internal(format!(
                "fps must be 1–60, got {}",
                c.fps
            )));
        }
        if c.tts_chunk_chars == 0 {
            return Err(LectureError::Internal(
                "tts_chunk_chars must be ≥ 1".into(),
            ));
        }
        if c.converter_timeout_secs == 0 || c.mux_timeout_secs == 0 {
            return Err(LectureError::Internal(
                "external tool timeouts must be ≥ 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let c = GenerationConfig::builder().build().unwrap();
        assert_eq!(c.fps, 24);
        assert_eq!(c.refine_temperature, 0.2);
        assert_eq!(c.narration_temperature, 0.7);
        assert_eq!(c.voice, "alloy");
    }

    #[test]
    fn temperatures_are_clamped() {
        let c = GenerationConfig::builder()
            .narration_temperature(9.0)
            .refine_temperature(-1.0)
            .build()
            .unwrap();
        assert_eq!(c.narration_temperature, 2.0);
        assert_eq!(c.refine_temperature, 0.0);
    }

    #[test]
    fn zero_fps_is_rejected() {
        assert!(GenerationConfig::builder().fps(0).build().is_err());
    }
}
