//! LLM interaction: provider resolution and the shared chat helper.
//!
//! All three generative stages (refine, outline, narration) go through
//! [`chat`], so retry, timeout, and error-classification behaviour is uniform.
//! Prompt engineering lives in [`crate::prompts`] and can change without
//! touching anything here.
//!
//! ## Retry Strategy
//!
//! Only transient failures (rate limits, connection resets, timeouts) are
//! retried, with exponential backoff (`retry_backoff_ms * 2^(attempt-1)`):
//! with 500 ms base and 3 retries the wait sequence is 500 ms → 1 s → 2 s.
//! Auth and validation failures surface immediately — retrying a bad API key
//! just burns the backoff budget.

use crate::config::GenerationConfig;
use crate::error::LectureError;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, ProviderFactory};
use std::sync::Arc;
use std::time::Instant;
use tokio::time::{sleep, timeout, Duration};
use tracing::{debug, warn};

/// One completed model call.
#[derive(Debug, Clone)]
pub struct ChatOutcome {
    /// Trimmed response text. Never empty.
    pub content: String,
    pub input_tokens: usize,
    pub output_tokens: usize,
}

/// Instantiate a named provider with the given model.
fn create_provider(
    provider_name: &str,
    model: &str,
) -> Result<Arc<dyn LLMProvider>, LectureError> {
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        LectureError::ServiceMisconfigured {
            service: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}

/// Resolve the LLM provider, from most-specific to least-specific.
///
/// The four-level fallback chain lets library users and server operators each
/// set exactly as much or as little as they need:
///
/// 1. **Pre-built provider** (`config.provider`) — the caller constructed and
///    configured the provider entirely; we use it as-is. Useful in tests or
///    when the caller needs custom middleware.
///
/// 2. **Named provider + model** (`config.provider_name`) — the caller named
///    a provider (e.g. `"openai"`) and optional model. We call
///    [`ProviderFactory::create_llm_provider`] which reads the corresponding
///    API key (`OPENAI_API_KEY`, etc.) from the environment.
///
/// 3. **Environment pair** (`LECTIO_LLM_PROVIDER` + `LECTIO_MODEL`) — both
///    env vars set means the operator chose a provider and model at the
///    deployment level. Checked before full auto-detection so the model
///    choice is honoured even when multiple API keys are present.
///
/// 4. **Full auto-detection** (`ProviderFactory::from_env`) — the factory
///    scans all known API key variables and picks the first available
///    provider. An OpenAI key is preferred when present so operators with
///    several keys get a predictable default.
pub fn resolve_provider(
    config: &GenerationConfig,
) -> Result<Arc<dyn LLMProvider>, LectureError> {
    // 1) User-provided provider takes priority
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    // 2) Provider name + model
    if let Some(ref name) = config.provider_name {
        let model = config.model.as_deref().unwrap_or("gpt-4.1-nano");
        return create_provider(name, model);
    }

    // 3) Honour LECTIO_LLM_PROVIDER + LECTIO_MODEL when both set
    if let (Ok(prov), Ok(model)) = (
        std::env::var("LECTIO_LLM_PROVIDER"),
        std::env::var("LECTIO_MODEL"),
    ) {
        if !prov.is_empty() && !model.is_empty() {
            return create_provider(&prov, &model);
        }
    }

    if let Ok(openai_key) = std::env::var("OPENAI_API_KEY") {
        if !openai_key.is_empty() {
            let model = config.model.as_deref().unwrap_or("gpt-4.1-nano");
            return create_provider("openai", model);
        }
    }

    // 4) Full auto-detection
    let (llm_provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| LectureError::ServiceMisconfigured {
            service: "auto".to_string(),
            hint: format!(
                "No LLM provider could be auto-detected from environment.\n\
                 Set OPENAI_API_KEY, ANTHROPIC_API_KEY, or configure a provider.\n\
                 Error: {}",
                e
            ),
        })?;

    Ok(llm_provider)
}

/// Whether a provider failure is worth retrying.
///
/// edgequake-llm surfaces provider errors as display strings, so we classify
/// by message content rather than by variant.
fn is_transient(msg: &str) -> bool {
    let m = msg.to_ascii_lowercase();
    m.contains("429")
        || m.contains("rate limit")
        || m.contains("timeout")
        || m.contains("timed out")
        || m.contains("connection")
        || m.contains("503")
        || m.contains("502")
        || m.contains("overloaded")
}

/// Whether a provider failure points at credentials or provider setup.
fn is_auth(msg: &str) -> bool {
    let m = msg.to_ascii_lowercase();
    m.contains("401")
        || m.contains("403")
        || m.contains("unauthorized")
        || m.contains("api key")
        || m.contains("authentication")
}

/// Run one chat completion with retry, bounded wait, and empty-response
/// detection.
///
/// `stage` names the calling pipeline stage ("refine", "outline",
/// "narration") for logs and error messages.
pub async fn chat(
    provider: &Arc<dyn LLMProvider>,
    stage: &str,
    system_prompt: &str,
    user_prompt: &str,
    temperature: f32,
    config: &GenerationConfig,
) -> Result<ChatOutcome, LectureError> {
    let messages = vec![
        ChatMessage::system(system_prompt),
        ChatMessage::user(user_prompt),
    ];
    let options = CompletionOptions {
        temperature: Some(temperature),
        max_tokens: Some(config.max_tokens),
        ..Default::default()
    };

    let start = Instant::now();
    let call_timeout = Duration::from_secs(config.api_timeout_secs);
    let mut last_err = String::new();

    for attempt in 0..=config.max_retries {
        if attempt > 0 {
            let backoff = config.retry_backoff_ms * 2u64.pow(attempt - 1);
            warn!(
                "{stage}: retry {attempt}/{} after {backoff}ms ({last_err})",
                config.max_retries
            );
            sleep(Duration::from_millis(backoff)).await;
        }

        match timeout(call_timeout, provider.chat(&messages, Some(&options))).await {
            Ok(Ok(response)) => {
                debug!(
                    "{stage}: {} input tokens, {} output tokens, {:?}",
                    response.prompt_tokens,
                    response.completion_tokens,
                    start.elapsed()
                );
                let content = response.content.trim().to_string();
                if content.is_empty() {
                    return Err(LectureError::EmptyModelResponse {
                        stage: stage.to_string(),
                    });
                }
                return Ok(ChatOutcome {
                    content,
                    input_tokens: response.prompt_tokens as usize,
                    output_tokens: response.completion_tokens as usize,
                });
            }
            Ok(Err(e)) => {
                let msg = format!("{e}");
                if is_auth(&msg) {
                    return Err(LectureError::ServiceMisconfigured {
                        service: "llm".to_string(),
                        hint: msg,
                    });
                }
                if !is_transient(&msg) {
                    return Err(LectureError::ModelCallFailed {
                        stage: stage.to_string(),
                        detail: msg,
                    });
                }
                last_err = msg;
            }
            Err(_) => {
                last_err = format!("call exceeded {}s", config.api_timeout_secs);
                warn!("{stage}: attempt {} timed out", attempt + 1);
            }
        }
    }

    Err(LectureError::ServiceUnavailable {
        service: "llm".to_string(),
        detail: format!(
            "{stage} failed after {} attempt(s): {last_err}",
            config.max_retries + 1
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        assert!(is_transient("HTTP 429 Too Many Requests"));
        assert!(is_transient("connection reset by peer"));
        assert!(is_transient("request timed out"));
        assert!(!is_transient("invalid request body"));
    }

    #[test]
    fn auth_classification() {
        assert!(is_auth("HTTP 401 Unauthorized"));
        assert!(is_auth("missing API key"));
        assert!(!is_auth("HTTP 429"));
    }
}
