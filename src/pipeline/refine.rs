//! Text cleaning: strip extraction noise while preserving page structure.

use crate::config::GenerationConfig;
use crate::error::LectureError;
use crate::llm::{self, ChatOutcome};
use crate::marker;
use crate::prompts;
use edgequake_llm::LLMProvider;
use std::sync::Arc;
use tracing::{debug, warn};

/// Clean extracted text with a near-deterministic model call.
///
/// The refined text keeps the page delimiters of the input; a marker-count
/// drift after cleaning is logged but not fatal, because the narration stage
/// re-derives its own segmentation from the outline rather than from these
/// markers.
pub async fn refine_text(
    provider: &Arc<dyn LLMProvider>,
    raw_text: &str,
    config: &GenerationConfig,
) -> Result<ChatOutcome, LectureError> {
    let outcome = llm::chat(
        provider,
        "refine",
        prompts::REFINE_SYSTEM_PROMPT,
        &prompts::refine_user_prompt(raw_text),
        config.refine_temperature,
        config,
    )
    .await?;

    let before = marker::marker_count(raw_text);
    let after = marker::marker_count(&outcome.content);
    if before != after {
        warn!(
            "refine: marker count changed {before} -> {after}; \
             continuing with the cleaned text"
        );
    } else {
        debug!("refine: {before} page delimiters preserved");
    }

    Ok(outcome)
}
