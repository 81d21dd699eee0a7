//! Narration generation: outline plus cleaned text to a marker-delimited
//! spoken script.

use crate::config::GenerationConfig;
use crate::error::LectureError;
use crate::llm::{self, ChatOutcome};
use crate::marker;
use crate::output::SlideOutline;
use crate::prompts;
use edgequake_llm::LLMProvider;
use std::sync::Arc;
use tracing::info;

/// A lecture needs at least an intro, one body segment, and a close.
pub const MIN_SCRIPT_PAGES: usize = 3;

/// Generate the narration script and validate its segmentation.
pub async fn generate_script(
    provider: &Arc<dyn LLMProvider>,
    cleaned_text: &str,
    outline: &SlideOutline,
    description: Option<&str>,
    config: &GenerationConfig,
) -> Result<ChatOutcome, LectureError> {
    let outcome = llm::chat(
        provider,
        "narration",
        prompts::NARRATION_SYSTEM_PROMPT,
        &prompts::narration_user_prompt(
            cleaned_text,
            &outline.to_prompt_text(),
            description,
        ),
        config.narration_temperature,
        config,
    )
    .await?;

    validate_script(&outcome.content, outline.len())?;
    info!("narration: {} page segments", outline.len());

    Ok(outcome)
}

/// Check that a script splits into exactly `expected_pages` contiguous,
/// 1-based page segments.
///
/// A script that parses but doesn't match the outline is rejected here, not
/// patched: padding or truncating segments would silently attach narration
/// to the wrong slides.
pub fn validate_script(script: &str, expected_pages: usize) -> Result<(), LectureError> {
    let pages = marker::split_pages(script);

    if pages.len() < MIN_SCRIPT_PAGES {
        return Err(LectureError::ScriptTooShort {
            segments: pages.len(),
            minimum: MIN_SCRIPT_PAGES,
        });
    }

    for (i, page) in pages.iter().enumerate() {
        if page.page != i + 1 {
            return Err(LectureError::MalformedScript {
                detail: format!(
                    "segment {} carries page number {}; numbering must be contiguous from 1",
                    i + 1,
                    page.page
                ),
            });
        }
    }

    if pages.len() != expected_pages {
        return Err(LectureError::MalformedScript {
            detail: format!(
                "script has {} segment(s) but the outline has {} slide(s)",
                pages.len(),
                expected_pages
            ),
        });
    }

    Ok(())
}
