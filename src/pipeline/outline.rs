//! Outline generation: cleaned text to a validated slide-by-slide summary.

use crate::config::GenerationConfig;
use crate::error::LectureError;
use crate::llm;
use crate::output::{SlideEntry, SlideOutline};
use crate::prompts;
use edgequake_llm::LLMProvider;
use std::sync::Arc;
use tracing::info;

/// Token usage for one outline generation.
#[derive(Debug, Clone, Copy)]
pub struct OutlineUsage {
    pub input_tokens: usize,
    pub output_tokens: usize,
}

/// Generate and validate the slide outline.
pub async fn generate_outline(
    provider: &Arc<dyn LLMProvider>,
    cleaned_text: &str,
    config: &GenerationConfig,
) -> Result<(SlideOutline, OutlineUsage), LectureError> {
    let outcome = llm::chat(
        provider,
        "outline",
        prompts::OUTLINE_SYSTEM_PROMPT,
        &prompts::outline_user_prompt(cleaned_text),
        config.outline_temperature,
        config,
    )
    .await?;

    let outline = parse_outline(&outcome.content)?;
    outline.validate()?;
    info!("outline: {} slides", outline.len());

    Ok((
        outline,
        OutlineUsage {
            input_tokens: outcome.input_tokens,
            output_tokens: outcome.output_tokens,
        },
    ))
}

/// Parse the model's `## title` / `- point` outline format.
///
/// Lines that are neither a title nor a point (stray commentary, blank lines)
/// are ignored; a point appearing before any title, or a response yielding
/// zero slides, is a malformed outline. Per-slide content validation (empty
/// titles, pointless slides) is [`SlideOutline::validate`]'s job.
pub fn parse_outline(text: &str) -> Result<SlideOutline, LectureError> {
    let mut slides: Vec<SlideEntry> = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if let Some(title) = line.strip_prefix("## ") {
            slides.push(SlideEntry {
                title: title.trim().to_string(),
                points: Vec::new(),
            });
        } else if let Some(point) = line.strip_prefix("- ") {
            let point = point.trim();
            if point.is_empty() {
                continue;
            }
            match slides.last_mut() {
                Some(slide) => slide.points.push(point.to_string()),
                None => {
                    return Err(LectureError::MalformedOutline {
                        detail: format!("content point before any slide title: '{point}'"),
                    })
                }
            }
        }
    }

    if slides.is_empty() {
        return Err(LectureError::MalformedOutline {
            detail: "response contained no '## title' lines".into(),
        });
    }

    Ok(SlideOutline { slides })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_outline() {
        let text = "## Introduction\n- what queues are\n- why they matter\n\n\
                    ## Operations\n- enqueue\n- dequeue\n\n\
                    ## Summary\n- recap\n";
        let o = parse_outline(text).unwrap();
        assert_eq!(o.len(), 3);
        assert_eq!(o.slides[0].title, "Introduction");
        assert_eq!(o.slides[1].points, vec!["enqueue", "dequeue"]);
        assert!(o.validate().is_ok());
    }

    #[test]
    fn ignores_surrounding_commentary() {
        let text = "Here is the outline you asked for:\n\n## Only Slide\n- a point\n\nHope this helps!";
        let o = parse_outline(text).unwrap();
        assert_eq!(o.len(), 1);
        assert_eq!(o.slides[0].points, vec!["a point"]);
    }

    #[test]
    fn point_before_title_is_malformed() {
        let text = "- orphan point\n## Late Title\n- ok\n";
        assert!(matches!(
            parse_outline(text),
            Err(LectureError::MalformedOutline { .. })
        ));
    }

    #[test]
    fn no_titles_is_malformed() {
        assert!(matches!(
            parse_outline("just prose, no structure"),
            Err(LectureError::MalformedOutline { .. })
        ));
    }

    #[test]
    fn titleless_slide_fails_validation() {
        let o = parse_outline("## \n- a point\n").unwrap();
        assert!(o.validate().is_err());
    }
}
