//! Prompts for the generative stages.
//!
//! Centralising every prompt here serves two purposes:
//!
//! 1. **Single source of truth** — the narration prompt embeds the page-marker
//!    pattern the splitter later parses; building it from [`crate::marker`]
//!    in exactly one place keeps the two sides of that contract in lock-step.
//!
//! 2. **Testability** — unit tests can inspect prompts directly without a
//!    live model call.

use crate::marker;

/// System prompt for the text-cleaning call.
pub const REFINE_SYSTEM_PROMPT: &str = "You are a text-cleanup specialist. You receive text \
extracted page-by-page from a PDF presentation and improve its readability while preserving \
its page structure exactly.";

/// User prompt for the text-cleaning call.
pub fn refine_user_prompt(raw_text: &str) -> String {
    format!(
        r#"The following text was extracted page by page from a PDF presentation.
Pages are delimited by lines of the exact form '{marker}'.

Your task:
1. Keep every '{marker}' delimiter line and each page's essential content.
2. Remove repeated headers/footers (logos, running titles, dates, confidentiality notices).
3. Remove slide/page numbers embedded in the page content itself (distinct from the delimiters).
4. Remove decorative symbols, stray whitespace, broken characters, and extraction artifacts.
5. Preserve reading order. Output only the cleaned text, starting at the first delimiter.

--- SOURCE TEXT START ---
{text}
--- SOURCE TEXT END ---

Cleaned text:"#,
        marker = marker::marker_pattern_for_prompt(),
        text = raw_text,
    )
}

/// System prompt for the outline call.
///
/// The output format is parsed strictly by `pipeline::outline::parse_outline`;
/// the example block below is the contract.
pub const OUTLINE_SYSTEM_PROMPT: &str = r#"You are an assistant that structures educational content into presentation slides.

Given source lecture text, produce a slide-by-slide outline:
1. Identify the main topics and subtopics, preserving the source's logical order.
2. The FIRST slide must introduce the lecture (title/overview slide).
3. The LAST slide must be a summary slide recapping the main topics.
4. Each slide has one clear title and 2-5 short bullet points in plain language.
5. Output ONLY the outline in exactly this format, with no introduction or closing remarks:

## First Slide Title
- point one
- point two

## Second Slide Title
- point one
- point two"#;

/// User prompt for the outline call.
pub fn outline_user_prompt(cleaned_text: &str) -> String {
    format!(
        "Create a presentation slide outline from the following lecture text:\n\n\
         --- SOURCE TEXT START ---\n{cleaned_text}\n--- SOURCE TEXT END ---"
    )
}

/// System prompt for the narration call.
pub const NARRATION_SYSTEM_PROMPT: &str = "You are an expert at writing natural, spoken-style \
lecture scripts. You write as a friendly professor speaking to students, not as a document.";

/// User prompt for the narration call.
///
/// `description` is the optional free-text lecture description supplied with
/// the request; when present it is passed through as additional context.
pub fn narration_user_prompt(
    cleaned_text: &str,
    outline_text: &str,
    description: Option<&str>,
) -> String {
    let slide_count = outline_text.lines().filter(|l| l.starts_with("## ")).count();
    let context = description
        .filter(|d| !d.trim().is_empty())
        .map(|d| format!("\nAdditional context from the lecturer:\n{d}\n"))
        .unwrap_or_default();

    format!(
        r#"Write a complete spoken lecture script based on the source text and the slide outline below.
{context}
Requirements:
0. Produce EXACTLY one script segment per outline slide ({slide_count} segments total). Precede each segment with a delimiter line of the exact form '{marker}', numbered 1, 2, 3, … in order. Do not add, merge, or skip segments.
1. The first segment introduces the topic ("In this session we will look at …") and previews the outline.
2. Each middle segment explains its slide's points conversationally — expand and illustrate them with simple examples, never read the bullets verbatim. Unpack difficult terms in plain words.
3. The final segment summarises the main points and closes the session.
4. Keep a consistent, warm, spoken register throughout, as a real professor would sound.

Slide outline:
--- OUTLINE START ---
{outline_text}
--- OUTLINE END ---

Source text:
--- SOURCE TEXT START ---
{cleaned_text}
--- SOURCE TEXT END ---

Output only the script text with its delimiter lines. No other commentary."#,
        marker = marker::marker_pattern_for_prompt(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refine_prompt_embeds_canonical_marker() {
        let p = refine_user_prompt("body");
        assert!(p.contains("------Page N------"));
        assert!(p.contains("body"));
    }

    #[test]
    fn narration_prompt_embeds_marker_and_counts_slides() {
        let outline = "## A\n- x\n\n## B\n- y\n\n## C\n- z\n";
        let p = narration_user_prompt("text", outline, None);
        assert!(p.contains("------Page N------"));
        assert!(p.contains("3 segments total"));
    }

    #[test]
    fn narration_prompt_includes_description_when_present() {
        let p = narration_user_prompt("text", "## A\n- x\n", Some("Week 3 of the course"));
        assert!(p.contains("Week 3 of the course"));
        let p = narration_user_prompt("text", "## A\n- x\n", Some("   "));
        assert!(!p.contains("Additional context"));
    }
}
