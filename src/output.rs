//! Output types: the slide outline schema, per-run statistics, and the
//! final result handed back to callers.

use crate::error::LectureError;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::PathBuf;

/// One slide of the generated outline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideEntry {
    /// Slide title.
    pub title: String,
    /// Short content points, in source order.
    pub points: Vec<String>,
}

/// The structured slide-by-slide summary derived from the cleaned text.
///
/// Feeds both deck rendering and narration generation. Validated immediately
/// after generation so a malformed model response fails fast instead of
/// mid-render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideOutline {
    pub slides: Vec<SlideEntry>,
}

impl SlideOutline {
    /// Number of slides.
    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    /// Reject structurally invalid outlines before any rendering attempt.
    pub fn validate(&self) -> Result<(), LectureError> {
        if self.slides.is_empty() {
            return Err(LectureError::MalformedOutline {
                detail: "outline contains no slides".into(),
            });
        }
        for (i, slide) in self.slides.iter().enumerate() {
            if slide.title.trim().is_empty() {
                return Err(LectureError::MalformedOutline {
                    detail: format!("slide {} has an empty title", i + 1),
                });
            }
            if slide.points.is_empty() || slide.points.iter().all(|p| p.trim().is_empty()) {
                return Err(LectureError::MalformedOutline {
                    detail: format!("slide {} ('{}') has no content points", i + 1, slide.title),
                });
            }
        }
        Ok(())
    }

    /// Render the outline back to the textual form used inside prompts.
    pub fn to_prompt_text(&self) -> String {
        let mut out = String::new();
        for slide in &self.slides {
            let _ = writeln!(out, "## {}", slide.title);
            for point in &slide.points {
                let _ = writeln!(out, "- {}", point);
            }
            out.push('\n');
        }
        out
    }
}

/// Statistics for a completed (or partially timed) generation run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationStats {
    /// Page count of the source PDF.
    pub pdf_pages: usize,
    /// Slides in the generated outline (== rendered slide images).
    pub slides: usize,
    /// Page segments in the narration script (== synthesized audio files).
    pub script_pages: usize,
    /// Total spoken-video duration in seconds, from audio probing.
    pub video_duration_secs: f64,
    /// Prompt tokens across all model calls.
    pub total_input_tokens: u64,
    /// Completion tokens across all model calls.
    pub total_output_tokens: u64,
    pub extract_duration_ms: u64,
    pub refine_duration_ms: u64,
    pub outline_duration_ms: u64,
    pub narration_duration_ms: u64,
    pub render_duration_ms: u64,
    pub speech_duration_ms: u64,
    pub assemble_duration_ms: u64,
    pub total_duration_ms: u64,
}

/// The result of a successful generation run.
#[derive(Debug, Clone)]
pub struct LectureOutput {
    /// Where the final MP4 was written.
    pub video_path: PathBuf,
    /// The validated outline the deck was built from.
    pub outline: SlideOutline,
    /// The full marker-delimited narration script.
    pub script: String,
    pub stats: GenerationStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outline() -> SlideOutline {
        SlideOutline {
            slides: vec![
                SlideEntry {
                    title: "Queues".into(),
                    points: vec!["FIFO ordering".into(), "enqueue/dequeue".into()],
                },
                SlideEntry {
                    title: "Applications".into(),
                    points: vec!["schedulers".into()],
                },
            ],
        }
    }

    #[test]
    fn valid_outline_passes() {
        assert!(outline().validate().is_ok());
    }

    #[test]
    fn empty_outline_is_rejected() {
        let o = SlideOutline { slides: vec![] };
        assert!(matches!(
            o.validate(),
            Err(LectureError::MalformedOutline { .. })
        ));
    }

    #[test]
    fn slide_without_points_is_rejected() {
        let mut o = outline();
        o.slides[1].points.clear();
        let err = o.validate().unwrap_err();
        assert!(err.to_string().contains("Applications"));
    }

    #[test]
    fn prompt_text_round_trips_structure() {
        let text = outline().to_prompt_text();
        assert!(text.contains("## Queues"));
        assert!(text.contains("- FIFO ordering"));
        assert!(text.contains("## Applications"));
    }
}
