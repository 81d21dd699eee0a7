//! # lectio
//!
//! Turn a lecture PDF into a narrated slide video.
//!
//! ## Why this crate?
//!
//! Recorded lectures take a studio, a speaker, and an afternoon. This crate
//! takes the PDF that already exists: it extracts the text, has an LLM clean
//! it and distil a slide outline plus a spoken script, renders the outline
//! into slide images, synthesizes one narration track per slide, and muxes
//! the pairs into a single MP4.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Extract    page-delimited text via pdfium (spawn_blocking)
//!  ├─ 2. Refine     LLM strips headers/footers and extraction noise
//!  ├─ 3. Outline    LLM distils a slide-by-slide summary (validated)
//!  ├─ 4. Narration  LLM writes one spoken segment per slide
//!  ├─ 5. Slides     deck → soffice → PDF → pdfium → slide_NNNN.png
//!  ├─ 6. Speech     TTS per segment → pageNNNN.mp3
//!  └─ 7. Assemble   ffmpeg pairs image+audio clips, concatenates to MP4
//! ```
//!
//! Slide images and audio files must correspond 1:1; any count drift aborts
//! the run rather than guessing a pairing.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use lectio::{generate_to_file, GenerationConfig, LectureRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // LLM provider auto-detected from OPENAI_API_KEY / ANTHROPIC_API_KEY / …
//!     let config = GenerationConfig::default();
//!     let request = LectureRequest {
//!         title: "Intro to Queues".into(),
//!         professor: "Prof. Kim".into(),
//!         description: None,
//!         pdf: std::fs::read("lecture.pdf")?,
//!     };
//!     let output = generate_to_file(&request, "lecture.mp4".as_ref(), &config).await?;
//!     eprintln!("{} slides, {:.0}s of video", output.stats.slides,
//!         output.stats.video_duration_secs);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `lectio` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! lectio = { version = "0.1", default-features = false }
//! ```
//!
//! ## External tools
//!
//! Rendering and assembly shell out to `soffice` (LibreOffice headless),
//! `ffmpeg`, and `ffprobe`; all three must be on `PATH` (or pointed at via
//! [`GenerationConfig`]). Every invocation runs under a bounded wait.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod generate;
pub mod llm;
pub mod marker;
pub mod output;
pub mod pipeline;
pub mod prompts;
pub mod request;
pub mod store;
pub mod tts;
pub mod workspace;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{GenerationConfig, GenerationConfigBuilder};
pub use db::{Db, Lecture};
pub use error::{ErrorClass, LectureError};
pub use generate::generate_to_file;
pub use output::{GenerationStats, LectureOutput, SlideEntry, SlideOutline};
pub use request::LectureRequest;
pub use store::ObjectStore;
pub use workspace::Workspace;
