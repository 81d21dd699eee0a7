//! Error types for the lectio library.
//!
//! Every pipeline stage either returns a usable result or one of these
//! errors; nothing is swallowed and substituted with placeholder content
//! (the per-page placeholder inside text extraction is the one sanctioned
//! exception, because it preserves the page count).
//!
//! Variants fall into four classes, mirrored by [`ErrorClass`]:
//!
//! * **Invalid input** — rejected before any stage runs (bad PDF, missing
//!   field). The caller can fix these.
//! * **Service unavailable** — a remote collaborator (LLM, TTS, object
//!   storage) is rate-limited, unreachable, or timing out. Transient; safe
//!   to retry later.
//! * **Service misconfigured** — missing/invalid credentials or provider
//!   setup. Operator-actionable, not user-actionable, and retrying without
//!   a config change will not help.
//! * **Internal** — everything else, including every invariant violation
//!   (page-count mismatch, short script, empty artifact). These are never
//!   auto-corrected by padding, truncating, or guessing.

use std::path::PathBuf;
use thiserror::Error;

/// Coarse classification used by the API layer to choose a response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Caller-side problem — HTTP 400.
    InvalidInput,
    /// Transient upstream problem — HTTP 503.
    Unavailable,
    /// Everything else — HTTP 500.
    Internal,
}

/// All errors returned by the lectio library.
#[derive(Debug, Error)]
pub enum LectureError {
    // ── Input validation ──────────────────────────────────────────────────
    /// A required request field was empty or absent.
    #[error("Missing or empty required field: '{field}'")]
    MissingField { field: String },

    /// The uploaded bytes do not start with the PDF magic.
    #[error("Uploaded file is not a PDF (first bytes: {magic:?})")]
    NotAPdf { magic: [u8; 4] },

    /// The bytes look like a PDF but cannot be opened as one.
    #[error("PDF cannot be opened: {detail}")]
    InvalidPdf { detail: String },

    /// The PDF opened fine but contains zero pages.
    #[error("PDF contains no pages")]
    EmptyDocument,

    // ── Upstream services ─────────────────────────────────────────────────
    /// Credentials or provider setup are wrong; operator-actionable.
    #[error("Service '{service}' is not configured: {hint}")]
    ServiceMisconfigured { service: String, hint: String },

    /// Rate limit, connection failure, or timeout; transient.
    #[error("Service '{service}' is unavailable: {detail}")]
    ServiceUnavailable { service: String, detail: String },

    /// The model call failed for a non-transient, non-auth reason.
    #[error("Model call failed during {stage}: {detail}")]
    ModelCallFailed { stage: String, detail: String },

    /// The model returned an empty body after trimming.
    #[error("Model returned an empty response during {stage}")]
    EmptyModelResponse { stage: String },

    // ── External tools ────────────────────────────────────────────────────
    /// An external command exited non-zero.
    #[error("External tool '{tool}' failed: {detail}")]
    ToolFailed { tool: String, detail: String },

    /// An external command exceeded its bounded wait.
    #[error("External tool '{tool}' timed out after {secs}s")]
    ToolTimeout { tool: String, secs: u64 },

    /// An external command reported success but its output file is missing.
    #[error("External tool '{tool}' produced no output at '{path}'")]
    ToolMissingOutput { tool: String, path: PathBuf },

    // ── Invariant violations ──────────────────────────────────────────────
    /// Slide image count and audio file count disagree before assembly.
    #[error(
        "Page count mismatch: {slides} slide image(s) vs {audio} audio file(s). \
         Slides and narration must correspond 1:1; refusing to guess a pairing."
    )]
    PageCountMismatch { slides: usize, audio: usize },

    /// The narration script has fewer segments than a valid lecture needs.
    #[error(
        "Narration script has only {segments} page segment(s); \
         at least {minimum} (intro, body, close) are required"
    )]
    ScriptTooShort { segments: usize, minimum: usize },

    /// The narration script's markers are malformed or non-contiguous.
    #[error("Narration script is malformed: {detail}")]
    MalformedScript { detail: String },

    /// The generated slide outline failed schema validation.
    #[error("Slide outline is malformed: {detail}")]
    MalformedOutline { detail: String },

    /// Rendering produced zero slide images.
    #[error("Slide rendering produced no images")]
    NoSlidesRendered,

    /// A reported-successful write left a missing or zero-byte file.
    #[error("Output artifact '{path}' is missing or empty after a reported-successful write")]
    EmptyArtifact { path: PathBuf },

    // ── I/O + storage ─────────────────────────────────────────────────────
    /// Filesystem error inside the scratch workspace or on the output path.
    #[error("I/O error at '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Object-storage upload failed.
    #[error("Upload to object storage failed: {detail}")]
    UploadFailed { detail: String },

    /// Database error from the lecture store.
    #[error("Database error: {0}")]
    Database(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl LectureError {
    /// Classify for the HTTP layer (400 / 503 / 500).
    pub fn class(&self) -> ErrorClass {
        match self {
            LectureError::MissingField { .. }
            | LectureError::NotAPdf { .. }
            | LectureError::InvalidPdf { .. }
            | LectureError::EmptyDocument => ErrorClass::InvalidInput,

            LectureError::ServiceUnavailable { .. }
            | LectureError::ServiceMisconfigured { .. }
            | LectureError::UploadFailed { .. } => ErrorClass::Unavailable,

            _ => ErrorClass::Internal,
        }
    }

    /// Convenience constructor for I/O errors with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LectureError::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<rusqlite::Error> for LectureError {
    fn from(e: rusqlite::Error) -> Self {
        LectureError::Database(e.to_string())
    }
}
