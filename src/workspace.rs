//! The request-scoped scratch workspace.
//!
//! Every pipeline stage writes its intermediate artifacts (extracted text,
//! deck file, slide images, per-page audio, clip files) into one directory
//! tree that is exclusively owned by a single request. Teardown is tied to
//! `Drop` on the inner [`TempDir`], so the whole tree is removed on every
//! exit path — success, stage error, or panic — without any manual cleanup
//! code in the orchestrator.

use crate::error::LectureError;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::debug;

/// An exclusively-owned, request-scoped directory tree.
pub struct Workspace {
    root: TempDir,
}

impl Workspace {
    /// Allocate a fresh workspace with its fixed stage subdirectories.
    pub fn new() -> Result<Self, LectureError> {
        let root = TempDir::with_prefix("lecture_")
            .map_err(|e| LectureError::Internal(format!("workspace allocation failed: {e}")))?;

        for sub in ["text", "deck", "slides", "audio", "video"] {
            let dir = root.path().join(sub);
            std::fs::create_dir(&dir).map_err(|e| LectureError::io(dir, e))?;
        }

        debug!("Workspace allocated at {}", root.path().display());
        Ok(Self { root })
    }

    /// Root of the workspace tree.
    pub fn path(&self) -> &Path {
        self.root.path()
    }

    /// Extracted/cleaned text and scripts.
    pub fn text_dir(&self) -> PathBuf {
        self.root.path().join("text")
    }

    /// Slide-deck artifact and intermediate fixed-layout document.
    pub fn deck_dir(&self) -> PathBuf {
        self.root.path().join("deck")
    }

    /// Rendered slide images (`slide_0001.png`, …).
    pub fn slides_dir(&self) -> PathBuf {
        self.root.path().join("slides")
    }

    /// Per-page narration audio (`page0001.mp3`, …).
    pub fn audio_dir(&self) -> PathBuf {
        self.root.path().join("audio")
    }

    /// Intermediate clips and the assembled video.
    pub fn video_dir(&self) -> PathBuf {
        self.root.path().join("video")
    }
}
