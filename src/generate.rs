//! The pipeline orchestrator: one PDF request in, one MP4 file out.

use crate::config::GenerationConfig;
use crate::error::LectureError;
use crate::llm;
use crate::output::{GenerationStats, LectureOutput};
use crate::pipeline::{assemble, deck, extract, narration, outline, refine, slides, speech};
use crate::request::LectureRequest;
use crate::tts::TtsClient;
use crate::workspace::Workspace;
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// Run the full pipeline and write the final MP4 to `out_path`.
///
/// Stages run strictly in sequence; the first failure aborts the run and the
/// workspace (every intermediate artifact) is removed on all exit paths. On
/// success the returned [`LectureOutput`] carries the outline, the script,
/// and per-stage timings.
pub async fn generate_to_file(
    request: &LectureRequest,
    out_path: &Path,
    config: &GenerationConfig,
) -> Result<LectureOutput, LectureError> {
    request.validate()?;

    // Collaborators are resolved before any work so a misconfigured
    // deployment fails in milliseconds, not after the model calls.
    let provider = llm::resolve_provider(config)?;
    let tts = TtsClient::new(config)?;
    let workspace = Workspace::new()?;

    let run_start = Instant::now();
    let mut stats = GenerationStats::default();
    info!("generate: '{}' by {}", request.title, request.professor);

    // 1. Extract page-delimited text.
    let stage = Instant::now();
    let extracted = extract::extract_text(request.pdf.clone()).await?;
    stats.pdf_pages = extracted.page_count;
    stats.extract_duration_ms = stage.elapsed().as_millis() as u64;

    // 2. Clean it.
    let stage = Instant::now();
    let refined = refine::refine_text(&provider, &extracted.text, config).await?;
    stats.total_input_tokens += refined.input_tokens as u64;
    stats.total_output_tokens += refined.output_tokens as u64;
    stats.refine_duration_ms = stage.elapsed().as_millis() as u64;

    // 3. Outline.
    let stage = Instant::now();
    let (outline, usage) = outline::generate_outline(&provider, &refined.content, config).await?;
    stats.slides = outline.len();
    stats.total_input_tokens += usage.input_tokens as u64;
    stats.total_output_tokens += usage.output_tokens as u64;
    stats.outline_duration_ms = stage.elapsed().as_millis() as u64;

    // 4. Narration script, validated against the outline's slide count.
    let stage = Instant::now();
    let script = narration::generate_script(
        &provider,
        &refined.content,
        &outline,
        request.description.as_deref(),
        config,
    )
    .await?;
    stats.script_pages = outline.len();
    stats.total_input_tokens += script.input_tokens as u64;
    stats.total_output_tokens += script.output_tokens as u64;
    stats.narration_duration_ms = stage.elapsed().as_millis() as u64;

    // 5. Deck + slide images.
    let stage = Instant::now();
    let deck_path = deck::write_deck(&outline, &workspace.deck_dir())?;
    let slide_paths = slides::render_slides(&deck_path, &workspace.slides_dir(), config).await?;
    stats.render_duration_ms = stage.elapsed().as_millis() as u64;

    // 6. Per-page audio.
    let stage = Instant::now();
    let audio_paths =
        speech::synthesize_script(&tts, &script.content, &workspace.audio_dir(), config).await?;
    stats.speech_duration_ms = stage.elapsed().as_millis() as u64;

    // Authoritative pairing check happens inside assembly; this early check
    // turns a drift into an error before the expensive encode.
    if slide_paths.len() != audio_paths.len() {
        return Err(LectureError::PageCountMismatch {
            slides: slide_paths.len(),
            audio: audio_paths.len(),
        });
    }

    // 7. Assemble the MP4.
    let stage = Instant::now();
    let video = assemble::assemble_video(
        &workspace.slides_dir(),
        &workspace.audio_dir(),
        &workspace.video_dir(),
        config,
    )
    .await?;
    stats.video_duration_secs = video.duration_secs;
    stats.assemble_duration_ms = stage.elapsed().as_millis() as u64;

    // 8. Move the result out of the workspace before it is torn down.
    persist(&video.path, out_path)?;
    stats.total_duration_ms = run_start.elapsed().as_millis() as u64;

    info!(
        "generate: done in {:.1}s ({} slides, {:.1}s of video)",
        stats.total_duration_ms as f64 / 1000.0,
        stats.slides,
        stats.video_duration_secs
    );

    Ok(LectureOutput {
        video_path: out_path.to_path_buf(),
        outline,
        script: script.content,
        stats,
    })
}

/// Copy the finished video to its destination, then rename into place.
///
/// The workspace may sit on a different filesystem than the destination, so
/// a direct rename is not an option; copying to a sibling temp name and
/// renaming keeps a half-written file from ever appearing at `out_path`.
fn persist(src: &Path, out_path: &Path) -> Result<(), LectureError> {
    let staging = out_path.with_extension("mp4.partial");
    std::fs::copy(src, &staging).map_err(|e| LectureError::io(&staging, e))?;
    std::fs::rename(&staging, out_path).map_err(|e| LectureError::io(out_path, e))?;
    match std::fs::metadata(out_path) {
        Ok(meta) if meta.len() > 0 => Ok(()),
        _ => Err(LectureError::EmptyArtifact {
            path: out_path.to_path_buf(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn persist_replaces_destination_atomically() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src.mp4");
        let dst = dir.path().join("out.mp4");
        std::fs::write(&src, b"video bytes").unwrap();
        std::fs::write(&dst, b"stale").unwrap();

        persist(&src, &dst).unwrap();
        assert_eq!(std::fs::read(&dst).unwrap(), b"video bytes");
        assert!(!dir.path().join("out.mp4.partial").exists());
    }

    #[tokio::test]
    async fn invalid_request_fails_before_any_stage() {
        let request = LectureRequest {
            title: String::new(),
            professor: "Prof".into(),
            description: None,
            pdf: b"%PDF-1.4".to_vec(),
        };
        let config = GenerationConfig::default();
        let err = generate_to_file(&request, Path::new("/tmp/never.mp4"), &config)
            .await
            .unwrap_err();
        assert!(matches!(err, LectureError::MissingField { .. }));
    }
}
