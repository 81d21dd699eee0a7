//! Narration synthesis: marker-delimited script to per-page MP3 files.
//!
//! Audio names are zero-padded (`page0001.mp3`) so a lexicographic directory
//! listing is page order. Page segments longer than the TTS character budget
//! are chunked at sentence boundaries and the chunk audio is concatenated
//! back into one file per page.

use crate::config::GenerationConfig;
use crate::error::LectureError;
use crate::marker;
use crate::pipeline::media;
use crate::tts::{chunk_text, TtsClient};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Zero-padded audio name for a 1-based page number.
pub fn audio_file_name(n: usize) -> String {
    format!("page{n:04}.mp3")
}

/// Synthesize one audio file per script page, in page order.
pub async fn synthesize_script(
    tts: &TtsClient,
    script: &str,
    audio_dir: &Path,
    config: &GenerationConfig,
) -> Result<Vec<PathBuf>, LectureError> {
    let pages = marker::split_pages(script);
    let markers = marker::marker_count(script);
    if pages.len() != markers {
        warn!(
            "speech: {} of {} markers had empty bodies and were skipped",
            markers - pages.len(),
            markers
        );
    }

    let mut paths = Vec::with_capacity(pages.len());
    for (i, page) in pages.iter().enumerate() {
        let path = audio_dir.join(audio_file_name(i + 1));
        synthesize_page(tts, &page.text, &path, audio_dir, config).await?;
        media::verify_artifact(&path)?;
        debug!("speech: page {} -> {}", i + 1, path.display());
        paths.push(path);
    }

    info!("speech: synthesized {} page(s)", paths.len());
    Ok(paths)
}

/// Synthesize one page, chunking long text and concatenating the results.
async fn synthesize_page(
    tts: &TtsClient,
    text: &str,
    out_path: &Path,
    audio_dir: &Path,
    config: &GenerationConfig,
) -> Result<(), LectureError> {
    let chunks = chunk_text(text, config.tts_chunk_chars);

    if chunks.len() == 1 {
        let bytes = tts.synthesize(&chunks[0]).await?;
        std::fs::write(out_path, bytes).map_err(|e| LectureError::io(out_path, e))?;
        return Ok(());
    }

    let mut chunk_paths = Vec::with_capacity(chunks.len());
    for (i, chunk) in chunks.iter().enumerate() {
        let bytes = tts.synthesize(chunk).await?;
        let chunk_path = audio_dir.join(format!(
            "{}.part{:02}.mp3",
            out_path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("page"),
            i
        ));
        std::fs::write(&chunk_path, bytes).map_err(|e| LectureError::io(&chunk_path, e))?;
        chunk_paths.push(chunk_path);
    }

    media::concat_copy(&config.ffmpeg_bin, &chunk_paths, out_path, config.mux_timeout_secs).await?;

    for p in chunk_paths {
        let _ = std::fs::remove_file(p);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audio_names_sort_in_page_order() {
        let names: Vec<String> = (1..=15).map(audio_file_name).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        assert_eq!(names[0], "page0001.mp3");
        assert_eq!(names[10], "page0011.mp3");
    }

    #[test]
    fn chunk_parts_do_not_collide_with_page_files() {
        // part files use a distinct suffix so verify/concat never confuses
        // them with the final per-page output.
        let part = format!("{}.part00.mp3", "page0001");
        assert_ne!(part, audio_file_name(1));
        assert!(part > audio_file_name(1));
    }
}
