//! Video assembly: paired slide images and audio files to one MP4.
//!
//! Each (image, audio) pair becomes a still-image clip whose length is the
//! audio's; the clips are then concatenated without re-encoding. The pairing
//! is strictly positional, which is only sound because both file sets use
//! zero-padded names — the sorted listings *are* the page order.

use crate::config::GenerationConfig;
use crate::error::LectureError;
use crate::pipeline::media;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// The assembled video plus its probed duration.
#[derive(Debug)]
pub struct AssembledVideo {
    pub path: PathBuf,
    pub duration_secs: f64,
}

/// List a directory's files with the given extension, sorted by name.
pub fn list_sorted(dir: &Path, extension: &str) -> Result<Vec<PathBuf>, LectureError> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
        .map_err(|e| LectureError::io(dir, e))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some(extension))
        .collect();
    paths.sort();
    Ok(paths)
}

/// Pair slides with audio positionally, refusing any count mismatch.
pub fn pair_tracks(
    slides: &[PathBuf],
    audio: &[PathBuf],
) -> Result<Vec<(PathBuf, PathBuf)>, LectureError> {
    if slides.len() != audio.len() {
        return Err(LectureError::PageCountMismatch {
            slides: slides.len(),
            audio: audio.len(),
        });
    }
    if slides.is_empty() {
        return Err(LectureError::NoSlidesRendered);
    }
    Ok(slides
        .iter()
        .cloned()
        .zip(audio.iter().cloned())
        .collect())
}

/// Assemble the final video from the slides and audio directories.
pub async fn assemble_video(
    slides_dir: &Path,
    audio_dir: &Path,
    video_dir: &Path,
    config: &GenerationConfig,
) -> Result<AssembledVideo, LectureError> {
    let slides = list_sorted(slides_dir, "png")?;
    let audio = list_sorted(audio_dir, "mp3")?;
    let pairs = pair_tracks(&slides, &audio)?;

    let mut clips = Vec::with_capacity(pairs.len());
    for (i, (image, sound)) in pairs.iter().enumerate() {
        let clip = video_dir.join(format!("clip_{:04}.mp4", i + 1));
        build_clip(image, sound, &clip, config).await?;
        media::verify_artifact(&clip)?;
        debug!("assemble: clip {} of {}", i + 1, pairs.len());
        clips.push(clip);
    }

    let output = video_dir.join("lecture.mp4");
    media::concat_copy(&config.ffmpeg_bin, &clips, &output, config.mux_timeout_secs).await?;
    media::verify_artifact(&output)?;

    let duration_secs =
        media::probe_duration(&config.ffprobe_bin, &output, config.mux_timeout_secs).await?;
    info!(
        "assemble: {} clips, {:.1}s total",
        clips.len(),
        duration_secs
    );

    Ok(AssembledVideo {
        path: output,
        duration_secs,
    })
}

/// Build one still-image clip the length of its audio track.
async fn build_clip(
    image: &Path,
    audio: &Path,
    output: &Path,
    config: &GenerationConfig,
) -> Result<(), LectureError> {
    let image_str = image.to_string_lossy();
    let audio_str = audio.to_string_lossy();
    let out_str = output.to_string_lossy();
    let fps = config.fps.to_string();

    // -shortest ends the clip with the audio; scale/pad keeps even
    // dimensions, which libx264 requires with yuv420p.
    media::run_tool(
        "ffmpeg",
        &config.ffmpeg_bin,
        &[
            "-y",
            "-loop",
            "1",
            "-i",
            &image_str,
            "-i",
            &audio_str,
            "-c:v",
            "libx264",
            "-tune",
            "stillimage",
            "-c:a",
            "aac",
            "-b:a",
            "192k",
            "-pix_fmt",
            "yuv420p",
            "-vf",
            "scale=trunc(iw/2)*2:trunc(ih/2)*2",
            "-r",
            &fps,
            "-shortest",
            &out_str,
        ],
        config.mux_timeout_secs,
    )
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let p = dir.join(name);
        std::fs::write(&p, b"x").unwrap();
        p
    }

    #[test]
    fn mismatched_counts_are_refused() {
        let slides = vec![PathBuf::from("a.png"), PathBuf::from("b.png")];
        let audio = vec![PathBuf::from("a.mp3")];
        assert!(matches!(
            pair_tracks(&slides, &audio),
            Err(LectureError::PageCountMismatch {
                slides: 2,
                audio: 1
            })
        ));
    }

    #[test]
    fn empty_tracks_are_refused() {
        assert!(matches!(
            pair_tracks(&[], &[]),
            Err(LectureError::NoSlidesRendered)
        ));
    }

    #[test]
    fn listing_is_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "slide_0002.png");
        touch(dir.path(), "slide_0001.png");
        touch(dir.path(), "slide_0010.png");
        touch(dir.path(), "notes.txt");

        let listed = list_sorted(dir.path(), "png").unwrap();
        let names: Vec<_> = listed
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["slide_0001.png", "slide_0002.png", "slide_0010.png"]);
    }

    #[test]
    fn pairing_is_positional_over_sorted_names() {
        let dir = tempfile::tempdir().unwrap();
        for i in [3usize, 1, 2] {
            touch(dir.path(), &format!("slide_{i:04}.png"));
            touch(dir.path(), &format!("page{i:04}.mp3"));
        }
        let slides = list_sorted(dir.path(), "png").unwrap();
        let audio = list_sorted(dir.path(), "mp3").unwrap();
        let pairs = pair_tracks(&slides, &audio).unwrap();
        for (i, (s, a)) in pairs.iter().enumerate() {
            let n = format!("{:04}", i + 1);
            assert!(s.to_string_lossy().contains(&n));
            assert!(a.to_string_lossy().contains(&n));
        }
    }
}
