//! Shared helpers for external media tools (ffmpeg, ffprobe, soffice).
//!
//! Every external process runs under a bounded wait with `kill_on_drop`, so
//! a wedged converter or muxer cannot hold a request open past its timeout
//! or outlive a cancelled future.

use crate::error::LectureError;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// Run an external tool to completion, with a bounded wait.
///
/// `tool` is the short name used in logs and errors ("ffmpeg", "soffice");
/// `bin` is the binary to invoke. Returns stdout on success.
pub async fn run_tool(
    tool: &str,
    bin: &str,
    args: &[&str],
    timeout_secs: u64,
) -> Result<Vec<u8>, LectureError> {
    debug!("{tool}: {bin} {}", args.join(" "));

    let mut command = Command::new(bin);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let child = command.spawn().map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            LectureError::ServiceMisconfigured {
                service: tool.to_string(),
                hint: format!("binary '{bin}' not found on PATH"),
            }
        } else {
            LectureError::ToolFailed {
                tool: tool.to_string(),
                detail: format!("spawn: {e}"),
            }
        }
    })?;

    let output = tokio::time::timeout(Duration::from_secs(timeout_secs), child.wait_with_output())
        .await
        .map_err(|_| LectureError::ToolTimeout {
            tool: tool.to_string(),
            secs: timeout_secs,
        })?
        .map_err(|e| LectureError::ToolFailed {
            tool: tool.to_string(),
            detail: format!("wait: {e}"),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        // ffmpeg writes pages of banner text; keep the tail where the
        // actual error lives.
        let tail: String = stderr
            .lines()
            .rev()
            .take(8)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect::<Vec<_>>()
            .join("\n");
        return Err(LectureError::ToolFailed {
            tool: tool.to_string(),
            detail: format!("exit {}: {}", output.status, tail.trim()),
        });
    }

    Ok(output.stdout)
}

/// Probe a media file's duration in seconds via ffprobe.
pub async fn probe_duration(
    ffprobe_bin: &str,
    path: &Path,
    timeout_secs: u64,
) -> Result<f64, LectureError> {
    let path_str = path.to_string_lossy();
    let stdout = run_tool(
        "ffprobe",
        ffprobe_bin,
        &[
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
            &path_str,
        ],
        timeout_secs,
    )
    .await?;

    let text = String::from_utf8_lossy(&stdout);
    text.trim()
        .parse::<f64>()
        .map_err(|_| LectureError::ToolFailed {
            tool: "ffprobe".to_string(),
            detail: format!("unparsable duration '{}' for {}", text.trim(), path.display()),
        })
}

/// Concatenate media files without re-encoding, via ffmpeg's concat demuxer.
///
/// All inputs must share one codec; that holds here because every input was
/// produced by our own earlier ffmpeg/TTS invocations with fixed settings.
pub async fn concat_copy(
    ffmpeg_bin: &str,
    inputs: &[std::path::PathBuf],
    output: &Path,
    timeout_secs: u64,
) -> Result<(), LectureError> {
    let list_path = output.with_extension("concat.txt");
    let mut list = String::new();
    for input in inputs {
        // concat demuxer quoting: single quotes, embedded quotes escaped.
        let escaped = input.to_string_lossy().replace('\'', r"'\''");
        list.push_str(&format!("file '{escaped}'\n"));
    }
    std::fs::write(&list_path, list).map_err(|e| LectureError::io(&list_path, e))?;

    let list_str = list_path.to_string_lossy();
    let out_str = output.to_string_lossy();
    run_tool(
        "ffmpeg",
        ffmpeg_bin,
        &[
            "-y", "-f", "concat", "-safe", "0", "-i", &list_str, "-c", "copy", &out_str,
        ],
        timeout_secs,
    )
    .await?;

    let _ = std::fs::remove_file(&list_path);
    Ok(())
}

/// Fail if `path` is missing or zero bytes after a reported-successful write.
pub fn verify_artifact(path: &Path) -> Result<u64, LectureError> {
    match std::fs::metadata(path) {
        Ok(meta) if meta.len() > 0 => Ok(meta.len()),
        _ => Err(LectureError::EmptyArtifact {
            path: path.to_path_buf(),
        }),
    }
}
