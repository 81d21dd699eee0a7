//! Slide rendering: deck file to numbered PNG images.
//!
//! Two steps: the headless converter turns the deck into a fixed-layout PDF,
//! then pdfium rasterises each PDF page. Image names are zero-padded
//! (`slide_0001.png`) so a lexicographic directory listing is page order.

use crate::config::GenerationConfig;
use crate::error::LectureError;
use crate::pipeline::media;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Zero-padded image name for a 1-based slide number.
pub fn slide_file_name(n: usize) -> String {
    format!("slide_{n:04}.png")
}

/// Convert the deck to PDF and rasterise every page.
///
/// Returns the rendered image paths in slide order.
pub async fn render_slides(
    deck_path: &Path,
    slides_dir: &Path,
    config: &GenerationConfig,
) -> Result<Vec<PathBuf>, LectureError> {
    let pdf_path = convert_to_pdf(deck_path, config).await?;
    rasterise_pdf(&pdf_path, slides_dir, config).await
}

/// Run the headless converter on the deck, returning the produced PDF path.
async fn convert_to_pdf(
    deck_path: &Path,
    config: &GenerationConfig,
) -> Result<PathBuf, LectureError> {
    let out_dir = deck_path
        .parent()
        .ok_or_else(|| LectureError::Internal("deck path has no parent".into()))?;

    let deck_str = deck_path.to_string_lossy();
    let out_str = out_dir.to_string_lossy();
    media::run_tool(
        "soffice",
        &config.converter_bin,
        &[
            "--headless",
            "--convert-to",
            "pdf",
            "--outdir",
            &out_str,
            &deck_str,
        ],
        config.converter_timeout_secs,
    )
    .await?;

    // soffice keeps the stem and swaps the extension.
    let pdf_path = deck_path.with_extension("pdf");
    if !pdf_path.is_file() {
        return Err(LectureError::ToolMissingOutput {
            tool: "soffice".to_string(),
            path: pdf_path,
        });
    }
    media::verify_artifact(&pdf_path)?;

    debug!("slides: converter wrote {}", pdf_path.display());
    Ok(pdf_path)
}

/// Rasterise every page of the deck PDF into the slides directory.
async fn rasterise_pdf(
    pdf_path: &Path,
    slides_dir: &Path,
    config: &GenerationConfig,
) -> Result<Vec<PathBuf>, LectureError> {
    let pdf = pdf_path.to_path_buf();
    let out_dir = slides_dir.to_path_buf();
    let max_pixels = config.slide_pixels;

    let paths = tokio::task::spawn_blocking(move || rasterise_blocking(&pdf, &out_dir, max_pixels))
        .await
        .map_err(|e| LectureError::Internal(format!("rasterise task panicked: {e}")))??;

    if paths.is_empty() {
        return Err(LectureError::NoSlidesRendered);
    }
    for path in &paths {
        media::verify_artifact(path)?;
    }

    info!("slides: rendered {} images", paths.len());
    Ok(paths)
}

fn rasterise_blocking(
    pdf_path: &Path,
    out_dir: &Path,
    max_pixels: u32,
) -> Result<Vec<PathBuf>, LectureError> {
    let pdfium = Pdfium::default();
    let document =
        pdfium
            .load_pdf_from_file(pdf_path, None)
            .map_err(|e| LectureError::ToolFailed {
                tool: "soffice".to_string(),
                detail: format!("converter output is not a readable PDF: {e:?}"),
            })?;

    let render_config = PdfRenderConfig::new()
        .set_target_width(max_pixels as i32)
        .set_maximum_height(max_pixels as i32);

    let pages = document.pages();
    let mut paths = Vec::with_capacity(pages.len() as usize);

    for idx in 0..pages.len() {
        let page = pages.get(idx).map_err(|e| LectureError::Internal(format!(
            "slide page {} load failed: {e:?}",
            idx + 1
        )))?;
        let bitmap =
            page.render_with_config(&render_config)
                .map_err(|e| LectureError::Internal(format!(
                    "slide page {} render failed: {e:?}",
                    idx + 1
                )))?;

        let image = bitmap.as_image();
        let path = out_dir.join(slide_file_name(idx as usize + 1));
        image
            .save(&path)
            .map_err(|e| LectureError::Internal(format!(
                "slide image save failed at {}: {e}",
                path.display()
            )))?;

        debug!(
            "slides: page {} -> {} ({}x{})",
            idx + 1,
            path.display(),
            image.width(),
            image.height()
        );
        paths.push(path);
    }

    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slide_names_sort_in_page_order() {
        let names: Vec<String> = (1..=12).map(slide_file_name).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        assert_eq!(names[0], "slide_0001.png");
        assert_eq!(names[9], "slide_0010.png");
    }
}
