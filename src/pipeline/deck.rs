//! Deck generation: turn the validated outline into a slide document.
//!
//! The deck is written as a Flat XML OpenDocument Presentation (`.fodp`) —
//! a single self-contained XML file, no zip container. Generating it
//! deterministically from the typed outline means the slide count always
//! equals the outline length, which the assembly stage later relies on.
//! The headless converter (`soffice`) turns the deck into a fixed-layout
//! PDF in the next stage.

use crate::error::LectureError;
use crate::output::SlideOutline;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::debug;

const DECK_FILE_NAME: &str = "deck.fodp";

/// Build and write the deck file, returning its path.
pub fn write_deck(outline: &SlideOutline, deck_dir: &Path) -> Result<PathBuf, LectureError> {
    let path = deck_dir.join(DECK_FILE_NAME);
    let xml = build_fodp(outline);
    std::fs::write(&path, xml).map_err(|e| LectureError::io(&path, e))?;
    debug!("deck: wrote {} slides to {}", outline.len(), path.display());
    Ok(path)
}

/// Render the outline as Flat ODP XML, one `draw:page` per slide.
pub fn build_fodp(outline: &SlideOutline) -> String {
    let mut xml = String::with_capacity(4096 + outline.len() * 512);

    xml.push_str(concat!(
        r#"<?xml version="1.0" encoding="UTF-8"?>"#,
        "\n",
        r#"<office:document xmlns:office="urn:oasis:names:tc:opendocument:xmlns:office:1.0""#,
        r#" xmlns:style="urn:oasis:names:tc:opendocument:xmlns:style:1.0""#,
        r#" xmlns:text="urn:oasis:names:tc:opendocument:xmlns:text:1.0""#,
        r#" xmlns:draw="urn:oasis:names:tc:opendocument:xmlns:drawing:1.0""#,
        r#" xmlns:fo="urn:oasis:names:tc:opendocument:xmlns:xsl-fo-compatible:1.0""#,
        r#" xmlns:svg="urn:oasis:names:tc:opendocument:xmlns:svg-compatible:1.0""#,
        r#" xmlns:presentation="urn:oasis:names:tc:opendocument:xmlns:presentation:1.0""#,
        r#" office:version="1.3""#,
        r#" office:mimetype="application/vnd.oasis.opendocument.presentation">"#,
        "\n",
    ));

    // 16:9 page geometry plus title/body text styles.
    xml.push_str(concat!(
        r#"<office:automatic-styles>"#,
        r#"<style:page-layout style:name="PL1">"#,
        r#"<style:page-layout-properties fo:page-width="28cm" fo:page-height="15.75cm""#,
        r#" style:print-orientation="landscape" fo:margin="0cm"/>"#,
        r#"</style:page-layout>"#,
        r#"<style:style style:name="TitleText" style:family="paragraph">"#,
        r#"<style:text-properties fo:font-size="36pt" fo:font-weight="bold"/>"#,
        r#"</style:style>"#,
        r#"<style:style style:name="BodyText" style:family="paragraph">"#,
        r#"<style:text-properties fo:font-size="22pt"/>"#,
        r#"</style:style>"#,
        r#"</office:automatic-styles>"#,
        "\n",
        r#"<office:master-styles>"#,
        r#"<style:master-page style:name="Default" style:page-layout-name="PL1"/>"#,
        r#"</office:master-styles>"#,
        "\n",
        r#"<office:body><office:presentation>"#,
        "\n",
    ));

    for (i, slide) in outline.slides.iter().enumerate() {
        let _ = write!(
            xml,
            r#"<draw:page draw:name="page{}" draw:master-page-name="Default">"#,
            i + 1
        );

        let _ = write!(
            xml,
            concat!(
                r#"<draw:frame draw:layer="layout" svg:width="25cm" svg:height="3cm""#,
                r#" svg:x="1.5cm" svg:y="1cm">"#,
                r#"<draw:text-box><text:p text:style-name="TitleText">{}</text:p>"#,
                r#"</draw:text-box></draw:frame>"#,
            ),
            xml_escape(&slide.title)
        );

        xml.push_str(concat!(
            r#"<draw:frame draw:layer="layout" svg:width="25cm" svg:height="10cm""#,
            r#" svg:x="1.5cm" svg:y="4.5cm"><draw:text-box>"#,
        ));
        for point in &slide.points {
            let _ = write!(
                xml,
                r#"<text:p text:style-name="BodyText">• {}</text:p>"#,
                xml_escape(point)
            );
        }
        xml.push_str("</draw:text-box></draw:frame>");

        xml.push_str("</draw:page>\n");
    }

    xml.push_str("</office:presentation></office:body></office:document>\n");
    xml
}

/// Escape text for XML content.
fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::SlideEntry;

    fn outline() -> SlideOutline {
        SlideOutline {
            slides: vec![
                SlideEntry {
                    title: "Intro".into(),
                    points: vec!["first point".into(), "second point".into()],
                },
                SlideEntry {
                    title: "Q & A <session>".into(),
                    points: vec!["\"quoted\"".into()],
                },
            ],
        }
    }

    #[test]
    fn one_page_per_slide() {
        let xml = build_fodp(&outline());
        assert_eq!(xml.matches("<draw:page ").count(), 2);
        assert!(xml.contains(r#"draw:name="page1""#));
        assert!(xml.contains(r#"draw:name="page2""#));
    }

    #[test]
    fn special_characters_are_escaped() {
        let xml = build_fodp(&outline());
        assert!(xml.contains("Q &amp; A &lt;session&gt;"));
        assert!(xml.contains("&quot;quoted&quot;"));
        assert!(!xml.contains("<session>"));
    }

    #[test]
    fn declares_presentation_mimetype() {
        let xml = build_fodp(&outline());
        assert!(xml.contains("application/vnd.oasis.opendocument.presentation"));
    }

    #[test]
    fn write_deck_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_deck(&outline(), dir.path()).unwrap();
        assert!(path.is_file());
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("<?xml"));
    }
}
