//! The page-marker wire contract.
//!
//! Several pipeline stages exchange page-delimited text: the extractor emits
//! it, the refiner must preserve it, the narration generator is prompted to
//! produce it, and the speech synthesizer splits on it. If the producer and
//! the consumer ever disagree on the delimiter — even by whitespace — pages
//! are silently merged or dropped and the slide/audio count invariant breaks
//! far downstream where the cause is hard to see.
//!
//! This module is therefore the *single* owner of the marker format. No other
//! module may format or parse a marker directly; they call [`page_marker`]
//! and [`split_pages`] so the two directions cannot drift apart.
//!
//! Canonical form (one per line, 1-based decimal page number):
//!
//! ```text
//! ------Page 3------
//! ```

use once_cell::sync::Lazy;
use regex::Regex;

/// Matches one canonical marker line, capturing the page number.
static RE_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^------Page ([0-9]+)------[ \t]*$").unwrap());

/// Format the canonical marker for a 1-based page number.
pub fn page_marker(page: usize) -> String {
    format!("------Page {page}------")
}

/// Human-readable description of the marker shape, for use in prompts.
///
/// Prompts must describe the exact byte pattern the splitter recognises;
/// paraphrasing the format in prose is how the contract drifts.
pub fn marker_pattern_for_prompt() -> String {
    page_marker(1).replace('1', "N")
}

/// Count the marker lines present in `text`.
pub fn marker_count(text: &str) -> usize {
    RE_MARKER.find_iter(text).count()
}

/// One page's worth of marker-delimited text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptPage {
    /// 1-based page number taken from the marker itself.
    pub page: usize,
    /// The page body with surrounding whitespace trimmed. Never empty.
    pub text: String,
}

/// Split marker-delimited text into its non-empty page segments, in document
/// order.
///
/// A segment is the text between one marker line and the next (or the end of
/// input). Segments that are empty after trimming are *excluded* — callers
/// that care about skipped pages compare `split_pages(s).len()` against
/// [`marker_count`] and log the difference. Text before the first marker is
/// ignored.
pub fn split_pages(text: &str) -> Vec<ScriptPage> {
    let mut pages = Vec::new();
    let matches: Vec<_> = RE_MARKER.captures_iter(text).collect();

    for (i, caps) in matches.iter().enumerate() {
        let page: usize = match caps[1].parse() {
            Ok(n) => n,
            Err(_) => continue, // longer than usize — not a real page number
        };
        let body_start = caps.get(0).map(|m| m.end()).unwrap_or(0);
        let body_end = matches
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map(|m| m.start())
            .unwrap_or(text.len());

        let body = text[body_start..body_end].trim();
        if !body.is_empty() {
            pages.push(ScriptPage {
                page,
                text: body.to_string(),
            });
        }
    }

    pages
}

#[cfg(test)]
mod tests {
    use super::*;

    fn script(n: usize) -> String {
        let mut s = String::new();
        for i in 1..=n {
            s.push_str(&page_marker(i));
            s.push('\n');
            s.push_str(&format!("Content of page {i}.\n\n"));
        }
        s
    }

    #[test]
    fn round_trip_counts_match() {
        for n in [1, 3, 12] {
            let s = script(n);
            assert_eq!(marker_count(&s), n);
            let pages = split_pages(&s);
            assert_eq!(pages.len(), n, "N markers with non-empty bodies must split into N pages");
            for (i, p) in pages.iter().enumerate() {
                assert_eq!(p.page, i + 1);
            }
        }
    }

    #[test]
    fn empty_segments_are_excluded() {
        let s = format!(
            "{}\nfirst\n{}\n   \n{}\nthird\n",
            page_marker(1),
            page_marker(2),
            page_marker(3)
        );
        assert_eq!(marker_count(&s), 3);
        let pages = split_pages(&s);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].page, 1);
        assert_eq!(pages[1].page, 3);
    }

    #[test]
    fn preamble_before_first_marker_is_ignored() {
        let s = format!("Here is your script:\n{}\nhello\n", page_marker(1));
        let pages = split_pages(&s);
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].text, "hello");
    }

    #[test]
    fn historical_variants_are_not_recognised() {
        let s = "=== Page 1 ===\nfoo\n----page 2----\nbar\n";
        assert_eq!(marker_count(s), 0);
        assert!(split_pages(s).is_empty());
    }

    #[test]
    fn marker_mid_line_is_not_a_marker() {
        let s = format!("see {} for details\n{}\nbody\n", page_marker(7), page_marker(1));
        assert_eq!(marker_count(&s), 1);
        assert_eq!(split_pages(&s).len(), 1);
    }

    #[test]
    fn trailing_spaces_after_marker_are_tolerated() {
        let s = format!("{}  \nbody\n", page_marker(1));
        assert_eq!(split_pages(&s).len(), 1);
    }

    #[test]
    fn prompt_pattern_matches_formatter() {
        assert_eq!(marker_pattern_for_prompt(), "------Page N------");
    }
}
