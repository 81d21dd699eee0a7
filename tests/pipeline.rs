//! Cross-stage tests that exercise the pipeline's contracts without any
//! network, model, or external-tool dependency.

use lectio::marker;
use lectio::output::{SlideEntry, SlideOutline};
use lectio::pipeline::{assemble, deck, narration, outline, slides, speech};
use lectio::tts::chunk_text;
use lectio::{Db, GenerationConfig, LectureError, LectureRequest, Workspace};
use std::path::PathBuf;

fn sample_outline(n: usize) -> SlideOutline {
    SlideOutline {
        slides: (1..=n)
            .map(|i| SlideEntry {
                title: format!("Topic {i}"),
                points: vec![format!("point {i}a"), format!("point {i}b")],
            })
            .collect(),
    }
}

fn sample_script(n: usize) -> String {
    (1..=n)
        .map(|i| {
            format!(
                "{}\nWelcome to segment {i}. Here we talk about topic {i} at length.\n\n",
                marker::page_marker(i)
            )
        })
        .collect()
}

// The contract that holds the whole pipeline together: a script written
// with the canonical markers splits back into exactly its segments, in
// order, regardless of page count.
#[test]
fn script_round_trips_through_the_marker_contract() {
    for n in [3, 7, 25] {
        let script = sample_script(n);
        assert_eq!(marker::marker_count(&script), n);
        let pages = marker::split_pages(&script);
        assert_eq!(pages.len(), n);
        for (i, page) in pages.iter().enumerate() {
            assert_eq!(page.page, i + 1);
            assert!(page.text.contains(&format!("segment {}", i + 1)));
        }
        assert!(narration::validate_script(&script, n).is_ok());
    }
}

// Outline text from the model parses into the same structure the deck is
// later built from, with one slide page per outline entry.
#[test]
fn outline_flows_into_the_deck_unchanged() {
    let model_response = "\
Sure! Here is the outline:

## Introduction
- what the lecture covers
- why it matters

## Core Ideas
- definitions
- examples

## Summary
- recap
";
    let parsed = outline::parse_outline(model_response).unwrap();
    parsed.validate().unwrap();
    assert_eq!(parsed.len(), 3);

    let xml = deck::build_fodp(&parsed);
    assert_eq!(xml.matches("<draw:page ").count(), parsed.len());
    assert!(xml.contains("Core Ideas"));
    assert!(xml.contains("• recap"));
}

#[test]
fn outline_and_script_counts_are_cross_checked() {
    let o = sample_outline(5);
    assert!(narration::validate_script(&sample_script(5), o.len()).is_ok());
    assert!(matches!(
        narration::validate_script(&sample_script(4), o.len()),
        Err(LectureError::MalformedScript { .. })
    ));
}

// Positional pairing is only sound because both naming schemes zero-pad.
#[test]
fn slide_and_audio_names_pair_positionally() {
    let ws = Workspace::new().unwrap();
    for i in 1..=11 {
        std::fs::write(ws.slides_dir().join(slides::slide_file_name(i)), b"png").unwrap();
        std::fs::write(ws.audio_dir().join(speech::audio_file_name(i)), b"mp3").unwrap();
    }
    // A stray non-media file must not disturb the pairing.
    std::fs::write(ws.slides_dir().join("render.log"), b"noise").unwrap();

    let slide_paths = assemble::list_sorted(&ws.slides_dir(), "png").unwrap();
    let audio_paths = assemble::list_sorted(&ws.audio_dir(), "mp3").unwrap();
    let pairs = assemble::pair_tracks(&slide_paths, &audio_paths).unwrap();

    assert_eq!(pairs.len(), 11);
    for (i, (slide, audio)) in pairs.iter().enumerate() {
        let number = format!("{:04}", i + 1);
        assert!(slide.to_string_lossy().contains(&number));
        assert!(audio.to_string_lossy().contains(&number));
    }
}

#[test]
fn missing_audio_aborts_instead_of_guessing() {
    let ws = Workspace::new().unwrap();
    for i in 1..=4 {
        std::fs::write(ws.slides_dir().join(slides::slide_file_name(i)), b"png").unwrap();
    }
    for i in 1..=3 {
        std::fs::write(ws.audio_dir().join(speech::audio_file_name(i)), b"mp3").unwrap();
    }

    let slide_paths = assemble::list_sorted(&ws.slides_dir(), "png").unwrap();
    let audio_paths = assemble::list_sorted(&ws.audio_dir(), "mp3").unwrap();
    assert!(matches!(
        assemble::pair_tracks(&slide_paths, &audio_paths),
        Err(LectureError::PageCountMismatch {
            slides: 4,
            audio: 3
        })
    ));
}

#[test]
fn workspace_cleans_up_a_full_run_worth_of_artifacts() {
    let root: PathBuf;
    {
        let ws = Workspace::new().unwrap();
        root = ws.path().to_path_buf();
        let o = sample_outline(3);
        deck::write_deck(&o, &ws.deck_dir()).unwrap();
        std::fs::write(ws.text_dir().join("script.txt"), sample_script(3)).unwrap();
        std::fs::write(ws.video_dir().join("lecture.mp4"), b"mp4").unwrap();
        assert!(root.join("deck/deck.fodp").is_file());
    }
    assert!(!root.exists());
}

#[test]
fn long_segments_chunk_at_sentence_boundaries() {
    let segment = "One sentence here. Another sentence there. ".repeat(120);
    let limit = GenerationConfig::default().tts_chunk_chars;
    let chunks = chunk_text(&segment, limit);
    assert!(chunks.len() > 1);
    for chunk in &chunks {
        assert!(chunk.chars().count() <= limit);
        assert!(chunk.ends_with('.'), "chunk should end on a sentence: {chunk:?}");
    }
}

#[test]
fn request_validation_guards_the_front_door() {
    let good = LectureRequest {
        title: "Queues".into(),
        professor: "Prof. Kim".into(),
        description: Some("week 3".into()),
        pdf: b"%PDF-1.5 ...".to_vec(),
    };
    assert!(good.validate().is_ok());

    let zip = LectureRequest {
        pdf: b"PK\x03\x04zipfile".to_vec(),
        ..good.clone()
    };
    assert!(matches!(zip.validate(), Err(LectureError::NotAPdf { .. })));

    let anonymous = LectureRequest {
        professor: "".into(),
        ..good
    };
    assert!(matches!(
        anonymous.validate(),
        Err(LectureError::MissingField { field }) if field == "professor"
    ));
}

#[test]
fn lecture_records_persist_and_count_views() {
    let db = Db::in_memory().unwrap();
    let stored = db
        .insert_lecture(
            "Intro to Queues",
            "Prof. Kim",
            Some("week 3"),
            "http://minio:9000/videos/class/a.mp4",
            "class/a.mp4",
        )
        .unwrap();
    assert_eq!(stored.view_count, 0);

    for expected in 1..=3 {
        let seen = db.get_lecture(&stored.id).unwrap().unwrap();
        assert_eq!(seen.view_count, expected);
    }

    let all = db.list_lectures().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].title, "Intro to Queues");
    assert_eq!(all[0].description.as_deref(), Some("week 3"));
}
