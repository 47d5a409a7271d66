//! Integration tests: block segmentation properties.
//!
//! Exercises `segment` and `split_parts` over fixtures in both detection
//! modes: order preservation, idempotence, and stray-text handling.

use mb_core::DiagramKind;
use mb_core::segment::{SegmentMode, segment, split_parts};
use pretty_assertions::assert_eq;

const MODES: [SegmentMode; 2] = [SegmentMode::StatementStart, SegmentMode::Lexical];

fn multi_view() -> &'static str {
    include_str!("fixtures/multi_view.mmd")
}

fn keywords_in_labels() -> &'static str {
    include_str!("fixtures/keywords_in_labels.mmd")
}

fn joined(buffer: &str, mode: SegmentMode) -> String {
    segment(buffer, mode)
        .iter()
        .map(|b| b.source())
        .collect::<Vec<_>>()
        .join("\n\n")
}

// ─── Order and coverage ─────────────────────────────────────────────────

#[test]
fn blocks_appear_in_buffer_order() {
    for mode in MODES {
        let buffer = multi_view();
        let blocks = segment(buffer, mode);
        let kinds: Vec<DiagramKind> = blocks.iter().map(|b| b.kind).collect();
        assert_eq!(
            kinds,
            vec![DiagramKind::Graph, DiagramKind::Sequence, DiagramKind::Pie],
            "{mode:?}"
        );
        assert!(blocks.windows(2).all(|w| w[0].start < w[1].start));
    }
}

#[test]
fn blocks_are_slices_of_the_buffer() {
    for mode in MODES {
        let buffer = multi_view();
        for block in segment(buffer, mode) {
            assert_eq!(&buffer[block.start..block.start + block.text.len()], block.text);
        }
    }
}

#[test]
fn parts_concatenate_to_the_buffer() {
    for buffer in [multi_view(), keywords_in_labels(), "", "   \n"] {
        for mode in MODES {
            let rebuilt: String = split_parts(buffer, mode).iter().map(|p| p.text).collect();
            assert_eq!(rebuilt, buffer);
        }
    }
}

#[test]
fn leading_comment_is_not_a_block() {
    let buffer = multi_view();
    let parts = split_parts(buffer, SegmentMode::StatementStart);
    assert!(parts[0].text.starts_with("%% board notes"));
    assert!(!parts[0].is_block());
    assert_eq!(segment(buffer, SegmentMode::StatementStart).len(), 3);
}

// ─── Idempotence ────────────────────────────────────────────────────────

#[test]
fn resegmenting_joined_blocks_is_stable() {
    for buffer in [multi_view(), keywords_in_labels()] {
        for mode in MODES {
            let first = joined(buffer, mode);
            let second = joined(&first, mode);
            assert_eq!(first, second, "{mode:?}");
            assert_eq!(segment(&first, mode).len(), segment(buffer, mode).len());
        }
    }
}

// ─── Keyword detection ──────────────────────────────────────────────────

#[test]
fn statement_mode_ignores_keywords_inside_labels() {
    let blocks = segment(keywords_in_labels(), SegmentMode::StatementStart);
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0].kind, DiagramKind::Flowchart);
    assert_eq!(blocks[1].kind, DiagramKind::Gantt);
}

#[test]
fn lexical_mode_splits_on_keywords_inside_labels() {
    let blocks = segment(keywords_in_labels(), SegmentMode::Lexical);
    // `pie`, `timeline`, and `graph` inside labels each open a block.
    assert_eq!(blocks.len(), 5);
    assert_eq!(blocks[1].kind, DiagramKind::Pie);
}

#[test]
fn leading_label_and_two_blocks() {
    let buffer = "graph LR\nA-->B\n\nsequenceDiagram\nA->>B: hi";
    for mode in MODES {
        let blocks = segment(buffer, mode);
        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].source().starts_with("graph"));
        assert!(blocks[1].source().starts_with("sequenceDiagram"));
    }
}
