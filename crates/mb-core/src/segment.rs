//! Block segmenter: one text buffer → ordered diagram blocks.
//!
//! The buffer is cut at every recognised diagram keyword. Each cut starts a
//! new *part*; parts that begin with a keyword are *blocks*, anything else
//! (stray text before the first keyword) is kept in the buffer but never
//! rendered.
//!
//! Two detectors are available:
//!
//! - [`SegmentMode::StatementStart`] recognises a keyword only at the start
//!   of a line (after optional indentation). A label such as
//!   `A[pie chart] --> B` stays inside its block.
//! - [`SegmentMode::Lexical`] recognises a keyword anywhere on a word
//!   boundary, the way the browser editor splits buffers.
//!   A keyword inside a label starts a new part.

use crate::keywords::{DiagramKind, is_word_char};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use winnow::ascii::{Caseless, space0};
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;
use winnow::token::literal;

/// How keyword occurrences are recognised as block starts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentMode {
    /// Keywords only start a block at the beginning of a line.
    #[default]
    StatementStart,
    /// Keywords start a block wherever they appear on a word boundary.
    Lexical,
}

/// A contiguous slice of the buffer between two cut points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Part<'a> {
    /// Raw, untrimmed text.
    pub text: &'a str,
    /// Byte offset of `text` in the buffer.
    pub start: usize,
    /// Diagram kind when this part is a block.
    pub kind: Option<DiagramKind>,
}

impl Part<'_> {
    pub fn is_block(&self) -> bool {
        self.kind.is_some()
    }
}

/// A renderable diagram block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block<'a> {
    /// Position among blocks (non-block parts are not counted).
    pub index: usize,
    /// Raw, untrimmed text, exactly as it appears in the buffer.
    pub text: &'a str,
    /// Byte offset of `text` in the buffer.
    pub start: usize,
    pub kind: DiagramKind,
}

impl<'a> Block<'a> {
    /// Trimmed text handed to the renderer.
    pub fn source(&self) -> &'a str {
        self.text.trim()
    }

    /// First line of the block, trimmed (`graph LR`, `sequenceDiagram`, ...).
    pub fn header(&self) -> &'a str {
        self.source().lines().next().unwrap_or_default().trim()
    }
}

static KEYWORD_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    let alternatives: Vec<String> = DiagramKind::ALL
        .iter()
        .map(|kind| regex::escape(kind.keyword()))
        .collect();
    Regex::new(&format!("(?i)(?:{})", alternatives.join("|"))).expect("keyword pattern is valid")
});

/// Split the buffer into blocks, in buffer order.
///
/// Empty buffers, whitespace and leading stray text yield no blocks.
pub fn segment(buffer: &str, mode: SegmentMode) -> Vec<Block<'_>> {
    split_parts(buffer, mode)
        .into_iter()
        .filter_map(|part| Some((part, part.kind?)))
        .enumerate()
        .map(|(index, (part, kind))| Block {
            index,
            text: part.text,
            start: part.start,
            kind,
        })
        .collect()
}

/// Split the buffer into every part, blocks and non-blocks alike.
///
/// Concatenating `text` of all parts reproduces `buffer` byte for byte.
pub fn split_parts(buffer: &str, mode: SegmentMode) -> Vec<Part<'_>> {
    let mut bounds = cut_points(buffer, mode);
    if bounds.first() != Some(&0) {
        bounds.insert(0, 0);
    }
    bounds.push(buffer.len());

    bounds
        .windows(2)
        .filter(|w| w[0] < w[1])
        .map(|w| {
            let text = &buffer[w[0]..w[1]];
            let trimmed = text.trim();
            let kind = if trimmed.is_empty() {
                None
            } else {
                DiagramKind::detect(trimmed)
            };
            Part {
                text,
                start: w[0],
                kind,
            }
        })
        .collect()
}

/// Byte offsets where a keyword begins a new part, ascending.
pub fn cut_points(buffer: &str, mode: SegmentMode) -> Vec<usize> {
    match mode {
        SegmentMode::StatementStart => statement_cut_points(buffer),
        SegmentMode::Lexical => lexical_cut_points(buffer),
    }
}

fn lexical_cut_points(buffer: &str) -> Vec<usize> {
    let mut points = Vec::new();
    let mut from = 0;
    while let Some(found) = KEYWORD_PATTERN.find_at(buffer, from) {
        let start = found.start();
        let boundary_before = buffer[..start]
            .chars()
            .next_back()
            .is_none_or(|c| !is_word_char(c));
        if boundary_before && DiagramKind::at(&buffer[start..]).is_some() {
            points.push(start);
            from = found.end();
        } else {
            // Retry one character further; another keyword may start inside
            // the rejected match.
            from = start
                + buffer[start..]
                    .chars()
                    .next()
                    .map_or(1, char::len_utf8);
        }
        if from >= buffer.len() {
            break;
        }
    }
    points
}

fn statement_cut_points(buffer: &str) -> Vec<usize> {
    std::iter::once(0)
        .chain(buffer.match_indices('\n').map(|(i, _)| i + 1))
        .filter_map(|line_start| {
            let mut rest = &buffer[line_start..];
            statement_keyword
                .parse_next(&mut rest)
                .ok()
                .map(|(indent, _)| line_start + indent)
        })
        .collect()
}

/// Optional indentation followed by a keyword on a word boundary.
/// Returns the indentation width in bytes.
fn statement_keyword(input: &mut &str) -> ModalResult<(usize, DiagramKind)> {
    let indent: &str = space0.parse_next(input)?;
    let kind = keyword.parse_next(input)?;
    Ok((indent.len(), kind))
}

fn keyword(input: &mut &str) -> ModalResult<DiagramKind> {
    for kind in DiagramKind::ALL {
        let checkpoint = *input;
        let matched = literal::<_, _, ContextError>(Caseless(kind.keyword())).parse_next(input);
        if matched.is_ok() && input.chars().next().is_none_or(|c| !is_word_char(c)) {
            return Ok(kind);
        }
        *input = checkpoint;
    }
    Err(ErrMode::Backtrack(ContextError::new()))
}
