//! Markup mutator: authoring intents → rewritten buffer text.
//!
//! Every operation here is a textual patch over the raw buffer. Blocks other
//! than the one being edited are copied through byte for byte. When a patch
//! cannot find its target the operation returns a [`MutateError`] and the
//! caller keeps the original buffer.

use crate::error::MutateError;
use crate::ident::{node_for_name, quote_reference};
use crate::keywords::is_word_char;
use crate::segment::{SegmentMode, segment, split_parts};
use regex::{Regex, RegexBuilder};
use std::borrow::Cow;

/// Indentation used for lines appended to a block.
const INDENT: &str = "    ";

/// Request to connect a source node to a new target node inside one block.
///
/// Exactly one of `clicked` (a node picked on the canvas) or `typed_source`
/// (a name typed into the menu) identifies the source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddElement<'a> {
    /// Index of the block among rendered blocks.
    pub block_index: usize,
    /// Existing node id the user right-clicked.
    pub clicked: Option<&'a str>,
    /// Source name typed by the user; declared if not yet in the block.
    pub typed_source: Option<&'a str>,
    /// Display name of the node to create.
    pub target_name: &'a str,
    /// Arrow glyph, e.g. `-->`, `-.->`, `==>`.
    pub connector: &'a str,
    /// Optional edge label.
    pub edge_label: Option<&'a str>,
}

/// Append a connector (and, when needed, a source declaration) to a block.
pub fn add_element(
    buffer: &str,
    request: &AddElement<'_>,
    mode: SegmentMode,
) -> Result<String, MutateError> {
    let clicked = request.clicked.map(str::trim).filter(|s| !s.is_empty());
    let typed = request.typed_source.map(str::trim).filter(|s| !s.is_empty());
    if clicked.is_none() && typed.is_none() {
        return Err(MutateError::NoSource);
    }
    let target_name = request.target_name.trim();
    if target_name.is_empty() {
        return Err(MutateError::EmptyTarget);
    }

    let parts = split_parts(buffer, mode);
    let count = parts.iter().filter(|p| p.is_block()).count();
    let position = parts
        .iter()
        .enumerate()
        .filter(|(_, part)| part.is_block())
        .nth(request.block_index)
        .map(|(i, _)| i)
        .ok_or(MutateError::BlockOutOfRange {
            index: request.block_index,
            count,
        })?;
    let block = parts[position].text;

    let mut lines: Vec<String> = Vec::with_capacity(2);
    let source_ref = match (clicked, typed) {
        (Some(id), _) => quote_reference(id).into_owned(),
        (None, Some(name)) => {
            let source = node_for_name(name, block);
            if !mentions(block, &source.id) {
                lines.push(source.definition);
            }
            quote_reference(&source.id).into_owned()
        }
        (None, None) => return Err(MutateError::NoSource),
    };

    let target = node_for_name(target_name, block);
    let label = match request.edge_label.map(str::trim) {
        Some(label) if !label.is_empty() => format!("|{label}| "),
        _ => " ".to_string(),
    };
    lines.push(format!(
        "{source_ref} {}{label}{}",
        request.connector.trim(),
        target.definition
    ));

    let body = block.trim_end();
    let trailing = &block[body.len()..];
    let mut patched = String::with_capacity(buffer.len() + 64);
    for (i, part) in parts.iter().enumerate() {
        if i != position {
            patched.push_str(part.text);
            continue;
        }
        patched.push_str(body);
        for line in &lines {
            patched.push('\n');
            patched.push_str(INDENT);
            patched.push_str(line);
        }
        if trailing.contains('\n') {
            patched.push_str(trailing);
        } else {
            patched.push('\n');
        }
    }
    log::debug!(
        "add_element: block {} gained {} line(s)",
        request.block_index,
        lines.len()
    );
    Ok(patched)
}

/// Set the label of the edge `source → target` on every line that carries it.
///
/// Only single-line edges of the shape `source <arrow> [|old|] target` are
/// found; anything else is left alone. A blank `source` or `target` never
/// matches.
pub fn relabel_edge(
    buffer: &str,
    source: &str,
    target: &str,
    label: &str,
) -> Result<String, MutateError> {
    let (source, target) = (source.trim(), target.trim());
    let not_found = || MutateError::EdgeNotFound {
        from: source.to_string(),
        to: target.to_string(),
    };
    if source.is_empty() || target.is_empty() {
        return Err(not_found());
    }
    let pattern = edge_pattern(source, target).ok_or_else(not_found)?;

    let mut changed = false;
    let lines: Vec<Cow<'_, str>> = buffer
        .split('\n')
        .map(|line| match pattern.captures(line) {
            Some(caps) => {
                changed = true;
                let whole = caps.get(0).map_or(0..0, |m| m.range());
                Cow::Owned(format!(
                    "{}{} {}|{label}| {}{}",
                    &line[..whole.start],
                    &caps[1],
                    &caps[2],
                    &caps[4],
                    &line[whole.end..]
                ))
            }
            None => Cow::Borrowed(line),
        })
        .collect();

    if !changed {
        return Err(not_found());
    }
    Ok(lines.join("\n"))
}

/// One fenced ```` ```mermaid ```` block per diagram block.
pub fn to_portable_blocks(buffer: &str, mode: SegmentMode) -> Vec<String> {
    segment(buffer, mode)
        .iter()
        .map(|block| format!("```mermaid\n{}\n```", block.source()))
        .collect()
}

/// The whole buffer as Markdown: fenced blocks separated by a blank line.
pub fn to_markdown(buffer: &str, mode: SegmentMode) -> String {
    to_portable_blocks(buffer, mode).join("\n\n")
}

fn edge_pattern(source: &str, target: &str) -> Option<Regex> {
    let pattern = format!(
        r"({})\s+([-=.]+>|<[-=.]+|[-=.]+)\s*(\|.*?\|)?\s*({})",
        regex::escape(source),
        regex::escape(target)
    );
    RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .build()
        .ok()
}

/// Whether `id` occurs in `text` as a whole token.
fn mentions(text: &str, id: &str) -> bool {
    text.match_indices(id).any(|(at, _)| {
        let before = text[..at].chars().next_back();
        let after = text[at + id.len()..].chars().next();
        before.is_none_or(|c| !is_word_char(c)) && after.is_none_or(|c| !is_word_char(c))
    })
}
