//! Node identifiers for elements authored from the canvas.
//!
//! Mermaid accepts bare alphanumeric ids. Anything else (spaces, accents,
//! punctuation, Hangul) is given a generated id and carried as a quoted
//! label instead.

use std::borrow::Cow;
use std::sync::atomic::{AtomicU64, Ordering};

/// How a node is referred to and how it is declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRef {
    /// Identifier used in connector lines.
    pub id: String,
    /// Declaration text: the bare id, or `id["Label"]`.
    pub definition: String,
}

/// Whether `name` can be used verbatim as a Mermaid id.
pub fn is_plain(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Build the id and declaration for a node named `name`.
///
/// `taken` is the text the node will be inserted into; generated ids never
/// collide with anything already written there.
pub fn node_for_name(name: &str, taken: &str) -> NodeRef {
    if is_plain(name) {
        return NodeRef {
            id: name.to_string(),
            definition: name.to_string(),
        };
    }
    let id = generated_id(taken);
    let definition = format!("{id}[\"{}\"]", escape_label(name));
    NodeRef { id, definition }
}

/// Reference an existing id in a connector line, quoting it when needed.
///
/// Any id with a character outside `[A-Za-z0-9]` is quoted, `_` included.
pub fn quote_reference(id: &str) -> Cow<'_, str> {
    if is_plain(id) {
        Cow::Borrowed(id)
    } else {
        Cow::Owned(format!("\"{}\"", escape_label(id)))
    }
}

/// Generate a short alphanumeric `node<n>` id not present in `taken`.
pub fn generated_id(taken: &str) -> String {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    loop {
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        let id = format!("node{n}");
        if !taken.contains(&id) {
            return id;
        }
    }
}

/// Mermaid has no backslash escape inside quoted labels; it uses entities.
fn escape_label(text: &str) -> Cow<'_, str> {
    if text.contains('"') {
        Cow::Owned(text.replace('"', "#quot;"))
    } else {
        Cow::Borrowed(text)
    }
}
