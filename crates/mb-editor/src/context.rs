//! Right-click targeting on rendered diagrams.
//!
//! The renderer tags flowchart nodes with ids like `flowchart-<id>-<n>` and
//! wraps edges in groups named `L-<source>-<target>-<n>`. Those ids are all
//! the canvas knows about an element, so the context menu works from them.

use mb_core::segment::Block;
use regex::Regex;
use std::sync::LazyLock;

static NODE_ELEMENT_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"flowchart-(.+)-\d+").expect("node id pattern is valid"));

/// What the user right-clicked inside a block, as reported by the DOM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickedElement<'a> {
    /// An element with the `node` class.
    Node {
        element_id: &'a str,
        /// Text of the node's label, used when the id is unrecognised.
        label: Option<&'a str>,
    },
    /// An edge path or edge label.
    Edge {
        /// Id of the enclosing `L-…` group, if any.
        group_id: Option<&'a str>,
        label: &'a str,
    },
    Background,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeRef {
    pub source: String,
    pub target: String,
    pub label: String,
}

/// Resolved target of the authoring menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextTarget {
    pub diagram_index: usize,
    pub node: Option<String>,
    pub edge: Option<EdgeRef>,
}

impl ContextTarget {
    /// Resolve a right-click on block `diagram_index`.
    ///
    /// Returns `None` when the block does not exist or is not a
    /// `graph`/`flowchart` block; the menu does not open then.
    pub fn resolve(
        blocks: &[Block<'_>],
        diagram_index: usize,
        picked: PickedElement<'_>,
    ) -> Option<Self> {
        let block = blocks.get(diagram_index)?;
        if !block.kind.supports_authoring() {
            log::debug!("context: block {diagram_index} is {:?}, no menu", block.kind);
            return None;
        }
        let (node, edge) = match picked {
            PickedElement::Node { element_id, label } => {
                let id = node_id_from_element(element_id)
                    .or(label.map(str::trim).filter(|l| !l.is_empty()))
                    .unwrap_or("Node");
                (Some(id.to_string()), None)
            }
            PickedElement::Edge { group_id, label } => {
                let (source, target) = group_id
                    .and_then(edge_from_group_id)
                    .unwrap_or(("Source", "Target"));
                let edge = EdgeRef {
                    source: source.to_string(),
                    target: target.to_string(),
                    label: label.trim().to_string(),
                };
                (None, Some(edge))
            }
            PickedElement::Background => (None, None),
        };
        Some(Self {
            diagram_index,
            node,
            edge,
        })
    }

    /// Subject for an "explain" request and whether it names an edge.
    pub fn explain_subject(&self) -> Option<(String, bool)> {
        if let Some(edge) = &self.edge {
            return Some((format!("{} -> {}", edge.source, edge.target), true));
        }
        self.node.as_ref().map(|id| (id.clone(), false))
    }

    /// Whether the menu was opened on empty canvas.
    pub fn is_background(&self) -> bool {
        self.node.is_none() && self.edge.is_none()
    }
}

/// Node id from a rendered element id such as `flowchart-Cart-12`.
pub fn node_id_from_element(element_id: &str) -> Option<&str> {
    NODE_ELEMENT_ID
        .captures(element_id)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Source and target from an edge group id such as `L-Cart-Pay-0`.
pub fn edge_from_group_id(group_id: &str) -> Option<(&str, &str)> {
    let mut parts = group_id.split('-');
    parts.next()?;
    let source = parts.next()?;
    let target = parts.next()?;
    Some((source, target))
}
