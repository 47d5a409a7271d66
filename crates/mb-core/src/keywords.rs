//! Diagram-type keyword vocabulary.
//!
//! A block begins wherever one of these keywords is recognised. Matching is
//! ASCII case-insensitive and respects ASCII word boundaries, so `gitGraph`
//! never splits at its inner `Graph`.

use serde::{Deserialize, Serialize};

/// The diagram type announced by a block's leading keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DiagramKind {
    Graph,
    Flowchart,
    Sequence,
    Class,
    State,
    Er,
    Gantt,
    Mindmap,
    Pie,
    GitGraph,
    Quadrant,
    C4Context,
    Timeline,
    ZenUml,
    Architecture,
}

impl DiagramKind {
    /// Every kind, in the order keywords are tried.
    pub const ALL: [DiagramKind; 15] = [
        DiagramKind::Graph,
        DiagramKind::Flowchart,
        DiagramKind::Sequence,
        DiagramKind::Class,
        DiagramKind::State,
        DiagramKind::Er,
        DiagramKind::Gantt,
        DiagramKind::Mindmap,
        DiagramKind::Pie,
        DiagramKind::GitGraph,
        DiagramKind::Quadrant,
        DiagramKind::C4Context,
        DiagramKind::Timeline,
        DiagramKind::ZenUml,
        DiagramKind::Architecture,
    ];

    pub fn keyword(self) -> &'static str {
        match self {
            DiagramKind::Graph => "graph",
            DiagramKind::Flowchart => "flowchart",
            DiagramKind::Sequence => "sequenceDiagram",
            DiagramKind::Class => "classDiagram",
            DiagramKind::State => "stateDiagram-v2",
            DiagramKind::Er => "erDiagram",
            DiagramKind::Gantt => "gantt",
            DiagramKind::Mindmap => "mindmap",
            DiagramKind::Pie => "pie",
            DiagramKind::GitGraph => "gitGraph",
            DiagramKind::Quadrant => "quadrantChart",
            DiagramKind::C4Context => "c4Context",
            DiagramKind::Timeline => "timeline",
            DiagramKind::ZenUml => "zenuml",
            DiagramKind::Architecture => "architecture",
        }
    }

    /// Kind whose keyword is a case-insensitive prefix of `text`.
    ///
    /// No trailing boundary is required here: this is the filter applied to
    /// already-split parts, not the split detector.
    pub fn detect(text: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| starts_with_caseless(text, kind.keyword()))
    }

    /// Kind whose keyword starts `text` and is followed by a word boundary.
    pub fn at(text: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| {
            let kw = kind.keyword();
            starts_with_caseless(text, kw)
                && text[kw.len()..]
                    .chars()
                    .next()
                    .is_none_or(|c| !is_word_char(c))
        })
    }

    /// Whether the right-click authoring menu applies to this kind.
    pub fn supports_authoring(self) -> bool {
        matches!(self, DiagramKind::Graph | DiagramKind::Flowchart)
    }
}

/// ASCII word character, as matched by `\w` without Unicode.
pub fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn starts_with_caseless(text: &str, prefix: &str) -> bool {
    text.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}
