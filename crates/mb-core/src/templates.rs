//! Starter content: the default board and the template gallery.

use serde::Serialize;

/// Buffer shown on first launch: one block of each common kind.
pub const DEFAULT_SOURCE: &str = "graph LR
    A[User] --> B{Login}
    B -- success --> C[Dashboard]
    B -- failure --> D[Retry]

sequenceDiagram
    participant U as User
    participant S as Server
    U->>S: Request Data
    S-->>U: JSON Response

mindmap
  root((Roadmap))
    Frontend
      React
      Mermaid
    Backend
      Node.js
      Assistant API";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Template {
    pub id: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
    pub code: &'static str,
}

pub const TEMPLATES: &[Template] = &[
    Template {
        id: "multiview",
        name: "Multi-View",
        icon: "🍱",
        code: DEFAULT_SOURCE,
    },
    Template {
        id: "flowchart",
        name: "Flowchart",
        icon: "📊",
        code: "graph TD\n    Start --> Stop",
    },
    Template {
        id: "sequence",
        name: "Sequence",
        icon: "🔄",
        code: "sequenceDiagram\n    Alice->>Bob: Hello Bob, how are you?\n    Bob-->>Alice: Jolly good!",
    },
    Template {
        id: "gantt",
        name: "Gantt Chart",
        icon: "📅",
        code: "gantt\n    title A Gantt Diagram\n    dateFormat  YYYY-MM-DD\n    section Section\n    A task           :a1, 2014-01-01, 30d\n    Another task     :after a1  , 20d",
    },
    Template {
        id: "class",
        name: "Class Diagram",
        icon: "🏗️",
        code: "classDiagram\n    Animal <|-- Duck\n    Animal <|-- Fish\n    Animal : +int age\n    Animal: +isMammal()",
    },
    Template {
        id: "state",
        name: "State Diagram",
        icon: "⚙️",
        code: "stateDiagram-v2\n    [*] --> Still\n    Still --> [*]\n    Still --> Moving\n    Moving --> Still\n    Moving --> Crash\n    Crash --> [*]",
    },
    Template {
        id: "er",
        name: "ER Diagram",
        icon: "🔗",
        code: "erDiagram\n    CUSTOMER ||--o{ ORDER : places\n    ORDER ||--|{ LINE-ITEM : contains",
    },
    Template {
        id: "mindmap",
        name: "Mind Map",
        icon: "🧠",
        code: "mindmap\n  root((mindmap))\n    Origins\n      Long history\n      Popularisation",
    },
];

/// Look up a template by id.
pub fn template(id: &str) -> Option<&'static Template> {
    TEMPLATES.iter().find(|t| t.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::{SegmentMode, segment};

    #[test]
    fn default_source_has_three_blocks() {
        let blocks = segment(DEFAULT_SOURCE, SegmentMode::StatementStart);
        assert_eq!(blocks.len(), 3);
    }

    #[test]
    fn every_template_is_a_single_block_except_multiview() {
        for t in TEMPLATES {
            let count = segment(t.code, SegmentMode::StatementStart).len();
            let expected = if t.id == "multiview" { 3 } else { 1 };
            assert_eq!(count, expected, "template {}", t.id);
        }
    }

    #[test]
    fn lookup_by_id() {
        assert_eq!(template("gantt").map(|t| t.name), Some("Gantt Chart"));
        assert!(template("nope").is_none());
    }
}
