pub mod assist;
pub mod config;
pub mod error;
pub mod ident;
pub mod key;
pub mod keywords;
pub mod layout;
pub mod measure;
pub mod mutate;
pub mod segment;
pub mod templates;

pub use config::{BoardConfig, Settings};
pub use error::{MutateError, RenderError};
pub use key::BlockKey;
pub use keywords::DiagramKind;
pub use layout::{GridLayout, ViewTransform, fit_to_viewport, pack_grid};
pub use measure::svg_size;
pub use mutate::{AddElement, add_element, relabel_edge, to_markdown, to_portable_blocks};
pub use segment::{Block, SegmentMode, segment};

// Re-export kurbo geometry so downstream crates share one set of types
pub use kurbo::{Affine, Point, Size, Vec2};
