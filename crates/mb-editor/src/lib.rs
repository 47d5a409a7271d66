pub mod context;
pub mod debounce;
pub mod history;
pub mod input;
pub mod session;
pub mod store;
pub mod viewport;

pub use context::ContextTarget;
pub use history::HistoryLog;
pub use input::{InputEvent, PointerButton};
pub use session::{BlockRenderer, EditSession, RenderRequest, RenderStatus};
pub use store::{DiagramLibrary, KeyValueStore, MemoryStore, SavedDiagram, StoreError};
pub use viewport::{InteractionMode, ViewportController};
