use thiserror::Error;

/// Why a markup mutation left the buffer untouched.
///
/// Mutations are best-effort textual patches; callers treat every variant
/// as a no-op and keep the buffer as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MutateError {
    #[error("no source node: neither a clicked node nor a typed name was given")]
    NoSource,
    #[error("target node name is empty")]
    EmptyTarget,
    #[error("block {index} does not exist (buffer has {count} blocks)")]
    BlockOutOfRange { index: usize, count: usize },
    #[error("no edge from {from} to {to} found")]
    EdgeNotFound { from: String, to: String },
}

/// A block the external renderer rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("block {index}: {message}")]
pub struct RenderError {
    pub index: usize,
    pub message: String,
}

impl RenderError {
    pub fn new(index: usize, message: impl Into<String>) -> Self {
        Self {
            index,
            message: message.into(),
        }
    }
}
