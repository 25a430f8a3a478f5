use std::io;

use thiserror::Error;

/// Failures raised while rendering an item or rewriting rendered HTML.
#[derive(Debug, Error)]
pub enum Error {
    /// The item XML could not be parsed.
    #[error("failed to parse item XML: {0}")]
    Parse(#[from] roxmltree::Error),
    /// The item has no item body to render.
    #[error("item is missing its item body")]
    MissingItemBody,
    #[error("item is missing its identifier")]
    MissingIdentifier,
    /// The item parsed, but belongs to a different identifier than requested.
    #[error("item identifier mismatch: expected `{expected}`, found `{found}`")]
    IdentifierMismatch { expected: String, found: String },
    /// The streaming HTML rewriter failed.
    #[error("failed to rewrite HTML: {0}")]
    Rewrite(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
