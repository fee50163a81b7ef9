//! Crate-wide error taxonomy.
//!
//! Every failure carries the offending path or identifier so callers can
//! tell a malformed path apart from a well-formed but unmatched one.
//! Ambiguous matches are not an error; they are a [`Resolution`] variant.
//!
//! [`Resolution`]: crate::resolver::Resolution

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Resolution attempted on a zero-length path.
    #[error("empty path: extend with a country code before resolving")]
    EmptyPath,

    /// A path was extended past the country.region.locality maximum.
    #[error("path '{path}' has {depth} segments (max 3)")]
    PathTooDeep { path: String, depth: usize },

    /// A listing operation was invoked at a path depth it does not support.
    #[error("'{operation}' does not apply to path '{path}': {reason}")]
    InvalidPathForOperation {
        operation: &'static str,
        path: String,
        reason: String,
    },

    /// A structured filter matched zero catalog rows.
    #[error("no catalog match for path '{path}'")]
    NotFound { path: String },

    /// Geometry requested for a path that resolved to nothing.
    #[error("no result found for: {path}")]
    NoResultForPath { path: String },

    /// The catalog row exists but the geometry store has no row for its id.
    #[error("no geometry found for id: {id}")]
    GeometryNotFound { id: String },

    /// The catalog could not be built from its source. Fatal; the session
    /// must not proceed with partial state.
    #[error("failed to initialize catalog from {path}: {message}")]
    Initialization { path: PathBuf, message: String },

    /// Geometry store access or encoding failure.
    #[error("geometry error: {message}")]
    Geometry { message: String },
}
