//! Error types for template parsing and rendering.

use thiserror::Error;

/// Errors raised while parsing a template. A parse error aborts the whole
/// parse; there is no recovery mode.
#[derive(Debug, Error)]
pub enum ParseError {
    /// A tag opened with `start` but its `end` marker never appeared.
    #[error("unterminated tag: `{start}` has no matching `{end}`")]
    Unterminated {
        start: &'static str,
        end: &'static str,
    },

    /// The branch structure of an if tag could not be scanned.
    #[error("malformed if tag: {reason}")]
    MalformedIf { reason: String },

    /// A for tag without the ` in ` separating variable and collection.
    #[error("malformed for tag: missing ` in ` between the loop variable and the collection")]
    ForMissingIn,

    /// A for tag whose header could not be split into variable and path.
    #[error("malformed for tag: {reason}")]
    MalformedFor { reason: String },

    /// Expressions do not support `|` filters.
    #[error("filters are not supported: `{expr}`")]
    FilterNotSupported { expr: String },

    /// Registering token kinds with the manager failed.
    #[error(transparent)]
    Registry(#[from] stencil_pool::PoolError),
}

/// Errors raised while rendering a parsed template.
///
/// Property-lookup misses are deliberately not here: a missing value
/// renders as empty text and conditions over it are simply false.
#[derive(Debug, Error)]
pub enum RenderError {
    /// A property path with a broken bracket segment.
    #[error("malformed property path: `{path}`")]
    MalformedPath { path: String },

    /// A loop binding would overwrite an existing entry in the data root.
    #[error("loop binding `{name}` collides with an existing entry")]
    NameCollision { name: String },

    /// Loop bindings need a map at the data root to attach to.
    #[error("cannot bind loop variables: the data root is not a map")]
    BindRootNotMap,
}
