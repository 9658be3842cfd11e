use serde_json::{Map, Value};
use thiserror::Error;

/// Errors produced by the arbor render protocol.
///
/// Every error propagates unmodified to the caller; the HTTP boundary is
/// responsible for mapping it to a status code via [`ArborError::status_code`].
#[derive(Error, Debug)]
pub enum ArborError {
    /// The encoded module id or file URL could not be resolved.
    #[error("Invalid module reference: {0}")]
    InvalidReference(String),

    /// The rendering engine produced no element tree for the given input.
    #[error("No function component found at: {input}")]
    EntryNotFound { input: String },

    /// An element tree used a top-level key starting with `_`, which is
    /// reserved for the injected action return value.
    #[error("\"_\" prefix is reserved")]
    ReservedKey,

    /// No server action is registered under the requested id.
    #[error("Server action not found: \"{id}\". {detail}")]
    ActionNotFound { id: String, detail: String },

    /// `rerender` was called outside a POST action scope.
    #[error("Cannot rerender")]
    RerenderNotSupported,

    /// `rerender` was called after the action scope was finalized.
    #[error("Already rendered")]
    AlreadyRendered,

    /// A request could not be interpreted at the protocol boundary.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A network-origin stream failure.
    #[error("Network error requesting {url}: {message}")]
    Network { message: String, url: String },

    /// An upstream-bundler-origin failure. The bundler's own diagnostic
    /// payload is carried verbatim in `extra`.
    #[error("Bundler error from {url}: {message}")]
    BundlerServer {
        message: String,
        url: String,
        extra: Map<String, Value>,
    },

    /// A rendering-origin failure carrying an HTTP-like status code.
    #[error("Render server responded {status} for {url}: {message}")]
    RenderServer {
        message: String,
        url: String,
        status: u16,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ArborError {
    /// Classifies the error for the HTTP boundary.
    ///
    /// `EntryNotFound` is a not-found condition; a `RenderServer` error
    /// carries its origin status; everything else is a server-side failure.
    pub fn status_code(&self) -> u16 {
        match self {
            ArborError::EntryNotFound { .. } => 404,
            ArborError::RenderServer { status, .. } => *status,
            _ => 500,
        }
    }

    /// Whether the error carries a not-found classification.
    pub fn is_not_found(&self) -> bool {
        self.status_code() == 404
    }
}

pub type Result<T> = std::result::Result<T, ArborError>;
