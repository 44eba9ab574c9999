//! Common error type definitions.

use strum::{AsRefStr, IntoStaticStr};
use thiserror::Error as ThisError;

/// Type alias for boxed dynamic errors that can be sent across threads.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Type alias for Results with our custom Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Categories of errors surfaced by blob-store operations.
///
/// The variants mirror the faults a network-backed object store reports
/// over HTTP; [`Error::status_code`] gives the canonical mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// Referenced container does not exist.
    ContainerNotFound,
    /// Referenced blob does not exist within an existing container.
    KeyNotFound,
    /// Conditional predicate mismatch (If-Match / If-Unmodified-Since).
    PreconditionFailed,
    /// The cached copy is still valid (If-None-Match / If-Modified-Since).
    NotModified,
    /// Malformed input, e.g. an unparseable range specifier.
    InvalidArgument,
    /// A bounded wait (pool acquisition, retry loop) timed out.
    ResourceExhausted,
    /// Unknown error occurred.
    Unknown,
}

/// A structured error type for blob-store operations.
#[derive(Debug, ThisError)]
#[error("{kind:?}{}", message.as_ref().map(|m| format!(": {}", m)).unwrap_or_default())]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional error message.
    pub message: Option<String>,
    /// Optional source error.
    #[source]
    pub source: Option<BoxedError>,
}

impl Error {
    /// Creates a new error with the given kind.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            source: None,
        }
    }

    /// Adds a message to this error.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Adds a source error to this error.
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Creates a new container-not-found error for `name`.
    pub fn container_not_found(name: impl AsRef<str>) -> Self {
        Self::new(ErrorKind::ContainerNotFound).with_message(name.as_ref())
    }

    /// Creates a new key-not-found error for `key` in `container`.
    pub fn key_not_found(container: impl AsRef<str>, key: impl AsRef<str>) -> Self {
        Self::new(ErrorKind::KeyNotFound)
            .with_message(format!("{} in {}", key.as_ref(), container.as_ref()))
    }

    /// Creates a new precondition-failed error.
    pub fn precondition_failed() -> Self {
        Self::new(ErrorKind::PreconditionFailed)
    }

    /// Creates a new not-modified error.
    pub fn not_modified() -> Self {
        Self::new(ErrorKind::NotModified)
    }

    /// Creates a new invalid-argument error.
    pub fn invalid_argument() -> Self {
        Self::new(ErrorKind::InvalidArgument)
    }

    /// Creates a new resource-exhausted error.
    pub fn resource_exhausted() -> Self {
        Self::new(ErrorKind::ResourceExhausted)
    }

    /// Creates a new unknown error.
    pub fn unknown() -> Self {
        Self::new(ErrorKind::Unknown)
    }

    /// Returns the error kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the error kind as a string.
    pub fn kind_str(&self) -> &'static str {
        self.kind.into()
    }

    /// Returns `true` for the not-found family of errors.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::ContainerNotFound | ErrorKind::KeyNotFound
        )
    }

    /// HTTP status code a network-backed store would report for this error.
    pub fn status_code(&self) -> u16 {
        match self.kind {
            ErrorKind::ContainerNotFound | ErrorKind::KeyNotFound => 404,
            ErrorKind::PreconditionFailed => 412,
            ErrorKind::NotModified => 304,
            ErrorKind::InvalidArgument => 400,
            ErrorKind::ResourceExhausted => 429,
            ErrorKind::Unknown => 500,
        }
    }
}
