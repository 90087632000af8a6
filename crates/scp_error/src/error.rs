//! Top-level error wrapper types.

use crate::{ConfigError, DatabaseError, ReferenceError, ServerError, ValidationError};

/// Every error condition the archive can report.
///
/// # Examples
///
/// ```
/// use scp_error::{ScpArchiveError, ValidationError};
///
/// let err: ScpArchiveError = ValidationError::new("title", "must not be blank").into();
/// assert!(format!("{}", err).contains("title"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum ScpArchiveErrorKind {
    /// Document store failure
    #[from(DatabaseError)]
    Database(DatabaseError),
    /// Cross-reference protocol rejected the request
    #[from(ReferenceError)]
    Reference(ReferenceError),
    /// Request payload failed validation
    #[from(ValidationError)]
    Validation(ValidationError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// HTTP server error
    #[from(ServerError)]
    Server(ServerError),
}

/// SCP archive error with kind discrimination.
///
/// # Examples
///
/// ```
/// use scp_error::{ConfigError, ScpArchiveResult};
///
/// fn might_fail() -> ScpArchiveResult<()> {
///     Err(ConfigError::new("Missing field"))?
/// }
///
/// assert!(might_fail().is_err());
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("SCP Archive Error: {}", _0)]
pub struct ScpArchiveError(Box<ScpArchiveErrorKind>);

impl ScpArchiveError {
    /// Create a new error from a kind.
    pub fn new(kind: ScpArchiveErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &ScpArchiveErrorKind {
        &self.0
    }

    /// Returns the reference error kind, if this is a reference error.
    pub fn reference_kind(&self) -> Option<&crate::ReferenceErrorKind> {
        match self.kind() {
            ScpArchiveErrorKind::Reference(e) => Some(&e.kind),
            _ => None,
        }
    }

    /// True when the error originated in the document store.
    pub fn is_store_error(&self) -> bool {
        matches!(self.kind(), ScpArchiveErrorKind::Database(_))
    }
}

// Generic From implementation for any type that converts to ScpArchiveErrorKind
impl<T> From<T> for ScpArchiveError
where
    T: Into<ScpArchiveErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for SCP archive operations.
pub type ScpArchiveResult<T> = std::result::Result<T, ScpArchiveError>;
