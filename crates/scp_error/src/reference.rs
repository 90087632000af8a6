//! Cross-reference protocol error types.

/// Reasons the reference-consistency protocol refuses a request.
///
/// Every variant is detected before a destructive write, so none of them
/// leaves partially-applied state behind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ReferenceErrorKind {
    /// One or more referenced SCP keys do not exist
    #[display("Referenced SCPs do not exist: {}", _0.join(", "))]
    MissingReferences(Vec<String>),
    /// SCP not found
    #[display("SCP '{}' not found", _0)]
    ScpNotFound(String),
    /// Tale not found
    #[display("Tale '{}' not found", _0)]
    TaleNotFound(String),
    /// Update called with an empty patch
    #[display("No fields provided for update")]
    NoFieldsProvided,
    /// An SCP with this key already exists
    #[display("SCP '{}' already exists", _0)]
    ScpAlreadyExists(String),
    /// SCP deletion blocked because tales still reference it
    #[display("SCP '{}' is still referenced by {} tale(s)", scp_id, tale_count)]
    ScpStillReferenced {
        /// Key of the SCP that was to be deleted
        scp_id: String,
        /// Number of live tales referencing it
        tale_count: usize,
    },
}

/// Cross-reference protocol error with location tracking.
///
/// # Examples
///
/// ```
/// use scp_error::{ReferenceError, ReferenceErrorKind};
///
/// let err = ReferenceError::new(ReferenceErrorKind::MissingReferences(vec!["999".into()]));
/// assert!(format!("{}", err).contains("999"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Reference Error: {} at line {} in {}", kind, line, file)]
pub struct ReferenceError {
    /// The kind of error that occurred
    pub kind: ReferenceErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl ReferenceError {
    /// Create a new reference error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ReferenceErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
