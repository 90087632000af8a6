//! Payload validation error types.

/// A request field failed validation.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Validation Error: field '{}' {} at line {} in {}", field, reason, line, file)]
pub struct ValidationError {
    /// Name of the offending field
    pub field: String,
    /// Why the value was rejected
    pub reason: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl ValidationError {
    /// Create a new ValidationError at the current location.
    ///
    /// # Examples
    ///
    /// ```
    /// use scp_error::ValidationError;
    ///
    /// let err = ValidationError::new("scp_id", "must not be blank");
    /// assert_eq!(err.field, "scp_id");
    /// ```
    #[track_caller]
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            field: field.into(),
            reason: reason.into(),
            line: location.line(),
            file: location.file(),
        }
    }
}
