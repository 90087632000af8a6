//! Configuration error types.

use std::fmt;

/// Configuration error, naming the offending setting when there is one.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Error)]
pub struct ConfigError {
    /// Setting key the error is about, e.g. `max_page_size`
    pub setting: Option<String>,
    /// Error message
    pub message: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl ConfigError {
    /// Create an error about the configuration as a whole, such as an
    /// unreadable file.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            setting: None,
            message: message.into(),
            line: location.line(),
            file: location.file(),
        }
    }

    /// Create an error about one setting.
    ///
    /// # Examples
    ///
    /// ```
    /// use scp_error::ConfigError;
    ///
    /// let err = ConfigError::for_setting("pool_size", "must be at least 1");
    /// assert_eq!(err.setting.as_deref(), Some("pool_size"));
    /// assert!(err.to_string().contains("pool_size must be at least 1"));
    /// ```
    #[track_caller]
    pub fn for_setting(setting: impl Into<String>, message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            setting: Some(setting.into()),
            message: message.into(),
            line: location.line(),
            file: location.file(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Configuration Error: ")?;
        if let Some(setting) = &self.setting {
            write!(f, "{} ", setting)?;
        }
        write!(f, "{} at line {} in {}", self.message, self.line, self.file)
    }
}
