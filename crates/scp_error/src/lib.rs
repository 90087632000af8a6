//! Error types for the SCP archive.
//!
//! This crate provides the error types shared by every crate in the workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use scp_error::{ReferenceError, ReferenceErrorKind, ScpArchiveResult};
//!
//! fn lookup(scp_id: &str) -> ScpArchiveResult<()> {
//!     Err(ReferenceError::new(ReferenceErrorKind::ScpNotFound(scp_id.to_string())))?
//! }
//!
//! match lookup("SCP-173") {
//!     Ok(()) => println!("found"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod database;
mod error;
mod reference;
mod server;
mod validation;

pub use config::ConfigError;
pub use database::{DatabaseError, DatabaseErrorKind};
pub use error::{ScpArchiveError, ScpArchiveErrorKind, ScpArchiveResult};
pub use reference::{ReferenceError, ReferenceErrorKind};
pub use server::{ServerError, ServerErrorKind};
pub use validation::ValidationError;
