//! Trait definitions for the SCP archive.
//!
//! This crate defines the [`DocumentStore`] seam: the point lookups,
//! set-style array updates and skip/limit scans the reference-consistency
//! protocol is written against.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod store;

pub use store::DocumentStore;
