//! HTTP API for the SCP archive.
//!
//! Thin axum routes over [`scp_integrity::ReferenceManager`], layered
//! configuration, logging setup and the serve loop used by the
//! `scp-archive` binary.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use scp_database::MemoryStore;
//! use scp_integrity::ReferenceManager;
//! use scp_server::{AppState, PageLimits, router};
//!
//! let manager = ReferenceManager::new(Arc::new(MemoryStore::new()));
//! let app = router(AppState::new(manager, PageLimits::default()));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod observability;
mod routes;
mod server;
mod settings;
mod state;

pub use error::{ApiError, ErrorBody};
pub use observability::init_logging;
pub use routes::{ListParams, router};
pub use server::{run, serve};
pub use settings::{ENV_PREFIX, ServerSettings, StoreKind};
pub use state::{AppState, PageLimits};
