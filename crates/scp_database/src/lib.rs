//! Document stores for the SCP archive.
//!
//! This crate provides the two [`DocumentStore`](scp_interface::DocumentStore)
//! implementations the service can run against.
//!
//! # Features
//!
//! - Diesel-based PostgreSQL store with embedded migrations
//! - Set-style array updates for back-references as single SQL statements
//! - In-memory store with call recording and fault injection for tests
//!
//! # Example
//!
//! ```rust,ignore
//! use scp_database::{establish_pool, run_migrations, PostgresStore};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = establish_pool(&std::env::var("DATABASE_URL")?, 8)?;
//! run_migrations(&pool)?;
//! let store = PostgresStore::new(pool);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod connection;
mod memory;
mod models;
mod postgres;

/// Diesel table definitions.
pub mod schema;

pub use connection::{PgPool, establish_pool, run_migrations};
pub use memory::{MemoryStore, StoreCall, StoreOperation};
pub use postgres::PostgresStore;

use scp_error::DatabaseError;

/// Result type for database operations.
pub type DatabaseResult<T> = Result<T, DatabaseError>;
