//! Layered server configuration.

use config::{Config, Environment, File, FileFormat};
use scp_core::ScpDeletePolicy;
use scp_error::{ConfigError, ScpArchiveResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, instrument};

/// Bundled defaults, lowest precedence.
const DEFAULT_CONFIG: &str = include_str!("../scp_archive.toml");

/// Prefix for environment overrides, e.g. `SCP_ARCHIVE__POOL_SIZE=16`.
pub const ENV_PREFIX: &str = "SCP_ARCHIVE";

/// Which document store backs the server.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
    derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    /// PostgreSQL through Diesel
    #[default]
    #[display("postgres")]
    Postgres,
    /// Process-local store; contents are lost on exit
    #[display("memory")]
    Memory,
}

/// Server settings.
///
/// Sources, later overriding earlier:
/// 1. Bundled defaults
/// 2. `./scp_archive.toml`, or the file given explicitly (optional)
/// 3. `SCP_ARCHIVE__*` environment variables
///
/// `database_url` falls back to `DATABASE_URL` when no layer sets it.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Serialize,
    Deserialize,
    derive_getters::Getters,
    derive_setters::Setters,
)]
#[setters(prefix = "with_", into)]
pub struct ServerSettings {
    /// Socket address to listen on
    bind_address: String,
    /// Store backend
    store: StoreKind,
    /// PostgreSQL connection string
    #[serde(default)]
    #[setters(strip_option)]
    database_url: Option<String>,
    /// Maximum pooled connections
    pool_size: u32,
    /// Apply embedded migrations on startup
    run_migrations: bool,
    /// Page size when a request gives no `limit`
    default_page_size: u64,
    /// Upper bound on `limit`
    max_page_size: u64,
    /// Behaviour when deleting a referenced SCP
    scp_delete_policy: ScpDeletePolicy,
    /// Fallback filter when `RUST_LOG` is unset
    log_level: String,
    /// Emit JSON log lines
    json_logs: bool,
}

impl ServerSettings {
    /// Load from every layer; `path` replaces the `./scp_archive.toml` lookup.
    ///
    /// The result is not validated, so command-line overrides can still be
    /// applied; call [`validate`](Self::validate) before using it.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a source cannot be read or parsed.
    #[instrument(skip(path), fields(path = ?path))]
    pub fn load(path: Option<&Path>) -> ScpArchiveResult<Self> {
        debug!("Loading server settings");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        builder = match path {
            Some(path) => builder.add_source(File::from(path).required(true)),
            None => builder.add_source(File::with_name("scp_archive").required(false)),
        };

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let mut settings: Self = builder
            .build()
            .map_err(|e| ConfigError::new(format!("Failed to build configuration: {}", e)))?
            .try_deserialize()
            .map_err(|e| ConfigError::new(format!("Failed to parse configuration: {}", e)))?;

        if settings.database_url.is_none() {
            settings.database_url = std::env::var("DATABASE_URL").ok();
        }

        Ok(settings)
    }

    /// Reject settings the server cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pool_size == 0 {
            return Err(ConfigError::for_setting("pool_size", "must be at least 1"));
        }
        if self.default_page_size == 0 {
            return Err(ConfigError::for_setting(
                "default_page_size",
                "must be at least 1",
            ));
        }
        if self.default_page_size > self.max_page_size {
            return Err(ConfigError::for_setting(
                "default_page_size",
                format!(
                    "({}) exceeds max_page_size ({})",
                    self.default_page_size, self.max_page_size
                ),
            ));
        }
        if self.store == StoreKind::Postgres && self.database_url.is_none() {
            return Err(ConfigError::for_setting(
                "database_url",
                "(or DATABASE_URL) is required for the postgres store",
            ));
        }
        Ok(())
    }
}
