//! Configuration management for Nexus services.
//!
//! Configuration is loaded from (in priority order):
//! 1. Environment variables (`NEXUS__` prefix, `__` between nested keys,
//!    e.g. `NEXUS__NEO4J__PASSWORD`)
//! 2. Config file (`nexus.toml` by default)
//! 3. Defaults
//!
//! Database credentials and the API token have no defaults; startup fails
//! when any of them is missing.

use std::fmt;

use serde::Deserialize;

use crate::error::{NexusError, Result};
use crate::types::{Label, LabelAllowList};

const ENV_PREFIX: &str = "NEXUS";

/// Top-level service configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NexusConfig {
    #[serde(default)]
    pub neo4j: Neo4jSettings,

    #[serde(default)]
    pub auth: AuthSettings,

    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub schema: SchemaSettings,
}

/// Connection settings for the graph database.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct Neo4jSettings {
    pub uri: String,
    pub user: String,
    pub password: String,
    pub max_connections: u32,
    pub fetch_size: usize,
}

impl Default for Neo4jSettings {
    fn default() -> Self {
        Self {
            uri: "bolt://localhost:7687".to_string(),
            user: String::new(),
            password: String::new(),
            max_connections: 16,
            fetch_size: 256,
        }
    }
}

impl fmt::Debug for Neo4jSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Neo4jSettings")
            .field("uri", &self.uri)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("max_connections", &self.max_connections)
            .field("fetch_size", &self.fetch_size)
            .finish()
    }
}

/// Shared-secret bearer token guarding mutating routes.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    pub token: String,
}

impl fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSettings")
            .field("token", &"<redacted>")
            .finish()
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Socket address to bind (default: "0.0.0.0:8000").
    pub bind: String,

    /// Origins allowed by CORS, with credentials.
    pub cors_origins: Vec<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8000".to_string(),
            cors_origins: vec!["http://localhost:3000".to_string()],
        }
    }
}

/// Which node labels may be written, and how node ids are protected.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SchemaSettings {
    pub labels: Vec<String>,

    /// Install a uniqueness constraint on `id` for every allowed label at startup.
    pub enforce_unique_ids: bool,
}

impl Default for SchemaSettings {
    fn default() -> Self {
        Self {
            labels: vec!["User".to_string(), "Post".to_string()],
            enforce_unique_ids: true,
        }
    }
}

impl SchemaSettings {
    pub fn allow_list(&self) -> Result<LabelAllowList> {
        let labels = self
            .labels
            .iter()
            .map(|raw| {
                Label::new(raw).map_err(|e| NexusError::Config(format!("schema.labels: {e}")))
            })
            .collect::<Result<Vec<_>>>()?;
        LabelAllowList::new(labels)
    }
}

impl NexusConfig {
    /// Load from `<file_prefix>.toml` (optional) and `NEXUS__*` environment variables.
    pub fn load(file_prefix: &str) -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::File::with_name(file_prefix).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("schema.labels")
                    .with_list_parse_key("server.cors_origins")
                    .try_parsing(true),
            )
            .build()?;

        Self::from_config(cfg)
    }

    /// Deserialize and validate an already-built configuration.
    pub fn from_config(cfg: config::Config) -> Result<Self> {
        let parsed: Self = cfg.try_deserialize()?;
        parsed.validate()?;
        tracing::debug!(config = ?parsed, "Configuration loaded");
        Ok(parsed)
    }

    /// Reject configurations the service cannot start with.
    pub fn validate(&self) -> Result<()> {
        let missing: Vec<&str> = [
            ("neo4j.user", self.neo4j.user.as_str()),
            ("neo4j.password", self.neo4j.password.as_str()),
            ("auth.token", self.auth.token.as_str()),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(key, _)| key)
        .collect();

        if !missing.is_empty() {
            return Err(NexusError::Config(format!(
                "missing required settings: {} (set them in the config file or as {ENV_PREFIX}__SECTION__KEY)",
                missing.join(", ")
            )));
        }

        if self.neo4j.max_connections == 0 {
            return Err(NexusError::Config(
                "neo4j.max_connections must be at least 1".to_string(),
            ));
        }

        self.schema.allow_list()?;
        Ok(())
    }
}
