use thiserror::Error;

use crate::types::NodeKey;

/// Top-level error type for the Nexus graph API.
#[derive(Error, Debug)]
pub enum NexusError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Graph database unavailable: {0}")]
    Unavailable(String),

    #[error("Node not found: {0}")]
    NotFound(NodeKey),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("A node with id {0} already exists")]
    DuplicateId(NodeKey),

    #[error("Relationship targets not found: {}", join_keys(.0))]
    UnresolvedTargets(Vec<NodeKey>),

    #[error("Graph error: {0}")]
    Graph(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, NexusError>;

fn join_keys(keys: &[NodeKey]) -> String {
    keys.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<::config::ConfigError> for NexusError {
    fn from(e: ::config::ConfigError) -> Self {
        Self::Config(e.to_string())
    }
}
