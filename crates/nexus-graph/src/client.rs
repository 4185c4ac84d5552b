//! Neo4j connection management and shared graph client.

use neo4rs::{query, ConfigBuilder, Graph, Query, Txn};

use nexus_core::config::Neo4jSettings;
use nexus_core::{NexusError, NodeKey};

/// Errors from graph operations.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("Neo4j connection error: {0}")]
    Connection(String),

    #[error("Neo4j query error: {0}")]
    Query(#[from] neo4rs::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("A node with id {0} already exists")]
    DuplicateId(NodeKey),

    #[error("Relationship targets not found: {0:?}")]
    UnresolvedTargets(Vec<NodeKey>),
}

impl From<GraphError> for NexusError {
    fn from(e: GraphError) -> Self {
        match e {
            GraphError::Connection(msg) => NexusError::Unavailable(msg),
            GraphError::Query(e) => NexusError::Graph(e.to_string()),
            GraphError::Serialization(msg) => NexusError::Graph(msg),
            GraphError::DuplicateId(id) => NexusError::DuplicateId(id),
            GraphError::UnresolvedTargets(ids) => NexusError::UnresolvedTargets(ids),
        }
    }
}

/// Configuration for connecting to Neo4j.
#[derive(Debug, Clone)]
pub struct GraphConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
    pub max_connections: u32,
    pub fetch_size: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            uri: "bolt://localhost:7687".to_string(),
            user: "neo4j".to_string(),
            password: "nexus-dev".to_string(),
            max_connections: 16,
            fetch_size: 256,
        }
    }
}

impl From<&Neo4jSettings> for GraphConfig {
    fn from(settings: &Neo4jSettings) -> Self {
        Self {
            uri: settings.uri.clone(),
            user: settings.user.clone(),
            password: settings.password.clone(),
            max_connections: settings.max_connections,
            fetch_size: settings.fetch_size,
        }
    }
}

/// Thread-safe Neo4j graph client with connection pooling.
///
/// Constructed once at startup and handed to request handlers.
/// Clone is cheap (inner Arc).
#[derive(Clone)]
pub struct GraphClient {
    graph: Graph,
}

impl GraphClient {
    /// Connect to Neo4j with the given configuration.
    pub async fn connect(config: &GraphConfig) -> Result<Self, GraphError> {
        let neo_config = ConfigBuilder::default()
            .uri(&config.uri)
            .user(&config.user)
            .password(&config.password)
            .max_connections(config.max_connections as usize)
            .fetch_size(config.fetch_size)
            .build()
            .map_err(|e| GraphError::Connection(e.to_string()))?;

        let graph = Graph::connect(neo_config)
            .await
            .map_err(|e| GraphError::Connection(e.to_string()))?;

        tracing::info!(uri = %config.uri, "Connected to Neo4j");
        Ok(Self { graph })
    }

    /// Round-trip a trivial query to prove the database answers.
    pub async fn ping(&self) -> Result<(), GraphError> {
        let row = self
            .query_one(query("RETURN 1 AS ok"))
            .await
            .map_err(|e| GraphError::Connection(e.to_string()))?;

        match row.and_then(|r| r.get::<i64>("ok").ok()) {
            Some(1) => Ok(()),
            _ => Err(GraphError::Connection(
                "Neo4j did not answer the connectivity check".to_string(),
            )),
        }
    }

    /// Execute a write-only query (CREATE, MERGE, DELETE, SET).
    pub async fn run(&self, query: Query) -> Result<(), GraphError> {
        self.graph.run(query).await?;
        Ok(())
    }

    /// Execute a read query and collect all rows.
    pub async fn query_rows(&self, query: Query) -> Result<Vec<neo4rs::Row>, GraphError> {
        let mut stream = self.graph.execute(query).await?;
        let mut rows = Vec::new();
        while let Some(row) = stream.next().await? {
            rows.push(row);
        }
        Ok(rows)
    }

    /// Execute a read query and return the first row, if any.
    pub async fn query_one(&self, query: Query) -> Result<Option<neo4rs::Row>, GraphError> {
        let mut stream = self.graph.execute(query).await?;
        Ok(stream.next().await?)
    }

    /// Begin a transaction.
    pub async fn start_txn(&self) -> Result<Txn, GraphError> {
        Ok(self.graph.start_txn().await?)
    }
}
