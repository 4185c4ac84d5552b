//! Nexus Graph: Neo4j adapter for the Nexus graph API.
//!
//! This crate is the only place that speaks Cypher. Reads run on pooled
//! sessions, writes run inside explicit transactions that either commit or
//! roll back on every exit path.

pub mod client;
pub mod convert;
pub mod mutations;
pub mod queries;
mod store;

pub use client::{GraphClient, GraphConfig, GraphError};
