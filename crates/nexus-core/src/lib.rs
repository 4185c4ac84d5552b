//! nexus-core: Shared types, configuration, and error handling for the Nexus graph API.
//!
//! This crate provides the foundations used by the adapter and the HTTP facade:
//! - Node identity, labels, and the records returned by graph reads
//! - The `GraphStore` trait every backend implements
//! - Grouping of relationship rows into the per-node view
//! - Configuration loading
//! - The common error type

pub mod config;
pub mod error;
pub mod group;
pub mod store;
pub mod types;

pub use config::NexusConfig;
pub use error::{NexusError, Result};
pub use store::GraphStore;
pub use types::{
    CreatedNode, Direction, Label, LabelAllowList, LinkPolicy, Neighbor, NewNode, NewRelation,
    NodeKey, NodeRecord, NodeRelation, NodeSummary, NodeWithRelations, Properties,
    RelationRecord, RELATION_TYPE,
};
