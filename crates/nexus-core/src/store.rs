//! The storage seam between the HTTP facade and a graph backend.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{
    CreatedNode, LinkPolicy, NewNode, NodeKey, NodeRelation, NodeSummary, NodeWithRelations,
};

/// Read and write operations the facade needs from a graph backend.
///
/// Implementations own their connection lifecycle; every call acquires
/// whatever session it needs and releases it before returning.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Every node with its primary label.
    async fn list_nodes(&self) -> Result<Vec<NodeSummary>>;

    /// Whether any node carries the given `id`.
    async fn node_exists(&self, id: &NodeKey) -> Result<bool>;

    /// One triple per relationship touching the node, in either direction.
    ///
    /// Empty both for an isolated node and for an absent one; pair with
    /// [`GraphStore::node_exists`] to tell them apart.
    async fn node_relations(&self, id: &NodeKey) -> Result<Vec<NodeRelation>>;

    /// Every node with all of its incident relationships, isolated nodes included.
    async fn list_nodes_with_relations(&self) -> Result<Vec<NodeWithRelations>>;

    /// Create a node and its outgoing relationships atomically.
    async fn create_node(&self, node: &NewNode, policy: LinkPolicy) -> Result<CreatedNode>;

    /// Detach-delete the node with the given `id`. Returns how many nodes were removed.
    async fn delete_node(&self, id: &NodeKey) -> Result<u64>;
}
