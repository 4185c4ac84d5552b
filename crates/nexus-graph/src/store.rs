//! `GraphStore` backed by Neo4j.

use async_trait::async_trait;

use nexus_core::{
    CreatedNode, GraphStore, LinkPolicy, NewNode, NodeKey, NodeRelation, NodeSummary,
    NodeWithRelations, Result,
};

use crate::client::GraphClient;

#[async_trait]
impl GraphStore for GraphClient {
    async fn list_nodes(&self) -> Result<Vec<NodeSummary>> {
        Ok(self.all_nodes().await?)
    }

    async fn node_exists(&self, id: &NodeKey) -> Result<bool> {
        Ok(self.has_node(id).await?)
    }

    async fn node_relations(&self, id: &NodeKey) -> Result<Vec<NodeRelation>> {
        Ok(self.relations_of(id).await?)
    }

    async fn list_nodes_with_relations(&self) -> Result<Vec<NodeWithRelations>> {
        Ok(self.all_nodes_with_relations().await?)
    }

    async fn create_node(&self, node: &NewNode, policy: LinkPolicy) -> Result<CreatedNode> {
        Ok(self.create_node_with_relations(node, policy).await?)
    }

    async fn delete_node(&self, id: &NodeKey) -> Result<u64> {
        Ok(self.detach_delete_node(id).await?)
    }
}
