//! Read operations for the graph.
//!
//! Every read runs on a pooled connection that is returned to the pool once
//! its row stream has been drained.

use neo4rs::query;

use nexus_core::group::{group_by_node, with_isolated};
use nexus_core::{NodeKey, NodeRelation, NodeSummary, NodeWithRelations};

use crate::client::{GraphClient, GraphError};
use crate::convert::{key_param, node_to_record, relation_to_record, row_count, row_to_summary};

impl GraphClient {
    // ── Node Listing ─────────────────────────────────────────────

    /// List every node with its caller-supplied id and primary label.
    ///
    /// The primary label is whichever label the engine reports first.
    pub async fn all_nodes(&self) -> Result<Vec<NodeSummary>, GraphError> {
        let q = query("MATCH (n) RETURN n.id AS id, labels(n) AS labels");

        let rows = self.query_rows(q).await?;
        rows.iter().map(row_to_summary).collect()
    }

    /// Whether at least one node carries the given id.
    pub async fn has_node(&self, id: &NodeKey) -> Result<bool, GraphError> {
        let q = query("MATCH (n {id: $id}) RETURN count(n) AS cnt").param("id", key_param(id));

        match self.query_one(q).await? {
            Some(row) => Ok(row_count(&row, "cnt")? > 0),
            None => Ok(false),
        }
    }

    // ── Neighbor Queries ─────────────────────────────────────────

    /// Every relationship touching the node, in either direction.
    pub async fn relations_of(&self, id: &NodeKey) -> Result<Vec<NodeRelation>, GraphError> {
        let q = query(
            "MATCH (n {id: $id})-[r]-(m)
             RETURN n, r, m",
        )
        .param("id", key_param(id));

        let rows = self.query_rows(q).await?;
        rows.iter().map(row_to_relation).collect()
    }

    /// Every node with its incident relationships.
    ///
    /// Relationships are matched undirected, so an edge shows up under both
    /// of its endpoints. Nodes without relationships follow with an empty list.
    pub async fn all_nodes_with_relations(&self) -> Result<Vec<NodeWithRelations>, GraphError> {
        let rows = self
            .query_rows(query("MATCH (n)-[r]-(m) RETURN n, r, m"))
            .await?;
        let triples = rows
            .iter()
            .map(row_to_relation)
            .collect::<Result<Vec<_>, _>>()?;

        let isolated_rows = self
            .query_rows(query("MATCH (n) WHERE NOT (n)--() RETURN n"))
            .await?;
        let mut isolated = Vec::with_capacity(isolated_rows.len());
        for row in isolated_rows {
            let node: neo4rs::Node = row.get("n").map_err(|e| {
                GraphError::Serialization(format!("Failed to deserialize node: {e}"))
            })?;
            isolated.push(node_to_record(&node)?);
        }

        let grouped = with_isolated(group_by_node(triples), isolated);
        tracing::debug!(nodes = grouped.len(), "Fetched nodes with relations");
        Ok(grouped)
    }
}

/// Map an `n, r, m` row into a triple anchored at `n`.
fn row_to_relation(row: &neo4rs::Row) -> Result<NodeRelation, GraphError> {
    let node: neo4rs::Node = row
        .get("n")
        .map_err(|e| GraphError::Serialization(format!("Failed to deserialize node: {e}")))?;
    let rel: neo4rs::Relation = row
        .get("r")
        .map_err(|e| GraphError::Serialization(format!("Failed to get relation: {e}")))?;
    let target: neo4rs::Node = row.get("m").map_err(|e| {
        GraphError::Serialization(format!("Failed to deserialize target node: {e}"))
    })?;

    Ok(NodeRelation {
        relation: relation_to_record(&rel, node.id())?,
        node: node_to_record(&node)?,
        target: node_to_record(&target)?,
    })
}
