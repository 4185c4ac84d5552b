//! Write operations for the graph.
//!
//! Every mutation runs in an explicit transaction. A failed step rolls the
//! whole transaction back; nothing is committed partially.

use neo4rs::{query, Query, Txn};

use nexus_core::{CreatedNode, Label, LinkPolicy, NewNode, NodeKey, RELATION_TYPE};

use crate::client::{GraphClient, GraphError};
use crate::convert::{key_param, properties_param, row_count};

impl GraphClient {
    // ── Node Creation ────────────────────────────────────────────

    /// Create a node and its outgoing relationships in one transaction.
    ///
    /// Each relationship targets the existing node whose `id` equals its
    /// `target_id`. Targets that match nothing are rejected under
    /// [`LinkPolicy::FailFast`] and skipped under [`LinkPolicy::BestEffort`].
    pub async fn create_node_with_relations(
        &self,
        node: &NewNode,
        policy: LinkPolicy,
    ) -> Result<CreatedNode, GraphError> {
        let mut txn = self.start_txn().await?;
        let outcome = write_node(&mut txn, node, policy).await;
        let created = finish(txn, outcome).await?;

        tracing::info!(
            label = %node.label(),
            id = %node.id(),
            relationships = created.relationships_created,
            skipped = created.skipped_targets.len(),
            "Node created"
        );
        Ok(created)
    }

    // ── Node Deletion ────────────────────────────────────────────

    /// Detach-delete every node carrying the id, with all incident relationships.
    /// Returns the count of deleted nodes; zero when nothing matched.
    pub async fn detach_delete_node(&self, id: &NodeKey) -> Result<u64, GraphError> {
        let q = query(
            "MATCH (n {id: $id})
             DETACH DELETE n
             RETURN count(n) AS cnt",
        )
        .param("id", key_param(id));

        let mut txn = self.start_txn().await?;
        let outcome = fetch_count(&mut txn, q, "cnt").await;
        let deleted = finish(txn, outcome).await?;

        tracing::info!(id = %id, deleted, "Node deleted");
        Ok(deleted.max(0) as u64)
    }

    // ── Schema ───────────────────────────────────────────────────

    /// Install a uniqueness constraint on `id` for each label. Idempotent.
    pub async fn ensure_constraints(&self, labels: &[Label]) -> Result<(), GraphError> {
        for label in labels {
            let cypher = format!(
                "CREATE CONSTRAINT {} IF NOT EXISTS
                 FOR (n:{}) REQUIRE n.id IS UNIQUE",
                constraint_name(label),
                label.cypher()
            );
            self.run(query(&cypher)).await?;
        }
        tracing::info!(labels = labels.len(), "Uniqueness constraints ensured");
        Ok(())
    }
}

/// Constraint names are case-sensitive, so labels differing only in case
/// get distinct constraints.
fn constraint_name(label: &Label) -> String {
    format!("`nexus_{}_id_unique`", label.as_str())
}

/// Transaction body for node creation.
async fn write_node(
    txn: &mut Txn,
    node: &NewNode,
    policy: LinkPolicy,
) -> Result<CreatedNode, GraphError> {
    let id = key_param(node.id());

    let existing = fetch_count(
        txn,
        query("MATCH (n {id: $id}) RETURN count(n) AS cnt").param("id", id.clone()),
        "cnt",
    )
    .await?;
    if existing > 0 {
        return Err(GraphError::DuplicateId(node.id().clone()));
    }

    let label = node.label().cypher();
    txn.run(
        query(&format!("CREATE (n:{label} $props)"))
            .param("props", properties_param(node.properties())?),
    )
    .await?;

    let link = format!(
        "MATCH (n:{label} {{id: $id}})
         MATCH (m {{id: $target_id}})
         CREATE (n)-[r:{RELATION_TYPE}]->(m)
         SET r = $props
         RETURN count(r) AS created"
    );

    let mut relationships_created = 0;
    let mut skipped_targets = Vec::new();
    for rel in node.relationships() {
        let q = query(&link)
            .param("id", id.clone())
            .param("target_id", key_param(&rel.target_id))
            .param("props", properties_param(&rel.properties)?);

        match fetch_count(txn, q, "created").await? {
            0 => skipped_targets.push(rel.target_id.clone()),
            n => relationships_created += n as usize,
        }
    }

    if policy == LinkPolicy::FailFast && !skipped_targets.is_empty() {
        return Err(GraphError::UnresolvedTargets(skipped_targets));
    }

    Ok(CreatedNode {
        id: node.id().clone(),
        relationships_created,
        skipped_targets,
    })
}

/// Run a query inside the transaction and read one integer column from its single row.
async fn fetch_count(txn: &mut Txn, q: Query, column: &str) -> Result<i64, GraphError> {
    let mut stream = txn.execute(q).await?;
    let mut count = 0;
    while let Some(row) = stream.next(txn.handle()).await? {
        count = row_count(&row, column)?;
    }
    Ok(count)
}

/// Commit on success, roll back on failure.
async fn finish<T>(txn: Txn, outcome: Result<T, GraphError>) -> Result<T, GraphError> {
    match outcome {
        Ok(value) => {
            txn.commit().await?;
            Ok(value)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Rolling back transaction");
            if let Err(rollback_err) = txn.rollback().await {
                tracing::error!(error = %rollback_err, "Transaction rollback failed");
            }
            Err(e)
        }
    }
}
