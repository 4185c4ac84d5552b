//! Aggregation of relationship rows into the per-node view.

use std::collections::{HashMap, HashSet};

use crate::types::{Neighbor, NodeRecord, NodeRelation, NodeWithRelations};

/// Group `(node, relation, target)` rows by their anchor node.
///
/// Nodes keep the order in which they were first seen, and each node's
/// relations keep row order. Rows are keyed by engine identity, so two nodes
/// sharing a caller-supplied `id` stay separate.
pub fn group_by_node<I>(rows: I) -> Vec<NodeWithRelations>
where
    I: IntoIterator<Item = NodeRelation>,
{
    let mut index: HashMap<i64, usize> = HashMap::new();
    let mut grouped: Vec<NodeWithRelations> = Vec::new();

    for row in rows {
        let neighbor = Neighbor {
            relation: row.relation,
            target: row.target,
        };
        match index.get(&row.node.internal_id) {
            Some(&pos) => grouped[pos].relations.push(neighbor),
            None => {
                index.insert(row.node.internal_id, grouped.len());
                grouped.push(NodeWithRelations {
                    node: row.node,
                    relations: vec![neighbor],
                });
            }
        }
    }

    grouped
}

/// Append nodes that have no relationships, skipping any already present.
pub fn with_isolated<I>(mut grouped: Vec<NodeWithRelations>, isolated: I) -> Vec<NodeWithRelations>
where
    I: IntoIterator<Item = NodeRecord>,
{
    let mut seen: HashSet<i64> = grouped.iter().map(|e| e.node.internal_id).collect();
    for node in isolated {
        if seen.insert(node.internal_id) {
            grouped.push(NodeWithRelations {
                node,
                relations: Vec::new(),
            });
        }
    }
    grouped
}
