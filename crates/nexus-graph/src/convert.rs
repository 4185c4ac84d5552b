//! Conversion between Bolt values and the JSON shapes used by the API.

use neo4rs::{
    BoltBoolean, BoltFloat, BoltInteger, BoltList, BoltMap, BoltNull, BoltString, BoltType,
};
use serde_json::Value;

use nexus_core::{Direction, NodeKey, NodeRecord, NodeSummary, Properties, RelationRecord};

use crate::client::GraphError;

/// Bind a caller-supplied node id as a query parameter.
pub fn key_param(key: &NodeKey) -> BoltType {
    match key {
        NodeKey::Int(n) => BoltType::Integer(BoltInteger::new(*n)),
        NodeKey::Text(s) => BoltType::String(BoltString::new(s)),
    }
}

/// Bind a property map as a query parameter.
pub fn properties_param(properties: &Properties) -> Result<BoltType, GraphError> {
    let mut map = BoltMap::new();
    for (key, value) in properties {
        map.put(BoltString::new(key), json_to_bolt(value)?);
    }
    Ok(BoltType::Map(map))
}

/// Convert a JSON value into its Bolt counterpart.
pub fn json_to_bolt(value: &Value) -> Result<BoltType, GraphError> {
    Ok(match value {
        Value::Null => BoltType::Null(BoltNull),
        Value::Bool(b) => BoltType::Boolean(BoltBoolean::new(*b)),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                BoltType::Integer(BoltInteger::new(i))
            } else if let Some(f) = n.as_f64() {
                BoltType::Float(BoltFloat::new(f))
            } else {
                return Err(GraphError::Serialization(format!(
                    "number {n} does not fit a 64-bit integer or float"
                )));
            }
        }
        Value::String(s) => BoltType::String(BoltString::new(s)),
        Value::Array(items) => {
            let converted = items
                .iter()
                .map(json_to_bolt)
                .collect::<Result<Vec<_>, _>>()?;
            BoltType::List(BoltList::from(converted))
        }
        Value::Object(map) => {
            let mut out = BoltMap::new();
            for (key, value) in map {
                out.put(BoltString::new(key), json_to_bolt(value)?);
            }
            BoltType::Map(out)
        }
    })
}

/// Convert a neo4rs::Node to a NodeRecord with all of its properties.
pub fn node_to_record(node: &neo4rs::Node) -> Result<NodeRecord, GraphError> {
    let mut properties = Properties::new();
    for key in node.keys() {
        let key = key.to_string();
        let value: Value = node.get(&key).map_err(|e| {
            GraphError::Serialization(format!("Failed to read node property {key}: {e}"))
        })?;
        properties.insert(key, value);
    }

    let label = node
        .labels()
        .first()
        .map(ToString::to_string)
        .unwrap_or_default();

    Ok(NodeRecord {
        internal_id: node.id(),
        id: properties.get("id").cloned().unwrap_or_default(),
        label,
        properties,
    })
}

/// Convert a neo4rs::Relation to a RelationRecord as seen from `anchor_id`.
pub fn relation_to_record(
    rel: &neo4rs::Relation,
    anchor_id: i64,
) -> Result<RelationRecord, GraphError> {
    let mut properties = Properties::new();
    for key in rel.keys() {
        let key = key.to_string();
        let value: Value = rel.get(&key).map_err(|e| {
            GraphError::Serialization(format!("Failed to read relation property {key}: {e}"))
        })?;
        properties.insert(key, value);
    }

    let direction = if rel.start_node_id() == anchor_id {
        Direction::Outgoing
    } else {
        Direction::Incoming
    };

    Ok(RelationRecord {
        rel_type: rel.typ().to_string(),
        direction,
        properties,
    })
}

/// Read an integer column. A column that fails to decode is an error, not zero.
pub fn row_count(row: &neo4rs::Row, column: &str) -> Result<i64, GraphError> {
    row.get::<i64>(column)
        .map_err(|e| GraphError::Serialization(format!("Failed to read column {column}: {e}")))
}

/// Map an `id, labels` row into a summary. A node without an `id` keeps a null id.
pub fn row_to_summary(row: &neo4rs::Row) -> Result<NodeSummary, GraphError> {
    let id: Value = row.get("id").unwrap_or_default();
    let labels: Vec<String> = row
        .get("labels")
        .map_err(|e| GraphError::Serialization(format!("Failed to read labels: {e}")))?;
    Ok(NodeSummary {
        id,
        label: labels.into_iter().next().unwrap_or_default(),
    })
}
