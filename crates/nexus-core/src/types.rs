//! Core domain types for the Nexus graph API.
//!
//! These types describe nodes, relationships, and the read-side projections
//! shared by the Neo4j adapter and the HTTP facade.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{NexusError, Result};

/// Property map attached to nodes and relationships.
pub type Properties = Map<String, Value>;

/// Relationship type given to every edge created alongside a node.
pub const RELATION_TYPE: &str = "RELATED_TO";

const MAX_LABEL_LEN: usize = 64;

// ── Node Identity ────────────────────────────────────────────────

/// Caller-supplied node identity, stored in the node's `id` property.
///
/// The engine assigns its own internal identity as well; that one is never
/// exposed through this type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeKey {
    Int(i64),
    Text(String),
}

impl NodeKey {
    /// Parse a path segment. Anything that fits an `i64` is numeric.
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.is_empty() {
            return Err(NexusError::InvalidInput("node id must not be empty".to_string()));
        }
        Ok(match raw.parse::<i64>() {
            Ok(n) => Self::Int(n),
            Err(_) => Self::Text(raw.to_string()),
        })
    }

    /// Read a key from a JSON property value.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_i64().map(Self::Int),
            Value::String(s) if !s.is_empty() => Some(Self::Text(s.clone())),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::Int(n) => Value::from(*n),
            Self::Text(s) => Value::String(s.clone()),
        }
    }

    /// Whether the key survives a round trip through a URL path segment.
    ///
    /// Text that parses as an `i64` would come back as [`NodeKey::Int`].
    pub fn is_path_safe(&self) -> bool {
        match self {
            Self::Int(_) => true,
            Self::Text(s) => s.parse::<i64>().is_err(),
        }
    }

    /// Whether a stored `id` property value denotes this key.
    pub fn matches(&self, value: &Value) -> bool {
        Self::from_json(value).as_ref() == Some(self)
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for NodeKey {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<&str> for NodeKey {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

// ── Labels ───────────────────────────────────────────────────────

/// A node label that is safe to place in Cypher text.
///
/// Labels cannot be bound as query parameters, so they are restricted to
/// plain identifiers and always rendered backtick-quoted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Label(String);

impl Label {
    pub fn new(raw: &str) -> Result<Self> {
        let mut chars = raw.chars();
        let valid_start = chars
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
        let valid_rest = chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

        if !valid_start || !valid_rest || raw.len() > MAX_LABEL_LEN {
            return Err(NexusError::InvalidInput(format!(
                "invalid label {raw:?}: expected an identifier of at most {MAX_LABEL_LEN} characters"
            )));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Quoted form for interpolation into a Cypher pattern.
    pub fn cypher(&self) -> String {
        format!("`{}`", self.0)
    }
}

impl FromStr for Label {
    type Err = NexusError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The closed set of labels nodes may be created with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelAllowList(Vec<Label>);

impl LabelAllowList {
    pub fn new(labels: Vec<Label>) -> Result<Self> {
        if labels.is_empty() {
            return Err(NexusError::Config(
                "at least one node label must be allowed".to_string(),
            ));
        }
        Ok(Self(labels))
    }

    /// Resolve a caller-supplied label against the allow-list.
    pub fn resolve(&self, raw: &str) -> Result<Label> {
        self.0
            .iter()
            .find(|label| label.as_str() == raw)
            .cloned()
            .ok_or_else(|| {
                NexusError::InvalidInput(format!(
                    "label {raw:?} is not allowed; expected one of: {}",
                    self.0
                        .iter()
                        .map(Label::as_str)
                        .collect::<Vec<_>>()
                        .join(", ")
                ))
            })
    }

    pub fn labels(&self) -> &[Label] {
        &self.0
    }
}

// ── Read Records ─────────────────────────────────────────────────

/// One entry of the flat node listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSummary {
    pub id: Value,
    pub label: String,
}

/// A node with its primary label and full property map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Engine-assigned identity. Used to group rows, never serialized.
    #[serde(skip)]
    pub internal_id: i64,
    pub id: Value,
    pub label: String,
    pub properties: Properties,
}

/// Direction of a relationship as seen from the node it is reported for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Outgoing,
    Incoming,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationRecord {
    #[serde(rename = "type")]
    pub rel_type: String,
    pub direction: Direction,
    pub properties: Properties,
}

/// A `(node, relation, target)` triple for one incident relationship.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRelation {
    pub node: NodeRecord,
    pub relation: RelationRecord,
    pub target: NodeRecord,
}

/// A relationship and the node at its other end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    pub relation: RelationRecord,
    pub target: NodeRecord,
}

/// A node and every relationship incident to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeWithRelations {
    pub node: NodeRecord,
    pub relations: Vec<Neighbor>,
}

// ── Writes ───────────────────────────────────────────────────────

/// What to do when a relationship target cannot be found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LinkPolicy {
    /// Roll back the whole write.
    #[default]
    FailFast,
    /// Skip the edge and report the missing target.
    BestEffort,
}

impl LinkPolicy {
    pub fn from_best_effort(best_effort: bool) -> Self {
        if best_effort {
            Self::BestEffort
        } else {
            Self::FailFast
        }
    }
}

/// An edge to create from a new node to an existing one.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRelation {
    pub target_id: NodeKey,
    pub properties: Properties,
}

/// A validated node creation request.
#[derive(Debug, Clone, PartialEq)]
pub struct NewNode {
    id: NodeKey,
    label: Label,
    properties: Properties,
    relationships: Vec<NewRelation>,
}

impl NewNode {
    /// Build a node from its parts.
    ///
    /// The property map must carry a usable `id` (integer or non-empty
    /// string), and every property value must be storable on a node.
    pub fn new(
        label: Label,
        mut properties: Properties,
        relationships: Vec<NewRelation>,
    ) -> Result<Self> {
        let id = properties
            .get("id")
            .and_then(NodeKey::from_json)
            .ok_or_else(|| {
                NexusError::InvalidInput(
                    "properties.id is required and must be an integer or a non-empty string"
                        .to_string(),
                )
            })?;

        if !id.is_path_safe() {
            return Err(numeric_text_key("properties.id", &id));
        }

        validate_properties(&properties, "node")?;
        for rel in &relationships {
            if !rel.target_id.is_path_safe() {
                return Err(numeric_text_key("target_id", &rel.target_id));
            }
            validate_properties(&rel.properties, "relationship")?;
        }
        // Null properties are equivalent to absent ones in the engine.
        properties.retain(|_, v| !v.is_null());

        Ok(Self {
            id,
            label,
            properties,
            relationships,
        })
    }

    pub fn id(&self) -> &NodeKey {
        &self.id
    }

    pub fn label(&self) -> &Label {
        &self.label
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    pub fn relationships(&self) -> &[NewRelation] {
        &self.relationships
    }
}

fn numeric_text_key(field: &str, key: &NodeKey) -> NexusError {
    NexusError::InvalidInput(format!(
        "{field} \"{key}\" is numeric text; send it as a JSON integer"
    ))
}

/// Outcome of a committed node creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedNode {
    pub id: NodeKey,
    pub relationships_created: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped_targets: Vec<NodeKey>,
}

/// Check that every value in a property map can be stored by the engine.
pub fn validate_properties(properties: &Properties, owner: &str) -> Result<()> {
    for (key, value) in properties {
        if key.is_empty() {
            return Err(NexusError::InvalidInput(format!(
                "{owner} property names must not be empty"
            )));
        }
        if !is_storable(value) {
            return Err(NexusError::InvalidInput(format!(
                "{owner} property {key:?} must be a scalar or a list of scalars of one type"
            )));
        }
    }
    Ok(())
}

fn is_storable(value: &Value) -> bool {
    match value {
        Value::Array(items) => {
            let Some(first) = items.first() else {
                return true;
            };
            items
                .iter()
                .all(|item| is_scalar(item) && same_kind(first, item))
        }
        other => other.is_null() || is_scalar(other),
    }
}

fn is_scalar(value: &Value) -> bool {
    match value {
        Value::Bool(_) | Value::String(_) => true,
        Value::Number(n) => n.is_i64() || n.is_f64(),
        _ => false,
    }
}

fn same_kind(a: &Value, b: &Value) -> bool {
    std::mem::discriminant(a) == std::mem::discriminant(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn props(value: Value) -> Properties {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn test_node_key_parse() {
        assert_eq!(NodeKey::parse("42").unwrap(), NodeKey::Int(42));
        assert_eq!(NodeKey::parse("-3").unwrap(), NodeKey::Int(-3));
        assert_eq!(NodeKey::parse("alice").unwrap(), NodeKey::Text("alice".into()));
        assert_eq!(
            NodeKey::parse("99999999999999999999").unwrap(),
            NodeKey::Text("99999999999999999999".into())
        );
        assert!(NodeKey::parse("").is_err());
    }

    #[test]
    fn test_node_key_serializes_untagged() {
        assert_eq!(serde_json::to_value(NodeKey::Int(1)).unwrap(), json!(1));
        assert_eq!(serde_json::to_value(NodeKey::from("x")).unwrap(), json!("x"));
        let key: NodeKey = serde_json::from_value(json!("7")).unwrap();
        assert_eq!(key, NodeKey::Text("7".into()));
    }

    #[test]
    fn test_node_key_matches_stored_values() {
        let key = NodeKey::Int(5);
        assert!(key.matches(&json!(5)));
        assert!(!key.matches(&json!("5")));
        assert!(!key.matches(&json!(5.5)));
        assert!(!key.matches(&Value::Null));
    }

    #[test]
    fn test_label_validation() {
        assert!(Label::new("User").is_ok());
        assert!(Label::new("_internal2").is_ok());
        assert!(Label::new("").is_err());
        assert!(Label::new("2fast").is_err());
        assert!(Label::new("User) DETACH DELETE (m").is_err());
        assert!(Label::new("Us`er").is_err());
        assert!(Label::new(&"a".repeat(65)).is_err());
        assert_eq!(Label::new("Post").unwrap().cypher(), "`Post`");
    }

    #[test]
    fn test_allow_list_resolves_exact_names() {
        let allowed =
            LabelAllowList::new(vec![Label::new("User").unwrap(), Label::new("Post").unwrap()])
                .unwrap();
        assert_eq!(allowed.resolve("Post").unwrap().as_str(), "Post");
        assert!(allowed.resolve("post").is_err());
        assert!(allowed.resolve("Admin").is_err());
        assert!(LabelAllowList::new(Vec::new()).is_err());
    }

    #[test]
    fn test_new_node_requires_id() {
        let label = Label::new("User").unwrap();
        let err = NewNode::new(label.clone(), props(json!({"name": "A"})), vec![]).unwrap_err();
        assert!(matches!(err, NexusError::InvalidInput(_)));

        let err = NewNode::new(label.clone(), props(json!({"id": 1.5})), vec![]).unwrap_err();
        assert!(matches!(err, NexusError::InvalidInput(_)));

        let node = NewNode::new(label, props(json!({"id": 1, "name": "A"})), vec![]).unwrap();
        assert_eq!(node.id(), &NodeKey::Int(1));
    }

    #[test]
    fn test_new_node_rejects_numeric_text_ids() {
        let label = Label::new("User").unwrap();
        let err = NewNode::new(label.clone(), props(json!({"id": "42"})), vec![]).unwrap_err();
        assert!(matches!(err, NexusError::InvalidInput(_)));

        let rel = NewRelation {
            target_id: NodeKey::Text("-7".into()),
            properties: Properties::new(),
        };
        let err = NewNode::new(label.clone(), props(json!({"id": 1})), vec![rel]).unwrap_err();
        assert!(matches!(err, NexusError::InvalidInput(_)));

        // Too large for i64, so a path segment keeps it as text.
        let big = props(json!({"id": "99999999999999999999"}));
        assert!(NewNode::new(label.clone(), big, vec![]).is_ok());
        assert!(NewNode::new(label, props(json!({"id": "42a"})), vec![]).is_ok());
    }

    #[test]
    fn test_new_node_rejects_nested_values() {
        let label = Label::new("User").unwrap();
        let nested = props(json!({"id": 1, "address": {"city": "Tyumen"}}));
        assert!(NewNode::new(label.clone(), nested, vec![]).is_err());

        let mixed = props(json!({"id": 1, "tags": ["a", 2]}));
        assert!(NewNode::new(label.clone(), mixed, vec![]).is_err());

        let rel = NewRelation {
            target_id: NodeKey::Int(2),
            properties: props(json!({"weights": [[1, 2]]})),
        };
        assert!(NewNode::new(label.clone(), props(json!({"id": 1})), vec![rel]).is_err());

        let ok = props(json!({"id": 1, "tags": ["a", "b"], "score": 0.5, "active": true}));
        assert!(NewNode::new(label, ok, vec![]).is_ok());
    }

    #[test]
    fn test_new_node_drops_null_properties() {
        let label = Label::new("User").unwrap();
        let node = NewNode::new(label, props(json!({"id": 1, "nickname": null})), vec![]).unwrap();
        assert!(!node.properties().contains_key("nickname"));
    }

    #[test]
    fn test_node_record_hides_internal_id() {
        let record = NodeRecord {
            internal_id: 17,
            id: json!(1),
            label: "User".into(),
            properties: props(json!({"id": 1})),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json, json!({"id": 1, "label": "User", "properties": {"id": 1}}));
    }

    #[test]
    fn test_relation_record_wire_names() {
        let rel = RelationRecord {
            rel_type: RELATION_TYPE.into(),
            direction: Direction::Incoming,
            properties: Properties::new(),
        };
        let json = serde_json::to_value(&rel).unwrap();
        assert_eq!(
            json,
            json!({"type": "RELATED_TO", "direction": "incoming", "properties": {}})
        );
    }
}
