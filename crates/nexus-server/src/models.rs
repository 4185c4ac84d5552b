//! Request and response bodies.

use serde::{Deserialize, Serialize};

use nexus_core::{CreatedNode, Label, NewNode, NewRelation, NodeKey, Properties, Result};

#[derive(Debug, Deserialize)]
pub struct CreateNodeRequest {
    pub label: String,
    pub properties: Properties,
    #[serde(default)]
    pub relationships: Vec<RelationshipRequest>,
    /// Skip unresolved relationship targets instead of failing the write.
    #[serde(default)]
    pub best_effort: bool,
}

#[derive(Debug, Deserialize)]
pub struct RelationshipRequest {
    pub target_id: NodeKey,
    #[serde(default)]
    pub properties: Properties,
}

impl CreateNodeRequest {
    pub fn into_new_node(self, label: Label) -> Result<NewNode> {
        let relationships = self
            .relationships
            .into_iter()
            .map(|rel| NewRelation {
                target_id: rel.target_id,
                properties: rel.properties,
            })
            .collect();
        NewNode::new(label, self.properties, relationships)
    }
}

#[derive(Debug, Serialize)]
pub struct CreateNodeResponse {
    pub message: &'static str,
    #[serde(flatten)]
    pub node: CreatedNode,
}

#[derive(Debug, Serialize)]
pub struct DeleteNodeResponse {
    pub message: &'static str,
    pub deleted: u64,
}
