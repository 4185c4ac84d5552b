//! Shared fixtures: an in-memory `GraphStore` and request helpers.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use nexus_core::group::{group_by_node, with_isolated};
use nexus_core::{
    CreatedNode, Direction, GraphStore, Label, LabelAllowList, LinkPolicy, NewNode, NexusError,
    NodeKey, NodeRecord, NodeRelation, NodeSummary, NodeWithRelations, Properties,
    RelationRecord, Result, RELATION_TYPE,
};
use nexus_server::{router, AppState};

pub const TOKEN: &str = "test-token";

struct StoredNode {
    internal_id: i64,
    label: String,
    properties: Properties,
}

struct StoredEdge {
    from: i64,
    to: i64,
    properties: Properties,
}

#[derive(Default)]
struct Graph {
    next_id: i64,
    nodes: Vec<StoredNode>,
    edges: Vec<StoredEdge>,
}

impl Graph {
    fn matching(&self, key: &NodeKey) -> Vec<i64> {
        self.nodes
            .iter()
            .filter(|n| n.properties.get("id").is_some_and(|v| key.matches(v)))
            .map(|n| n.internal_id)
            .collect()
    }

    fn record(&self, internal_id: i64) -> NodeRecord {
        let node = self
            .nodes
            .iter()
            .find(|n| n.internal_id == internal_id)
            .expect("edge endpoint exists");
        NodeRecord {
            internal_id,
            id: node.properties.get("id").cloned().unwrap_or(Value::Null),
            label: node.label.clone(),
            properties: node.properties.clone(),
        }
    }

    fn triple(&self, anchor: i64, edge: &StoredEdge) -> NodeRelation {
        let (direction, other) = if edge.from == anchor {
            (Direction::Outgoing, edge.to)
        } else {
            (Direction::Incoming, edge.from)
        };
        NodeRelation {
            node: self.record(anchor),
            relation: RelationRecord {
                rel_type: RELATION_TYPE.to_string(),
                direction,
                properties: edge.properties.clone(),
            },
            target: self.record(other),
        }
    }
}

/// Mirrors the Neo4j adapter's semantics without a database.
#[derive(Default)]
pub struct MemoryStore {
    graph: Mutex<Graph>,
}

#[async_trait]
impl GraphStore for MemoryStore {
    async fn list_nodes(&self) -> Result<Vec<NodeSummary>> {
        let graph = self.graph.lock().unwrap();
        Ok(graph
            .nodes
            .iter()
            .map(|n| NodeSummary {
                id: n.properties.get("id").cloned().unwrap_or(Value::Null),
                label: n.label.clone(),
            })
            .collect())
    }

    async fn node_exists(&self, id: &NodeKey) -> Result<bool> {
        Ok(!self.graph.lock().unwrap().matching(id).is_empty())
    }

    async fn node_relations(&self, id: &NodeKey) -> Result<Vec<NodeRelation>> {
        let graph = self.graph.lock().unwrap();
        let mut triples = Vec::new();
        for anchor in graph.matching(id) {
            for edge in graph.edges.iter().filter(|e| e.from == anchor || e.to == anchor) {
                triples.push(graph.triple(anchor, edge));
            }
        }
        Ok(triples)
    }

    async fn list_nodes_with_relations(&self) -> Result<Vec<NodeWithRelations>> {
        let graph = self.graph.lock().unwrap();
        let mut triples = Vec::new();
        for edge in &graph.edges {
            triples.push(graph.triple(edge.from, edge));
            if edge.to != edge.from {
                triples.push(graph.triple(edge.to, edge));
            }
        }
        let isolated: Vec<NodeRecord> = graph
            .nodes
            .iter()
            .filter(|n| {
                !graph
                    .edges
                    .iter()
                    .any(|e| e.from == n.internal_id || e.to == n.internal_id)
            })
            .map(|n| graph.record(n.internal_id))
            .collect();
        Ok(with_isolated(group_by_node(triples), isolated))
    }

    async fn create_node(&self, node: &NewNode, policy: LinkPolicy) -> Result<CreatedNode> {
        let mut graph = self.graph.lock().unwrap();
        if !graph.matching(node.id()).is_empty() {
            return Err(NexusError::DuplicateId(node.id().clone()));
        }

        // The new node is already visible to its own relationship lookups.
        let internal_id = graph.next_id + 1;
        let mut links = Vec::new();
        let mut skipped_targets = Vec::new();
        for rel in node.relationships() {
            let targets = if &rel.target_id == node.id() {
                vec![internal_id]
            } else {
                graph.matching(&rel.target_id)
            };
            if targets.is_empty() {
                skipped_targets.push(rel.target_id.clone());
            }
            for target in targets {
                links.push((target, rel.properties.clone()));
            }
        }
        if policy == LinkPolicy::FailFast && !skipped_targets.is_empty() {
            return Err(NexusError::UnresolvedTargets(skipped_targets));
        }

        graph.next_id = internal_id;
        graph.nodes.push(StoredNode {
            internal_id,
            label: node.label().as_str().to_string(),
            properties: node.properties().clone(),
        });
        let relationships_created = links.len();
        for (to, properties) in links {
            graph.edges.push(StoredEdge {
                from: internal_id,
                to,
                properties,
            });
        }

        Ok(CreatedNode {
            id: node.id().clone(),
            relationships_created,
            skipped_targets,
        })
    }

    async fn delete_node(&self, id: &NodeKey) -> Result<u64> {
        let mut graph = self.graph.lock().unwrap();
        let doomed = graph.matching(id);
        graph.edges.retain(|e| !doomed.contains(&e.from) && !doomed.contains(&e.to));
        graph.nodes.retain(|n| !doomed.contains(&n.internal_id));
        Ok(doomed.len() as u64)
    }
}

/// A store whose engine is always down.
pub struct UnavailableStore;

#[async_trait]
impl GraphStore for UnavailableStore {
    async fn list_nodes(&self) -> Result<Vec<NodeSummary>> {
        Err(NexusError::Unavailable("connection refused".into()))
    }
    async fn node_exists(&self, _id: &NodeKey) -> Result<bool> {
        Err(NexusError::Unavailable("connection refused".into()))
    }
    async fn node_relations(&self, _id: &NodeKey) -> Result<Vec<NodeRelation>> {
        Err(NexusError::Unavailable("connection refused".into()))
    }
    async fn list_nodes_with_relations(&self) -> Result<Vec<NodeWithRelations>> {
        Err(NexusError::Unavailable("connection refused".into()))
    }
    async fn create_node(&self, _node: &NewNode, _policy: LinkPolicy) -> Result<CreatedNode> {
        Err(NexusError::Unavailable("connection refused".into()))
    }
    async fn delete_node(&self, _id: &NodeKey) -> Result<u64> {
        Err(NexusError::Unavailable("connection refused".into()))
    }
}

pub fn app_with(store: Arc<dyn GraphStore>) -> Router {
    let labels = LabelAllowList::new(vec![
        Label::new("User").unwrap(),
        Label::new("Post").unwrap(),
    ])
    .unwrap();
    router(AppState::new(store, TOKEN, labels))
}

pub fn app() -> Router {
    app_with(Arc::new(MemoryStore::default()))
}

pub struct Reply {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Value,
}

pub async fn send(app: &Router, request: Request<Body>) -> Reply {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    Reply {
        status,
        headers,
        body,
    }
}

pub async fn get(app: &Router, uri: &str) -> Reply {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn post_node(app: &Router, token: Option<&str>, body: Value) -> Reply {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri("/nodes")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    send(app, builder.body(Body::from(body.to_string())).unwrap()).await
}

pub async fn delete(app: &Router, token: Option<&str>, id: &str) -> Reply {
    let mut builder = Request::builder()
        .method(Method::DELETE)
        .uri(format!("/nodes/{id}"));
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    send(app, builder.body(Body::empty()).unwrap()).await
}
