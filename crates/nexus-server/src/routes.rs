//! Route table and handlers.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use nexus_core::{LinkPolicy, NexusError, NodeKey, NodeRelation, NodeSummary, NodeWithRelations};

use crate::auth::Authorized;
use crate::error::ApiError;
use crate::layers::{request_span, UuidRequestId};
use crate::models::{CreateNodeRequest, CreateNodeResponse, DeleteNodeResponse};
use crate::state::AppState;

/// Build the API router. CORS is layered on by the caller.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/nodes", get(list_nodes).post(create_node))
        .route("/nodes_with_relations", get(list_nodes_with_relations))
        .route("/nodes/:id", get(get_node).delete(delete_node))
        .with_state(state)
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http().make_span_with(request_span))
        .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
}

async fn list_nodes(State(state): State<AppState>) -> Result<Json<Vec<NodeSummary>>, ApiError> {
    Ok(Json(state.store.list_nodes().await?))
}

async fn list_nodes_with_relations(
    State(state): State<AppState>,
) -> Result<Json<Vec<NodeWithRelations>>, ApiError> {
    Ok(Json(state.store.list_nodes_with_relations().await?))
}

/// Relationship triples for one node. An existing node without
/// relationships yields an empty list; an unknown id is a 404.
async fn get_node(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Json<Vec<NodeRelation>>, ApiError> {
    let id = NodeKey::parse(&raw)?;
    if !state.store.node_exists(&id).await? {
        return Err(NexusError::NotFound(id).into());
    }
    Ok(Json(state.store.node_relations(&id).await?))
}

async fn create_node(
    _auth: Authorized,
    State(state): State<AppState>,
    body: Result<Json<CreateNodeRequest>, JsonRejection>,
) -> Result<Json<CreateNodeResponse>, ApiError> {
    let Json(request) = body?;
    let label = state.labels.resolve(&request.label)?;
    let policy = LinkPolicy::from_best_effort(request.best_effort);
    let node = request.into_new_node(label)?;

    let created = state.store.create_node(&node, policy).await?;
    Ok(Json(CreateNodeResponse {
        message: "Node and relationships added successfully",
        node: created,
    }))
}

async fn delete_node(
    _auth: Authorized,
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Json<DeleteNodeResponse>, ApiError> {
    let id = NodeKey::parse(&raw)?;
    let deleted = state.store.delete_node(&id).await?;
    Ok(Json(DeleteNodeResponse {
        message: "Node and relationships deleted successfully",
        deleted,
    }))
}
