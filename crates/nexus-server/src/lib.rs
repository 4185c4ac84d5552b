//! nexus-server: Authenticated HTTP API over the Nexus graph.
//!
//! Maps five routes onto a [`nexus_core::GraphStore`]. Reads are open;
//! writes require the shared bearer token.

pub mod auth;
pub mod error;
pub mod layers;
pub mod models;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::router;
pub use state::AppState;
