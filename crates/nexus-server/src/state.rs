use std::sync::Arc;

use nexus_core::{GraphStore, LabelAllowList};

use crate::auth::BearerAuth;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn GraphStore>,
    pub auth: Arc<BearerAuth>,
    pub labels: Arc<LabelAllowList>,
}

impl AppState {
    pub fn new(store: Arc<dyn GraphStore>, token: &str, labels: LabelAllowList) -> Self {
        Self {
            store,
            auth: Arc::new(BearerAuth::new(token)),
            labels: Arc::new(labels),
        }
    }
}
