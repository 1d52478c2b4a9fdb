pub mod search;
pub mod tools;

use std::sync::Arc;

use crate::orchestrator::Orchestrator;

/// Shared, immutable handler state.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
}

impl AppState {
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
        }
    }
}
