use std::sync::Arc;

use breeze_database::LogStore;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub logs: Arc<dyn LogStore>,
}

impl AppState {
    pub fn new(logs: Arc<dyn LogStore>) -> Self {
        Self { logs }
    }
}
