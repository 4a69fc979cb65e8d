use std::sync::Arc;

use crate::auth::SessionRegistry;
use crate::store::Store;

// Shared state passed to all route handlers
#[derive(Debug, Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub sessions: Arc<SessionRegistry>,
}

impl AppState {
    pub fn new(store: Store, sessions: SessionRegistry) -> Self {
        Self {
            store: Arc::new(store),
            sessions: Arc::new(sessions),
        }
    }
}
