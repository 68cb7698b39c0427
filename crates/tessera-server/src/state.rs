//! Application state.

use std::sync::Arc;

use tessera_git::{ConfigResolver, RepositorySynchronizer};
use tessera_secrets::SecretOverlay;

use crate::service::ConfigService;

/// Application state shared across all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    service: ConfigService,
    synchronizer: Arc<RepositorySynchronizer>,
}

impl AppState {
    pub fn new(synchronizer: Arc<RepositorySynchronizer>, overlay: Arc<SecretOverlay>) -> Self {
        let resolver = ConfigResolver::new(Arc::clone(&synchronizer));
        Self {
            service: ConfigService::new(resolver, overlay),
            synchronizer,
        }
    }

    pub fn service(&self) -> &ConfigService {
        &self.service
    }

    pub fn synchronizer(&self) -> &Arc<RepositorySynchronizer> {
        &self.synchronizer
    }
}
