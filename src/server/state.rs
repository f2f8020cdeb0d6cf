use axum::extract::FromRef;

use crate::catalog::EpisodeStore;
use crate::render::PageRenderer;
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;

/// The catalog never changes after loading, so it is shared without a lock.
pub type SharedEpisodeStore = Arc<dyn EpisodeStore>;
pub type SharedRenderer = Arc<PageRenderer>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub store: SharedEpisodeStore,
    pub renderer: SharedRenderer,
}

impl FromRef<ServerState> for SharedEpisodeStore {
    fn from_ref(input: &ServerState) -> Self {
        input.store.clone()
    }
}

impl FromRef<ServerState> for SharedRenderer {
    fn from_ref(input: &ServerState) -> Self {
        input.renderer.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
