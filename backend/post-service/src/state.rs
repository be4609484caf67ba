use crate::{
    config::Config,
    db::EntityStore,
    services::{AccountService, PostService},
    websocket::PostHub,
};
use std::sync::Arc;

/// Shared state cloned into every actix worker
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn EntityStore>,
    pub hub: PostHub,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: Arc<dyn EntityStore>, config: Config) -> Self {
        Self {
            store,
            hub: PostHub::new(),
            config: Arc::new(config),
        }
    }

    pub fn posts(&self) -> PostService {
        PostService::new(self.store.clone(), self.hub.clone())
    }

    pub fn accounts(&self) -> AccountService {
        AccountService::new(self.store.clone())
    }
}
