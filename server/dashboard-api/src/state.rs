//! Shared handler state.

use std::sync::Arc;

use burnout_engine::{Engine, InMemoryOnCallCache, OnCallCache};

use crate::config::ServerConfig;

pub struct AppState {
  pub engine: Engine,
  pub oncall: Arc<dyn OnCallCache>,
}

impl AppState {
  pub fn new(config: &ServerConfig) -> Self {
    Self::with_cache(config, Arc::new(InMemoryOnCallCache::new()))
  }

  pub fn with_cache(config: &ServerConfig, oncall: Arc<dyn OnCallCache>) -> Self {
    Self {
      engine: Engine::new(config.engine.clone()),
      oncall,
    }
  }
}
