//! Request/response types specific to the HTTP layer.

use std::collections::BTreeSet;

use burnout_engine::cache::CacheInfo;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct OnCallPayload {
  #[serde(default)]
  pub emails: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct OnCallEntry {
  pub integration_id: String,
  pub emails: BTreeSet<String>,
  pub cache: CacheInfo,
}

#[derive(Debug, Serialize)]
pub struct ClearResult {
  pub integration_id: String,
  pub cleared: bool,
}

#[derive(Debug, Serialize)]
pub struct Health {
  pub status: &'static str,
  pub version: &'static str,
}
