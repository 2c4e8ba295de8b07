//! On-Call Health Burnout Engine: deterministic, rule-based risk aggregation.
//!
//! Takes per-responder analysis records produced upstream (OCB score, factor
//! scores, integration activity) and derives dashboard views: members at risk
//! per factor with display tags, smoothed health trends, GitHub activity flags,
//! self-report summaries and integration identity matches.
//!
//! No DB, no network; pure computation plus an in-memory on-call cache.

pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod factors;
pub mod github;
pub mod matcher;
pub mod normalize;
pub mod score;
pub mod self_report;
pub mod trends;
pub mod types;

pub use cache::{InMemoryOnCallCache, OnCallCache};
pub use config::Config;
pub use engine::{Engine, Request, Response};
pub use error::EngineError;
pub use types::{Member, RiskFactor};
