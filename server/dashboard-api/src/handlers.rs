//! HTTP handlers for the dashboard API.

use std::collections::BTreeSet;
use std::sync::Arc;

use axum::{
  extract::{Path, State},
  Json,
};
use burnout_engine::engine::{
  AffectedMembersParams, GithubAffectedParams, GithubTagsParams, MatchMemberParams, MemberTagsParams, MembersParams,
  RunningAverageParams, SelfReportParams, TrendSeriesParams,
};
use burnout_engine::matcher::MatchResult;
use burnout_engine::self_report::SelfReportSummary;
use burnout_engine::types::{AffectedMember, FactorCount, GithubAffectedMember, Tag, TrendPoint};
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::extract::ApiJson;
use crate::state::AppState;
use crate::types::{ClearResult, Health, OnCallEntry, OnCallPayload};

type Shared = State<Arc<AppState>>;

pub async fn health() -> Json<Health> {
  Json(Health {
    status: "ok",
    version: env!("CARGO_PKG_VERSION"),
  })
}

pub async fn risk_affected(
  State(state): Shared,
  ApiJson(params): ApiJson<AffectedMembersParams>,
) -> ApiResult<Json<Vec<AffectedMember>>> {
  let affected = state.engine.affected_members(&params)?;
  debug!(factor = %params.factor, affected = affected.len(), "affected members");
  Ok(Json(affected))
}

pub async fn risk_tags(State(state): Shared, ApiJson(params): ApiJson<MemberTagsParams>) -> ApiResult<Json<Vec<Tag>>> {
  Ok(Json(state.engine.vulnerability_tags(&params)?))
}

pub async fn risk_breakdown(State(state): Shared, ApiJson(params): ApiJson<MembersParams>) -> Json<Vec<FactorCount>> {
  Json(state.engine.factor_breakdown(&params))
}

pub async fn running_average(
  State(state): Shared,
  ApiJson(params): ApiJson<RunningAverageParams>,
) -> ApiResult<Json<Vec<i64>>> {
  Ok(Json(state.engine.running_average(&params)?))
}

pub async fn trend_series(
  State(state): Shared,
  ApiJson(params): ApiJson<TrendSeriesParams>,
) -> ApiResult<Json<Vec<TrendPoint>>> {
  Ok(Json(state.engine.trend_series(&params)?))
}

pub async fn github_affected(
  State(state): Shared,
  ApiJson(params): ApiJson<GithubAffectedParams>,
) -> ApiResult<Json<Vec<GithubAffectedMember>>> {
  Ok(Json(state.engine.github_affected_members(&params)?))
}

pub async fn github_tags(State(state): Shared, ApiJson(params): ApiJson<GithubTagsParams>) -> ApiResult<Json<Vec<Tag>>> {
  Ok(Json(state.engine.github_vulnerability_tags(&params)?))
}

pub async fn self_report_summary(
  State(state): Shared,
  ApiJson(params): ApiJson<SelfReportParams>,
) -> Json<SelfReportSummary> {
  Json(state.engine.self_report_summary(&params))
}

pub async fn match_member(
  State(state): Shared,
  ApiJson(params): ApiJson<MatchMemberParams>,
) -> ApiResult<Json<Option<MatchResult>>> {
  Ok(Json(state.engine.match_member(&params)?))
}

pub async fn oncall_get(State(state): Shared, Path(integration_id): Path<String>) -> ApiResult<Json<OnCallEntry>> {
  match state.oncall.lookup(&integration_id) {
    Some((emails, cache)) => Ok(Json(OnCallEntry {
      integration_id,
      emails,
      cache,
    })),
    None => Err(ApiError::NotFound(format!("no cached on-call users for {}", integration_id))),
  }
}

pub async fn oncall_put(
  State(state): Shared,
  Path(integration_id): Path<String>,
  ApiJson(payload): ApiJson<OnCallPayload>,
) -> Json<OnCallEntry> {
  let emails: BTreeSet<String> = payload
    .emails
    .iter()
    .map(|e| e.trim().to_string())
    .filter(|e| !e.is_empty())
    .collect();
  let cache = state.oncall.set(&integration_id, emails.clone());
  Json(OnCallEntry {
    integration_id,
    emails,
    cache,
  })
}

pub async fn oncall_clear(State(state): Shared, Path(integration_id): Path<String>) -> Json<ClearResult> {
  let cleared = state.oncall.clear(&integration_id);
  Json(ClearResult {
    integration_id,
    cleared,
  })
}
