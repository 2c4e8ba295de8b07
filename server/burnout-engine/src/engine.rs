//! Core engine: validates requests and dispatches them to the aggregators.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::Config;
use crate::error::EngineError;
use crate::factors;
use crate::github;
use crate::matcher::{self, IntegrationUser, MatchResult};
use crate::normalize::{self, value_as_f64};
use crate::self_report::{self, SelfReport, SelfReportSummary};
use crate::trends;
use crate::types::*;

// ---------------------------------------------------------------------------
// Request parameters (JSON contract shared by the CLI and the HTTP service)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct AffectedMembersParams {
  #[serde(default)]
  pub members: Option<Vec<Value>>,
  pub factor: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MembersParams {
  #[serde(default)]
  pub members: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MemberTagsParams {
  #[serde(default)]
  pub member: Value,
  pub factor: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RunningAverageParams {
  #[serde(default)]
  pub scores: Option<Vec<Value>>,
  #[serde(default)]
  pub window: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrendSeriesParams {
  #[serde(default)]
  pub trends: Option<Vec<Value>>,
  pub metric: String,
  #[serde(default)]
  pub window: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GithubAffectedParams {
  #[serde(default)]
  pub members: Option<Vec<Value>>,
  pub metric: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GithubTagsParams {
  #[serde(default)]
  pub member: Value,
  pub metric: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SelfReportParams {
  #[serde(default)]
  pub reports: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchMemberParams {
  #[serde(default)]
  pub email: Option<String>,
  #[serde(default)]
  pub name: Option<String>,
  #[serde(default)]
  pub users: Option<Vec<Value>>,
  #[serde(default)]
  pub threshold: Option<f64>,
}

/// One request object, selected by its `op` field.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
  AffectedMembers(AffectedMembersParams),
  VulnerabilityTags(MemberTagsParams),
  FactorBreakdown(MembersParams),
  RunningAverage(RunningAverageParams),
  TrendSeries(TrendSeriesParams),
  GithubAffectedMembers(GithubAffectedParams),
  GithubVulnerabilityTags(GithubTagsParams),
  SelfReportSummary(SelfReportParams),
  MatchMember(MatchMemberParams),
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Response {
  AffectedMembers(Vec<AffectedMember>),
  Tags(Vec<Tag>),
  FactorBreakdown(Vec<FactorCount>),
  RunningAverage(Vec<i64>),
  TrendSeries(Vec<TrendPoint>),
  GithubAffectedMembers(Vec<GithubAffectedMember>),
  SelfReportSummary(SelfReportSummary),
  Match(Option<MatchResult>),
}

// ---------------------------------------------------------------------------
// Selector parsing
// ---------------------------------------------------------------------------

pub fn parse_factor(s: &str) -> Result<RiskFactor, EngineError> {
  RiskFactor::from_str_loose(s).ok_or_else(|| {
    EngineError::validation(
      "factor",
      "expected workload|after_hours|weekend_work|incident_load|response_time",
    )
  })
}

pub fn parse_github_metric(s: &str) -> Result<GithubMetric, EngineError> {
  GithubMetric::from_str_loose(s).ok_or_else(|| {
    EngineError::validation("metric", "expected after_hours|commit_frequency|pr_volume|review_load")
  })
}

pub fn parse_trend_metric(s: &str) -> Result<TrendMetric, EngineError> {
  TrendMetric::from_str_loose(s).ok_or_else(|| {
    EngineError::validation(
      "metric",
      "expected health_score|incident_count|after_hours_count|severity_weighted_count|members_at_risk",
    )
  })
}

fn members_from(values: &Option<Vec<Value>>) -> Vec<Member> {
  values.as_deref().map(normalize::parse_members).unwrap_or_default()
}

fn single_member(value: &Value) -> Option<Member> {
  normalize::parse_members(std::slice::from_ref(value)).pop()
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Stateless aggregation engine bound to one configuration.
#[derive(Debug, Clone)]
pub struct Engine {
  config: Config,
}

impl Engine {
  pub fn new(config: Config) -> Self {
    Self { config }
  }

  pub fn with_defaults() -> Self {
    Self::new(Config::default())
  }

  pub fn config(&self) -> &Config {
    &self.config
  }

  /// Dispatch a request to its operation.
  pub fn handle(&self, request: &Request) -> Result<Response, EngineError> {
    Ok(match request {
      Request::AffectedMembers(p) => Response::AffectedMembers(self.affected_members(p)?),
      Request::VulnerabilityTags(p) => Response::Tags(self.vulnerability_tags(p)?),
      Request::FactorBreakdown(p) => Response::FactorBreakdown(self.factor_breakdown(p)),
      Request::RunningAverage(p) => Response::RunningAverage(self.running_average(p)?),
      Request::TrendSeries(p) => Response::TrendSeries(self.trend_series(p)?),
      Request::GithubAffectedMembers(p) => Response::GithubAffectedMembers(self.github_affected_members(p)?),
      Request::GithubVulnerabilityTags(p) => Response::Tags(self.github_vulnerability_tags(p)?),
      Request::SelfReportSummary(p) => Response::SelfReportSummary(self.self_report_summary(p)),
      Request::MatchMember(p) => Response::Match(self.match_member(p)?),
    })
  }

  pub fn affected_members(&self, p: &AffectedMembersParams) -> Result<Vec<AffectedMember>, EngineError> {
    let factor = parse_factor(&p.factor)?;
    let members = members_from(&p.members);
    Ok(factors::affected_members(&members, factor, &self.config))
  }

  pub fn vulnerability_tags(&self, p: &MemberTagsParams) -> Result<Vec<Tag>, EngineError> {
    let factor = parse_factor(&p.factor)?;
    Ok(
      single_member(&p.member)
        .map(|m| factors::vulnerability_tags(&m, factor, &self.config))
        .unwrap_or_default(),
    )
  }

  pub fn factor_breakdown(&self, p: &MembersParams) -> Vec<FactorCount> {
    factors::factor_breakdown(&members_from(&p.members), &self.config)
  }

  fn window(&self, requested: Option<usize>) -> Result<usize, EngineError> {
    match requested {
      Some(0) => Err(EngineError::validation("window", "must be at least 1")),
      Some(w) => Ok(w),
      None => Ok(self.config.running_average_window),
    }
  }

  pub fn running_average(&self, p: &RunningAverageParams) -> Result<Vec<i64>, EngineError> {
    let window = self.window(p.window)?;
    let scores: Vec<f64> = p
      .scores
      .as_deref()
      .unwrap_or_default()
      .iter()
      .map(|v| value_as_f64(v).unwrap_or(0.0))
      .collect();
    Ok(trends::running_average(&scores, window))
  }

  pub fn trend_series(&self, p: &TrendSeriesParams) -> Result<Vec<TrendPoint>, EngineError> {
    let metric = parse_trend_metric(&p.metric)?;
    let window = self.window(p.window)?;
    let daily = p.trends.as_deref().map(normalize::parse_trends).unwrap_or_default();
    Ok(trends::trend_series(&daily, metric, window))
  }

  pub fn github_affected_members(&self, p: &GithubAffectedParams) -> Result<Vec<GithubAffectedMember>, EngineError> {
    let metric = parse_github_metric(&p.metric)?;
    let members = members_from(&p.members);
    Ok(github::github_affected_members(&members, metric, &self.config))
  }

  pub fn github_vulnerability_tags(&self, p: &GithubTagsParams) -> Result<Vec<Tag>, EngineError> {
    let metric = parse_github_metric(&p.metric)?;
    Ok(
      single_member(&p.member)
        .map(|m| github::github_vulnerability_tags(&m, metric, &self.config))
        .unwrap_or_default(),
    )
  }

  pub fn self_report_summary(&self, p: &SelfReportParams) -> SelfReportSummary {
    let reports: Vec<SelfReport> = p
      .reports
      .as_deref()
      .map(|v| normalize::parse_records(v, "self_report"))
      .unwrap_or_default();
    self_report::summarize_reports(&reports)
  }

  pub fn match_member(&self, p: &MatchMemberParams) -> Result<Option<MatchResult>, EngineError> {
    let threshold = p.threshold.unwrap_or(self.config.match_confidence_threshold);
    if !(0.0..=1.0).contains(&threshold) {
      return Err(EngineError::validation("threshold", "must be between 0 and 1"));
    }

    let users: Vec<IntegrationUser> = p
      .users
      .as_deref()
      .map(|v| normalize::parse_records(v, "integration_user"))
      .unwrap_or_default();
    let email = p.email.as_deref().map(str::trim).filter(|s| !s.is_empty());
    let name = p.name.as_deref().map(str::trim).filter(|s| !s.is_empty());

    match (email, name) {
      (Some(email), name) => Ok(
        matcher::match_email(email, &users, threshold)
          .or_else(|| name.and_then(|n| matcher::match_name(n, &users, threshold))),
      ),
      (None, Some(name)) => Ok(matcher::match_name(name, &users, threshold)),
      (None, None) => Err(EngineError::validation("email", "email or name is required")),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn request(value: Value) -> Request {
    serde_json::from_value(value).unwrap()
  }

  #[test]
  fn dispatches_affected_members() {
    let engine = Engine::with_defaults();
    let req = request(json!({
      "op": "affected_members",
      "factor": "after_hours",
      "members": [
        {"user_name": "Ada", "ocb_score": 72, "factors": {"after_hours": 8.1}},
        {"user_name": "Bo", "ocb_score": 40, "factors": {"after_hours": 2}}
      ]
    }));
    match engine.handle(&req).unwrap() {
      Response::AffectedMembers(list) => {
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].risk_score, 81);
      }
      other => panic!("unexpected response: {:?}", other),
    }
  }

  #[test]
  fn unknown_factor_is_a_validation_error() {
    let engine = Engine::with_defaults();
    let req = request(json!({"op": "affected_members", "factor": "sleep", "members": []}));
    let err = engine.handle(&req).unwrap_err();
    assert_eq!(err.field(), Some("factor"));
  }

  #[test]
  fn null_members_yield_empty_result() {
    let engine = Engine::with_defaults();
    let req = request(json!({"op": "affected_members", "factor": "workload", "members": null}));
    match engine.handle(&req).unwrap() {
      Response::AffectedMembers(list) => assert!(list.is_empty()),
      other => panic!("unexpected response: {:?}", other),
    }
  }

  #[test]
  fn malformed_member_gets_no_tags() {
    let engine = Engine::with_defaults();
    let req = request(json!({"op": "vulnerability_tags", "factor": "workload", "member": 17}));
    match engine.handle(&req).unwrap() {
      Response::Tags(tags) => assert!(tags.is_empty()),
      other => panic!("unexpected response: {:?}", other),
    }
  }

  #[test]
  fn running_average_coerces_non_numbers_to_zero() {
    let engine = Engine::with_defaults();
    let p = RunningAverageParams {
      scores: Some(vec![json!(10), json!(null), json!("20")]),
      window: None,
    };
    assert_eq!(engine.running_average(&p).unwrap(), vec![10, 5, 10]);
  }

  #[test]
  fn zero_window_rejected() {
    let engine = Engine::with_defaults();
    let p = RunningAverageParams {
      scores: Some(vec![json!(1)]),
      window: Some(0),
    };
    assert_eq!(engine.running_average(&p).unwrap_err().field(), Some("window"));
  }

  #[test]
  fn match_requires_email_or_name() {
    let engine = Engine::with_defaults();
    let p = MatchMemberParams {
      email: Some("  ".into()),
      name: None,
      users: None,
      threshold: None,
    };
    assert!(engine.match_member(&p).is_err());
  }

  #[test]
  fn match_falls_back_to_name() {
    let engine = Engine::with_defaults();
    let p = MatchMemberParams {
      email: Some("zz@corp.io".into()),
      name: Some("John Doe".into()),
      users: Some(vec![json!({"id": "lin-1", "name": "Doe, John"})]),
      threshold: None,
    };
    let m = engine.match_member(&p).unwrap().unwrap();
    assert_eq!(m.user_id, "lin-1");
  }

  #[test]
  fn malformed_user_is_skipped() {
    let engine = Engine::with_defaults();
    let req = request(json!({
      "op": "match_member",
      "email": "ada@x.io",
      "users": [{"id": 7, "name": "Ada"}, "nobody", {"id": "u2", "email": "ada@x.io"}]
    }));
    match engine.handle(&req).unwrap() {
      Response::Match(Some(m)) => {
        assert_eq!(m.user_id, "u2");
        assert_eq!(m.confidence, 1.0);
      }
      other => panic!("unexpected response: {:?}", other),
    }
  }

  #[test]
  fn out_of_range_threshold_rejected() {
    let engine = Engine::with_defaults();
    let p = MatchMemberParams {
      email: Some("a@x.io".into()),
      name: None,
      users: None,
      threshold: Some(1.5),
    };
    assert_eq!(engine.match_member(&p).unwrap_err().field(), Some("threshold"));
  }
}
