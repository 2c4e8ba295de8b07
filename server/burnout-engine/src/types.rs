//! Core types for the burnout engine (JSON contracts + internal models).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::normalize::{default_on_null, lenient_count, lenient_f64};

// ---------------------------------------------------------------------------
// Inbound types (JSON contract shaped by the upstream analysis API)
// ---------------------------------------------------------------------------

/// One responder from an analysis result. Unknown fields are silently ignored,
/// numeric fields that are missing or not numbers read as absent.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Member {
  #[serde(default, deserialize_with = "default_on_null")]
  pub user_name: String,
  #[serde(default, deserialize_with = "default_on_null")]
  pub user_email: String,
  /// Composite burnout score, 0-100. Members without one are never flagged.
  #[serde(default, deserialize_with = "lenient_f64")]
  pub ocb_score: Option<f64>,
  #[serde(default, deserialize_with = "default_on_null")]
  pub risk_level: Option<String>,
  #[serde(default, deserialize_with = "lenient_count")]
  pub incident_count: u64,
  #[serde(default, deserialize_with = "default_on_null")]
  pub factors: Factors,
  #[serde(default, deserialize_with = "default_on_null")]
  pub github_activity: Option<GithubActivity>,
  #[serde(default, deserialize_with = "default_on_null")]
  pub slack_activity: Option<SlackActivity>,
}

impl Member {
  /// Name to show on the dashboard; falls back to the email.
  pub fn display_name(&self) -> &str {
    if self.user_name.is_empty() {
      &self.user_email
    } else {
      &self.user_name
    }
  }
}

/// Raw factor scores on the upstream 0-10 scale.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Factors {
  #[serde(default, deserialize_with = "lenient_f64")]
  pub workload: Option<f64>,
  #[serde(default, deserialize_with = "lenient_f64")]
  pub after_hours: Option<f64>,
  #[serde(default, deserialize_with = "lenient_f64")]
  pub weekend_work: Option<f64>,
  #[serde(default, deserialize_with = "lenient_f64")]
  pub incident_load: Option<f64>,
  #[serde(default, deserialize_with = "lenient_f64")]
  pub response_time: Option<f64>,
}

impl Factors {
  /// Raw value for a factor; undefined reads as 0.
  pub fn get(&self, factor: RiskFactor) -> f64 {
    let value = match factor {
      RiskFactor::Workload => self.workload,
      RiskFactor::AfterHours => self.after_hours,
      RiskFactor::WeekendWork => self.weekend_work,
      RiskFactor::IncidentLoad => self.incident_load,
      RiskFactor::ResponseTime => self.response_time,
    };
    value.unwrap_or(0.0)
  }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct GithubActivity {
  #[serde(default, deserialize_with = "lenient_count")]
  pub total_commits: u64,
  #[serde(default, deserialize_with = "lenient_f64")]
  pub commits_per_week: Option<f64>,
  #[serde(default, deserialize_with = "lenient_count")]
  pub after_hours_commits: u64,
  #[serde(default, deserialize_with = "lenient_f64")]
  pub after_hours_commit_percentage: Option<f64>,
  #[serde(default, deserialize_with = "lenient_count")]
  pub weekend_commits: u64,
  #[serde(default, deserialize_with = "lenient_count")]
  pub total_pull_requests: u64,
  #[serde(default, deserialize_with = "lenient_count")]
  pub total_reviews: u64,
}

/// Carried through for display; not scored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct SlackActivity {
  #[serde(default, deserialize_with = "lenient_count")]
  pub total_messages: u64,
  #[serde(default, deserialize_with = "lenient_count")]
  pub after_hours_messages: u64,
  #[serde(default, deserialize_with = "lenient_count")]
  pub channels_active: u64,
  #[serde(default, deserialize_with = "lenient_f64")]
  pub sentiment_score: Option<f64>,
}

/// One day of team-level aggregates.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DailyTrend {
  pub date: NaiveDate,
  #[serde(default, deserialize_with = "lenient_count")]
  pub incident_count: u64,
  #[serde(default, deserialize_with = "lenient_count")]
  pub after_hours_count: u64,
  #[serde(default, deserialize_with = "lenient_f64")]
  pub severity_weighted_count: Option<f64>,
  #[serde(default, deserialize_with = "lenient_f64")]
  pub overall_score: Option<f64>,
  #[serde(default, deserialize_with = "lenient_count")]
  pub members_at_risk: u64,
}

// ---------------------------------------------------------------------------
// Selectors (normalized)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskFactor {
  Workload,
  AfterHours,
  WeekendWork,
  IncidentLoad,
  ResponseTime,
}

impl RiskFactor {
  pub const ALL: [RiskFactor; 5] = [
    Self::Workload,
    Self::AfterHours,
    Self::WeekendWork,
    Self::IncidentLoad,
    Self::ResponseTime,
  ];

  pub fn from_str_loose(s: &str) -> Option<Self> {
    match s.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
      "workload" => Some(Self::Workload),
      "after_hours" | "afterhours" => Some(Self::AfterHours),
      "weekend_work" | "weekend" => Some(Self::WeekendWork),
      "incident_load" | "incidents" => Some(Self::IncidentLoad),
      "response_time" => Some(Self::ResponseTime),
      _ => None,
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      Self::Workload => "Workload",
      Self::AfterHours => "After Hours",
      Self::WeekendWork => "Weekend Work",
      Self::IncidentLoad => "Incident Load",
      Self::ResponseTime => "Response Time",
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GithubMetric {
  AfterHours,
  CommitFrequency,
  PrVolume,
  ReviewLoad,
}

impl GithubMetric {
  pub fn from_str_loose(s: &str) -> Option<Self> {
    match s.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
      "after_hours" | "after_hours_commits" => Some(Self::AfterHours),
      "commit_frequency" | "commits" | "commits_per_week" => Some(Self::CommitFrequency),
      "pr_volume" | "pull_requests" | "prs" => Some(Self::PrVolume),
      "review_load" | "reviews" => Some(Self::ReviewLoad),
      _ => None,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendMetric {
  HealthScore,
  IncidentCount,
  AfterHoursCount,
  SeverityWeightedCount,
  MembersAtRisk,
}

impl TrendMetric {
  pub fn from_str_loose(s: &str) -> Option<Self> {
    match s.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
      "health_score" | "health" | "overall_score" => Some(Self::HealthScore),
      "incident_count" | "incidents" => Some(Self::IncidentCount),
      "after_hours_count" | "after_hours" => Some(Self::AfterHoursCount),
      "severity_weighted_count" | "severity_weighted" => Some(Self::SeverityWeightedCount),
      "members_at_risk" => Some(Self::MembersAtRisk),
      _ => None,
    }
  }
}

// ---------------------------------------------------------------------------
// Levels and tags
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
  Low,
  Medium,
  High,
}

impl RiskLevel {
  pub fn label(self) -> &'static str {
    match self {
      Self::Low => "Low Risk",
      Self::Medium => "Medium Risk",
      Self::High => "High Risk",
    }
  }
}

/// Interpretation of a composite OCB score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OcbLevel {
  Low,
  Mild,
  Moderate,
  High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagColor {
  Green,
  Yellow,
  Orange,
  Red,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagKind {
  RiskLevel,
  OcbScore,
  FactorScore,
  MetricValue,
  SupportingCount,
}

/// A short colored label rendered next to a member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
  pub kind: TagKind,
  pub label: String,
  pub color: TagColor,
}

impl Tag {
  pub fn new(kind: TagKind, label: impl Into<String>, color: TagColor) -> Self {
    Self {
      kind,
      label: label.into(),
      color,
    }
  }
}

// ---------------------------------------------------------------------------
// Output types (JSON contract we emit)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AffectedMember {
  pub user_name: String,
  pub user_email: String,
  pub ocb_score: f64,
  pub ocb_level: OcbLevel,
  pub factor: RiskFactor,
  /// Raw upstream value, 0-10.
  pub factor_value: f64,
  /// `round(factor_value * 10)`.
  pub risk_score: i64,
  pub risk_level: RiskLevel,
  pub tags: Vec<Tag>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FactorCount {
  pub factor: RiskFactor,
  pub affected: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GithubAffectedMember {
  pub user_name: String,
  pub user_email: String,
  pub metric: GithubMetric,
  pub metric_value: f64,
  pub contribution_score: f64,
  pub risk_level: RiskLevel,
  pub tags: Vec<Tag>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
  pub date: NaiveDate,
  /// Display value (smoothed for the health score).
  pub value: f64,
  /// Unsmoothed daily value.
  pub raw: f64,
}

// ---------------------------------------------------------------------------
// CLI stream wrappers
// ---------------------------------------------------------------------------

/// Structured error output for rejected requests.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorOutput {
  pub error: bool,
  pub message: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub field: Option<String>,
}

impl ErrorOutput {
  pub fn new(message: impl Into<String>) -> Self {
    Self {
      error: true,
      message: message.into(),
      field: None,
    }
  }

  pub fn with_field(mut self, field: impl Into<String>) -> Self {
    self.field = Some(field.into());
    self
  }
}
