//! Self-reported check-ins: validation, risk level and team summaries.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::EngineError;
use crate::score::round_to;

/// One check-in. Scores are on a 1-5 scale where lower means worse.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SelfReport {
  #[serde(default)]
  pub user_email: Option<String>,
  pub feeling_score: i64,
  pub workload_score: i64,
  #[serde(default)]
  pub stress_factors: Vec<String>,
  /// `significantly`, `somewhat`, `no` or `prefer_not_say`.
  #[serde(default)]
  pub personal_circumstances: Option<String>,
  #[serde(default = "default_submitted_via")]
  pub submitted_via: String,
  #[serde(default)]
  pub is_anonymous: bool,
  #[serde(default)]
  pub submitted_at: Option<DateTime<Utc>>,
}

fn default_submitted_via() -> String {
  "web".to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelfReportRisk {
  Healthy,
  Fair,
  Poor,
  Critical,
}

impl SelfReportRisk {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Healthy => "healthy",
      Self::Fair => "fair",
      Self::Poor => "poor",
      Self::Critical => "critical",
    }
  }
}

impl SelfReport {
  pub fn validate(&self) -> Result<(), EngineError> {
    if !(1..=5).contains(&self.feeling_score) {
      return Err(EngineError::validation("feeling_score", "must be between 1 and 5"));
    }
    if !(1..=5).contains(&self.workload_score) {
      return Err(EngineError::validation("workload_score", "must be between 1 and 5"));
    }
    Ok(())
  }

  /// Average of feeling and workload mapped onto four bands.
  pub fn risk_level(&self) -> SelfReportRisk {
    let avg = (self.feeling_score + self.workload_score) as f64 / 2.0;
    if avg >= 4.0 {
      SelfReportRisk::Healthy
    } else if avg >= 3.0 {
      SelfReportRisk::Fair
    } else if avg >= 2.0 {
      SelfReportRisk::Poor
    } else {
      SelfReportRisk::Critical
    }
  }

  pub fn feeling_text(&self) -> &'static str {
    match self.feeling_score {
      1 => "Struggling",
      2 => "Not Great",
      3 => "Okay",
      4 => "Good",
      5 => "Very Good",
      _ => "Unknown",
    }
  }

  pub fn workload_text(&self) -> &'static str {
    match self.workload_score {
      1 => "Overwhelming",
      2 => "Barely Manageable",
      3 => "Somewhat Manageable",
      4 => "Manageable",
      5 => "Very Manageable",
      _ => "Unknown",
    }
  }

  /// Key used to group a reporter's check-ins; anonymous reporters get a pseudonym.
  pub fn reporter_key(&self) -> Option<String> {
    let email = self.user_email.as_deref()?.trim().to_ascii_lowercase();
    if email.is_empty() {
      return None;
    }
    if self.is_anonymous {
      Some(pseudonym(&email))
    } else {
      Some(email)
    }
  }
}

/// Stable, non-reversible reporter id: `anon-` + 16 hex chars of blake3(email).
pub fn pseudonym(email: &str) -> String {
  let mut hasher = blake3::Hasher::new();
  hasher.update(b"self-report|");
  hasher.update(email.trim().to_ascii_lowercase().as_bytes());
  let hex = hasher.finalize().to_hex();
  format!("anon-{}", &hex[..16])
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StressFactorCount {
  pub factor: String,
  pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatestReport {
  pub reporter: String,
  pub risk_level: SelfReportRisk,
  pub feeling: &'static str,
  pub workload: &'static str,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub submitted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelfReportSummary {
  pub report_count: usize,
  pub rejected_count: usize,
  pub average_feeling: f64,
  pub average_workload: f64,
  pub risk_levels: BTreeMap<String, usize>,
  pub top_stress_factors: Vec<StressFactorCount>,
  pub latest_by_reporter: Vec<LatestReport>,
}

/// Summarize a batch of check-ins. Reports with out-of-range scores are
/// counted as rejected and otherwise ignored.
pub fn summarize_reports(reports: &[SelfReport]) -> SelfReportSummary {
  let valid: Vec<&SelfReport> = reports
    .iter()
    .filter(|r| match r.validate() {
      Ok(()) => true,
      Err(e) => {
        debug!(error = %e, "rejecting self-report");
        false
      }
    })
    .collect();

  let n = valid.len();
  let (feeling_sum, workload_sum) = valid
    .iter()
    .fold((0i64, 0i64), |(f, w), r| (f + r.feeling_score, w + r.workload_score));
  let average = |sum: i64| if n == 0 { 0.0 } else { round_to(sum as f64 / n as f64, 2) };

  let mut risk_levels = BTreeMap::new();
  for level in [
    SelfReportRisk::Healthy,
    SelfReportRisk::Fair,
    SelfReportRisk::Poor,
    SelfReportRisk::Critical,
  ] {
    risk_levels.insert(level.as_str().to_string(), 0);
  }
  for r in &valid {
    *risk_levels.entry(r.risk_level().as_str().to_string()).or_insert(0) += 1;
  }

  let mut factor_counts: HashMap<String, usize> = HashMap::new();
  for r in &valid {
    for f in &r.stress_factors {
      let key = f.trim().to_ascii_lowercase();
      if !key.is_empty() {
        *factor_counts.entry(key).or_insert(0) += 1;
      }
    }
  }
  let mut top_stress_factors: Vec<StressFactorCount> = factor_counts
    .into_iter()
    .map(|(factor, count)| StressFactorCount { factor, count })
    .collect();
  top_stress_factors.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.factor.cmp(&b.factor)));

  // Later submissions win; undated reports only win over other undated ones.
  let mut latest: BTreeMap<String, &SelfReport> = BTreeMap::new();
  for r in &valid {
    let Some(key) = r.reporter_key() else {
      continue;
    };
    match latest.get(&key) {
      Some(existing) if existing.submitted_at > r.submitted_at => {}
      _ => {
        latest.insert(key, r);
      }
    }
  }
  let latest_by_reporter = latest
    .into_iter()
    .map(|(reporter, r)| LatestReport {
      reporter,
      risk_level: r.risk_level(),
      feeling: r.feeling_text(),
      workload: r.workload_text(),
      submitted_at: r.submitted_at,
    })
    .collect();

  SelfReportSummary {
    report_count: n,
    rejected_count: reports.len() - n,
    average_feeling: average(feeling_sum),
    average_workload: average(workload_sum),
    risk_levels,
    top_stress_factors,
    latest_by_reporter,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;

  fn report(email: &str, feeling: i64, workload: i64) -> SelfReport {
    SelfReport {
      user_email: Some(email.into()),
      feeling_score: feeling,
      workload_score: workload,
      stress_factors: Vec::new(),
      personal_circumstances: None,
      submitted_via: "slack".into(),
      is_anonymous: false,
      submitted_at: None,
    }
  }

  #[test]
  fn risk_level_bands() {
    assert_eq!(report("a@x.io", 5, 3).risk_level(), SelfReportRisk::Healthy);
    assert_eq!(report("a@x.io", 3, 4).risk_level(), SelfReportRisk::Fair);
    assert_eq!(report("a@x.io", 2, 3).risk_level(), SelfReportRisk::Poor);
    assert_eq!(report("a@x.io", 1, 2).risk_level(), SelfReportRisk::Critical);
  }

  #[test]
  fn text_labels() {
    let r = report("a@x.io", 1, 5);
    assert_eq!(r.feeling_text(), "Struggling");
    assert_eq!(r.workload_text(), "Very Manageable");
    assert_eq!(report("a@x.io", 9, 0).feeling_text(), "Unknown");
  }

  #[test]
  fn out_of_range_scores_rejected() {
    let err = report("a@x.io", 6, 3).validate().unwrap_err();
    assert!(err.to_string().contains("feeling_score"));
    let err = report("a@x.io", 3, 0).validate().unwrap_err();
    assert!(err.to_string().contains("workload_score"));
  }

  #[test]
  fn pseudonym_is_stable_and_case_insensitive() {
    let a = pseudonym("Ada@Example.com");
    let b = pseudonym("ada@example.com");
    assert_eq!(a, b);
    assert!(a.starts_with("anon-"));
    assert_eq!(a.len(), "anon-".len() + 16);
    assert_ne!(a, pseudonym("grace@example.com"));
  }

  #[test]
  fn summary_counts_and_averages() {
    let mut a = report("ada@x.io", 2, 1);
    a.stress_factors = vec!["incident_volume".into(), "work_hours".into()];
    let mut b = report("bo@x.io", 4, 5);
    b.stress_factors = vec!["Incident_Volume".into()];
    let bad = report("cy@x.io", 0, 3);

    let summary = summarize_reports(&[a, b, bad]);
    assert_eq!(summary.report_count, 2);
    assert_eq!(summary.rejected_count, 1);
    assert_eq!(summary.average_feeling, 3.0);
    assert_eq!(summary.average_workload, 3.0);
    assert_eq!(summary.risk_levels["critical"], 1);
    assert_eq!(summary.risk_levels["healthy"], 1);
    assert_eq!(summary.risk_levels["fair"], 0);
    assert_eq!(summary.top_stress_factors[0].factor, "incident_volume");
    assert_eq!(summary.top_stress_factors[0].count, 2);
  }

  #[test]
  fn latest_report_per_reporter_wins() {
    let mut older = report("ada@x.io", 1, 1);
    older.submitted_at = Some(Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap());
    let mut newer = report("ADA@x.io", 5, 5);
    newer.submitted_at = Some(Utc.with_ymd_and_hms(2025, 3, 2, 9, 0, 0).unwrap());

    let summary = summarize_reports(&[newer, older]);
    assert_eq!(summary.latest_by_reporter.len(), 1);
    assert_eq!(summary.latest_by_reporter[0].reporter, "ada@x.io");
    assert_eq!(summary.latest_by_reporter[0].risk_level, SelfReportRisk::Healthy);
  }

  #[test]
  fn anonymous_reporters_are_pseudonymized() {
    let mut r = report("ada@x.io", 3, 3);
    r.is_anonymous = true;
    let summary = summarize_reports(&[r]);
    assert!(summary.latest_by_reporter[0].reporter.starts_with("anon-"));
  }

  #[test]
  fn empty_batch() {
    let summary = summarize_reports(&[]);
    assert_eq!(summary.report_count, 0);
    assert_eq!(summary.average_feeling, 0.0);
    assert!(summary.latest_by_reporter.is_empty());
  }
}
