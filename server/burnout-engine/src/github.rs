//! GitHub activity flags with their own fixed thresholds.

use crate::config::{Config, Thresholds};
use crate::score::{classify, level_color, round_half_up};
use crate::types::{GithubActivity, GithubAffectedMember, GithubMetric, Member, RiskLevel, Tag, TagKind};

impl GithubMetric {
  pub fn value(self, activity: &GithubActivity) -> f64 {
    match self {
      Self::AfterHours => activity.after_hours_commit_percentage.unwrap_or(0.0),
      Self::CommitFrequency => activity.commits_per_week.unwrap_or(0.0),
      Self::PrVolume => activity.total_pull_requests as f64,
      Self::ReviewLoad => activity.total_reviews as f64,
    }
  }

  /// Sort key. After-hours weighs the raw commit count double and adds the percentage.
  pub fn contribution_score(self, activity: &GithubActivity) -> f64 {
    match self {
      Self::AfterHours => activity.after_hours_commits as f64 * 2.0 + self.value(activity),
      _ => self.value(activity),
    }
  }

  pub fn thresholds(self, config: &Config) -> Thresholds {
    let t = &config.github;
    match self {
      Self::AfterHours => t.after_hours_percentage,
      Self::CommitFrequency => t.commits_per_week,
      Self::PrVolume => t.pull_requests,
      Self::ReviewLoad => t.reviews,
    }
  }

  fn value_label(self, activity: &GithubActivity) -> String {
    let v = round_half_up(self.value(activity));
    match self {
      Self::AfterHours => format!("After Hours: {}%", v),
      Self::CommitFrequency => format!("Commits/Week: {}", v),
      Self::PrVolume => format!("PRs: {}", v),
      Self::ReviewLoad => format!("Reviews: {}", v),
    }
  }

  fn supporting_label(self, activity: &GithubActivity) -> Option<String> {
    let (label, count) = match self {
      Self::AfterHours => ("After-Hours Commits", activity.after_hours_commits),
      Self::CommitFrequency => ("Total Commits", activity.total_commits),
      Self::PrVolume => ("Reviews", activity.total_reviews),
      Self::ReviewLoad => ("PRs", activity.total_pull_requests),
    };
    (count > 0).then(|| format!("{}: {}", label, count))
  }
}

/// Members flagged on a GitHub metric, highest contribution score first.
///
/// Members without GitHub activity are skipped.
pub fn github_affected_members(
  members: &[Member],
  metric: GithubMetric,
  config: &Config,
) -> Vec<GithubAffectedMember> {
  let thresholds = metric.thresholds(config);

  let mut affected: Vec<GithubAffectedMember> = members
    .iter()
    .filter_map(|member| {
      let activity = member.github_activity.as_ref()?;
      let value = metric.value(activity);
      let level = classify(value, &thresholds);
      if level == RiskLevel::Low {
        return None;
      }
      Some(GithubAffectedMember {
        user_name: member.display_name().to_string(),
        user_email: member.user_email.clone(),
        metric,
        metric_value: value,
        contribution_score: metric.contribution_score(activity),
        risk_level: level,
        tags: github_vulnerability_tags(member, metric, config),
      })
    })
    .collect();

  affected.sort_by(|a, b| {
    b.contribution_score
      .partial_cmp(&a.contribution_score)
      .unwrap_or(std::cmp::Ordering::Equal)
      .then_with(|| a.user_name.cmp(&b.user_name))
  });

  affected
}

/// Up to three tags: risk level, metric value, supporting count.
pub fn github_vulnerability_tags(member: &Member, metric: GithubMetric, config: &Config) -> Vec<Tag> {
  let activity = match &member.github_activity {
    Some(a) => a,
    None => return Vec::new(),
  };
  let level = classify(metric.value(activity), &metric.thresholds(config));
  let color = level_color(level);
  let mut tags = Vec::with_capacity(3);

  if level != RiskLevel::Low {
    tags.push(Tag::new(TagKind::RiskLevel, level.label(), color));
  }
  tags.push(Tag::new(TagKind::MetricValue, metric.value_label(activity), color));
  if let Some(label) = metric.supporting_label(activity) {
    tags.push(Tag::new(TagKind::SupportingCount, label, color));
  }

  tags
}
