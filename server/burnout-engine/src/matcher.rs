//! Map team members onto integration accounts (Linear, Jira, GitHub).
//!
//! Exact email match first; otherwise fuzzy name similarity using the
//! Ratcliff/Obershelp ratio with first/last name component boosts.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// A user as listed by an integration workspace.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct IntegrationUser {
  pub id: String,
  #[serde(default)]
  pub email: Option<String>,
  #[serde(default)]
  pub name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
  Email,
  Name,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
  pub user_id: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
  pub confidence: f64,
  pub strategy: MatchStrategy,
}

/// Similarity in [0, 1]: `2 * matched / (len(a) + len(b))`.
///
/// Matched characters come from recursively taking the longest common
/// block and recursing on both sides of it. Two empty strings are identical.
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
  let a: Vec<char> = a.chars().collect();
  let b: Vec<char> = b.chars().collect();
  let total = a.len() + b.len();
  if total == 0 {
    return 1.0;
  }
  2.0 * matching_chars(&a, &b) as f64 / total as f64
}

fn matching_chars(a: &[char], b: &[char]) -> usize {
  let mut matched = 0;
  let mut pending = vec![(0, a.len(), 0, b.len())];
  while let Some((alo, ahi, blo, bhi)) = pending.pop() {
    let (i, j, k) = longest_match(a, b, alo, ahi, blo, bhi);
    if k == 0 {
      continue;
    }
    matched += k;
    if alo < i && blo < j {
      pending.push((alo, i, blo, j));
    }
    if i + k < ahi && j + k < bhi {
      pending.push((i + k, ahi, j + k, bhi));
    }
  }
  matched
}

/// Longest common block of `a[alo..ahi]` and `b[blo..bhi]`, earliest on ties.
fn longest_match(a: &[char], b: &[char], alo: usize, ahi: usize, blo: usize, bhi: usize) -> (usize, usize, usize) {
  let width = bhi - blo;
  let mut best = (alo, blo, 0);
  // prev[jj]: length of the common run ending at (i - 1, blo + jj - 1).
  let mut prev = vec![0usize; width + 1];
  for i in alo..ahi {
    let mut cur = vec![0usize; width + 1];
    for jj in 1..=width {
      if a[i] == b[blo + jj - 1] {
        let k = prev[jj - 1] + 1;
        cur[jj] = k;
        if k > best.2 {
          best = (i + 1 - k, blo + jj - k, k);
        }
      }
    }
    prev = cur;
  }
  best
}

fn usable(user: &IntegrationUser) -> Option<(&str, String)> {
  let name = user.name.as_deref()?.trim();
  if name.is_empty() || user.id.is_empty() {
    return None;
  }
  Some((user.id.as_str(), name.to_lowercase()))
}

/// Match a team email to an integration user.
pub fn match_email(team_email: &str, users: &[IntegrationUser], threshold: f64) -> Option<MatchResult> {
  let email_lower = team_email.trim().to_lowercase();

  if let Some(user) = users.iter().find(|u| {
    u.email
      .as_deref()
      .is_some_and(|e| e.trim().to_lowercase() == email_lower)
  }) {
    debug!(email = team_email, user_id = %user.id, "email match");
    return Some(MatchResult {
      user_id: user.id.clone(),
      name: user.name.clone(),
      confidence: 1.0,
      strategy: MatchStrategy::Email,
    });
  }

  let local = email_lower.split('@').next().unwrap_or_default();
  let email_parts: Vec<&str> = local.split('.').collect();

  best_by_name(users, threshold, |name| {
    let name_parts: Vec<&str> = name.split_whitespace().collect();
    let mut score = similarity_ratio(local, name);

    if let (Some(first), Some(name_first)) = (email_parts.first(), name_parts.first()) {
      if !first.is_empty() {
        score = score.max(similarity_ratio(first, name_first) * 0.85);
      }
    }

    if email_parts.len() >= 2 && name_parts.len() >= 2 {
      let last = email_parts[email_parts.len() - 1];
      let name_last = name_parts[name_parts.len() - 1];
      if !last.is_empty() && similarity_ratio(last, name_last) > 0.85 {
        score = score.max(0.75);
      }
    }

    score
  })
}

/// Match a display name (e.g. "John Doe") to an integration user.
pub fn match_name(team_name: &str, users: &[IntegrationUser], threshold: f64) -> Option<MatchResult> {
  let team_lower = team_name.trim().to_lowercase();
  let team_parts: Vec<&str> = team_lower.split_whitespace().collect();

  best_by_name(users, threshold, |name| {
    let mut score = similarity_ratio(&team_lower, name);
    let name_parts = name.split_whitespace().count();
    if team_parts.len() >= 2 && name_parts >= 2 {
      let first = team_parts[0];
      let last = team_parts[team_parts.len() - 1];
      // Order-insensitive: "Doe, John" still counts.
      if name.contains(first) && name.contains(last) {
        score = score.max(0.80);
      }
    }
    score
  })
}

fn best_by_name<F>(users: &[IntegrationUser], threshold: f64, score_fn: F) -> Option<MatchResult>
where
  F: Fn(&str) -> f64,
{
  let mut best: Option<MatchResult> = None;
  for user in users {
    let Some((id, name)) = usable(user) else {
      continue;
    };
    let score = score_fn(&name);
    let best_score = best.as_ref().map_or(0.0, |b| b.confidence);
    if score > best_score && score >= threshold {
      best = Some(MatchResult {
        user_id: id.to_string(),
        name: user.name.clone(),
        confidence: score,
        strategy: MatchStrategy::Name,
      });
    }
  }
  if let Some(m) = &best {
    debug!(user_id = %m.user_id, confidence = m.confidence, "name match");
  }
  best
}

#[cfg(test)]
mod tests {
  use super::*;

  fn user(id: &str, email: Option<&str>, name: Option<&str>) -> IntegrationUser {
    IntegrationUser {
      id: id.into(),
      email: email.map(Into::into),
      name: name.map(Into::into),
    }
  }

  #[test]
  fn ratio_matches_reference_values() {
    assert!((similarity_ratio("abcd", "bcde") - 0.75).abs() < 1e-9);
    assert_eq!(similarity_ratio("", ""), 1.0);
    assert_eq!(similarity_ratio("abc", ""), 0.0);
    assert_eq!(similarity_ratio("same", "same"), 1.0);
    assert!((similarity_ratio("jane.doe", "jane doe") - 0.875).abs() < 1e-9);
  }

  #[test]
  fn exact_email_wins_with_full_confidence() {
    let users = vec![
      user("u1", Some("someone@x.io"), Some("Jane Doe")),
      user("u2", Some("Jane.Doe@X.io"), Some("J. Doe")),
    ];
    let m = match_email("jane.doe@x.io", &users, 0.7).unwrap();
    assert_eq!(m.user_id, "u2");
    assert_eq!(m.confidence, 1.0);
    assert_eq!(m.strategy, MatchStrategy::Email);
  }

  #[test]
  fn falls_back_to_name_similarity() {
    let users = vec![
      user("u1", None, Some("Robert Smith")),
      user("u2", Some("other@x.io"), Some("Jane Doe")),
    ];
    let m = match_email("jane.doe@corp.io", &users, 0.7).unwrap();
    assert_eq!(m.user_id, "u2");
    assert_eq!(m.strategy, MatchStrategy::Name);
    assert!(m.confidence >= 0.7 && m.confidence < 1.0);
  }

  #[test]
  fn last_name_component_boost() {
    // Full-string ratio is low, but "doe" matches exactly.
    let users = vec![user("u1", None, Some("Jonathan Doe"))];
    let m = match_email("j.doe@corp.io", &users, 0.7).unwrap();
    assert_eq!(m.user_id, "u1");
    assert!(m.confidence >= 0.75);
  }

  #[test]
  fn no_match_below_threshold() {
    let users = vec![user("u1", None, Some("Zed Quinn")), user("", None, Some("Jane Doe"))];
    assert!(match_email("jane.doe@corp.io", &users, 0.7).is_none());
  }

  #[test]
  fn name_match_is_order_insensitive() {
    let users = vec![user("u1", None, Some("Doe, John")), user("u2", None, Some("Mary Major"))];
    let m = match_name("John Doe", &users, 0.7).unwrap();
    assert_eq!(m.user_id, "u1");
    assert!(m.confidence >= 0.8);
  }

  #[test]
  fn zero_similarity_never_matches() {
    let users = vec![user("u1", None, Some("abc"))];
    assert!(match_name("zzz", &users, 0.0).is_none());
    assert_eq!(match_name("abc", &users, 0.0).unwrap().user_id, "u1");
  }
}
