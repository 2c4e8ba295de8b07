//! Burnout factor aggregation: who is at risk on a factor, and how to label them.

use crate::config::Config;
use crate::score::{classify, level_color, round_half_up, tier_color};
use crate::types::{AffectedMember, FactorCount, Member, OcbLevel, RiskFactor, RiskLevel, Tag, TagKind};

/// Factor score on the 0-100 display scale: `round(raw * 10)`.
pub fn risk_score(member: &Member, factor: RiskFactor) -> i64 {
  round_half_up(member.factors.get(factor) * 10.0)
}

/// Members at medium or high risk on `factor`, highest risk first.
///
/// Members without an OCB score are skipped regardless of factor values.
/// Ties are broken by display name so output is deterministic.
pub fn affected_members(members: &[Member], factor: RiskFactor, config: &Config) -> Vec<AffectedMember> {
  let thresholds = &config.factor_thresholds;

  let mut affected: Vec<AffectedMember> = members
    .iter()
    .filter_map(|member| {
      let ocb_score = member.ocb_score?;
      let score = risk_score(member, factor);
      let level = classify(score as f64, thresholds);
      if level == RiskLevel::Low {
        return None;
      }

      Some(AffectedMember {
        user_name: member.display_name().to_string(),
        user_email: member.user_email.clone(),
        ocb_score,
        ocb_level: OcbLevel::from_score(ocb_score),
        factor,
        factor_value: member.factors.get(factor),
        risk_score: score,
        risk_level: level,
        tags: vulnerability_tags(member, factor, config),
      })
    })
    .collect();

  affected.sort_by(|a, b| {
    b.risk_score
      .cmp(&a.risk_score)
      .then_with(|| a.user_name.cmp(&b.user_name))
  });

  affected
}

/// Up to three display tags: risk level, OCB score, factor score.
///
/// The risk-level tag is only present at medium risk or above; the OCB tag
/// only when the member has an OCB score.
pub fn vulnerability_tags(member: &Member, factor: RiskFactor, config: &Config) -> Vec<Tag> {
  let score = risk_score(member, factor);
  let level = classify(score as f64, &config.factor_thresholds);
  let mut tags = Vec::with_capacity(3);

  if level != RiskLevel::Low {
    tags.push(Tag::new(TagKind::RiskLevel, level.label(), level_color(level)));
  }

  if let Some(ocb) = member.ocb_score {
    tags.push(Tag::new(
      TagKind::OcbScore,
      format!("OCB: {}", round_half_up(ocb)),
      tier_color(ocb),
    ));
  }

  tags.push(Tag::new(
    TagKind::FactorScore,
    format!("{}: {}", factor.label(), score),
    tier_color(score as f64),
  ));

  tags
}

/// Affected counts for every factor, most affected first.
pub fn factor_breakdown(members: &[Member], config: &Config) -> Vec<FactorCount> {
  let mut counts: Vec<FactorCount> = RiskFactor::ALL
    .iter()
    .map(|&factor| FactorCount {
      factor,
      affected: affected_members(members, factor, config).len(),
    })
    .collect();
  counts.sort_by(|a, b| b.affected.cmp(&a.affected).then_with(|| a.factor.cmp(&b.factor)));
  counts
}
