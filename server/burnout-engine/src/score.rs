//! Shared scoring helpers: rounding, severity tiers, level classification.

use crate::config::Thresholds;
use crate::types::{OcbLevel, RiskLevel, TagColor};

/// Round to the nearest integer with halves going up (2.5 -> 3, -2.5 -> -2).
pub fn round_half_up(x: f64) -> i64 {
  (x + 0.5).floor() as i64
}

/// Round to `places` decimals for presentation.
pub fn round_to(x: f64, places: i32) -> f64 {
  let factor = 10f64.powi(places);
  (x * factor).round() / factor
}

/// Display color for a 0-100 score.
pub fn tier_color(score: f64) -> TagColor {
  if score < 30.0 {
    TagColor::Green
  } else if score < 50.0 {
    TagColor::Yellow
  } else if score < 70.0 {
    TagColor::Orange
  } else {
    TagColor::Red
  }
}

pub fn classify(value: f64, thresholds: &Thresholds) -> RiskLevel {
  if value >= thresholds.high {
    RiskLevel::High
  } else if value >= thresholds.medium {
    RiskLevel::Medium
  } else {
    RiskLevel::Low
  }
}

pub fn level_color(level: RiskLevel) -> TagColor {
  match level {
    RiskLevel::Low => TagColor::Green,
    RiskLevel::Medium => TagColor::Orange,
    RiskLevel::High => TagColor::Red,
  }
}

impl OcbLevel {
  pub fn from_score(score: f64) -> Self {
    if score < 25.0 {
      Self::Low
    } else if score < 50.0 {
      Self::Mild
    } else if score < 75.0 {
      Self::Moderate
    } else {
      Self::High
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn rounds_halves_up() {
    assert_eq!(round_half_up(49.5), 50);
    assert_eq!(round_half_up(49.49), 49);
    assert_eq!(round_half_up(2.5), 3);
    assert_eq!(round_half_up(-2.5), -2);
  }

  #[test]
  fn tier_boundaries() {
    assert_eq!(tier_color(0.0), TagColor::Green);
    assert_eq!(tier_color(29.9), TagColor::Green);
    assert_eq!(tier_color(30.0), TagColor::Yellow);
    assert_eq!(tier_color(50.0), TagColor::Orange);
    assert_eq!(tier_color(69.0), TagColor::Orange);
    assert_eq!(tier_color(70.0), TagColor::Red);
  }

  #[test]
  fn classify_uses_inclusive_cutoffs() {
    let t = Thresholds::new(50.0, 70.0);
    assert_eq!(classify(49.0, &t), RiskLevel::Low);
    assert_eq!(classify(50.0, &t), RiskLevel::Medium);
    assert_eq!(classify(70.0, &t), RiskLevel::High);
  }

  #[test]
  fn ocb_interpretation() {
    assert_eq!(OcbLevel::from_score(10.0), OcbLevel::Low);
    assert_eq!(OcbLevel::from_score(25.0), OcbLevel::Mild);
    assert_eq!(OcbLevel::from_score(60.21), OcbLevel::Moderate);
    assert_eq!(OcbLevel::from_score(75.0), OcbLevel::High);
  }
}
