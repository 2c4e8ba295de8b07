//! Engine configuration with sane defaults.

/// Medium/high cut-offs for one scored dimension.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
  pub medium: f64,
  pub high: f64,
}

impl Thresholds {
  pub const fn new(medium: f64, high: f64) -> Self {
    Self { medium, high }
  }
}

/// Fixed GitHub activity thresholds, independent of the factor scale.
#[derive(Debug, Clone)]
pub struct GithubThresholds {
  /// Share of commits made outside working hours, in percent.
  pub after_hours_percentage: Thresholds,
  pub commits_per_week: Thresholds,
  pub pull_requests: Thresholds,
  pub reviews: Thresholds,
}

impl Default for GithubThresholds {
  fn default() -> Self {
    Self {
      after_hours_percentage: Thresholds::new(15.0, 30.0),
      commits_per_week: Thresholds::new(15.0, 25.0),
      pull_requests: Thresholds::new(20.0, 40.0),
      reviews: Thresholds::new(30.0, 60.0),
    }
  }
}

/// Tunable thresholds for risk aggregation.
#[derive(Debug, Clone)]
pub struct Config {
  /// Factor risk cut-offs on the 0-100 display scale.
  pub factor_thresholds: Thresholds,
  /// Samples in the trailing health-score window.
  pub running_average_window: usize,
  /// Minimum similarity (0..1) for a fuzzy identity match.
  pub match_confidence_threshold: f64,
  pub github: GithubThresholds,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      factor_thresholds: Thresholds::new(50.0, 70.0),
      running_average_window: 7,
      match_confidence_threshold: 0.70,
      github: GithubThresholds::default(),
    }
  }
}
