//! Daily trend series and causal smoothing.

use crate::score::round_half_up;
use crate::types::{DailyTrend, TrendMetric, TrendPoint};

/// Trailing running average over at most `window` samples, rounded half up.
///
/// Point `i` averages `scores[max(0, i + 1 - window)..=i]`: the window grows
/// until it holds `window` samples, then slides. Never looks ahead.
pub fn running_average(scores: &[f64], window: usize) -> Vec<i64> {
  let window = window.max(1);
  (0..scores.len())
    .map(|i| {
      let start = (i + 1).saturating_sub(window);
      let slice = &scores[start..=i];
      let sum: f64 = slice.iter().sum();
      round_half_up(sum / slice.len() as f64)
    })
    .collect()
}

/// Raw daily value of `metric`; missing scores read as 0.
pub fn metric_value(trend: &DailyTrend, metric: TrendMetric) -> f64 {
  match metric {
    TrendMetric::HealthScore => trend.overall_score.unwrap_or(0.0),
    TrendMetric::IncidentCount => trend.incident_count as f64,
    TrendMetric::AfterHoursCount => trend.after_hours_count as f64,
    TrendMetric::SeverityWeightedCount => trend.severity_weighted_count.unwrap_or(0.0),
    TrendMetric::MembersAtRisk => trend.members_at_risk as f64,
  }
}

/// Chart points for one metric in date order.
///
/// Only the health score is smoothed; every other metric shows raw daily values.
pub fn trend_series(trends: &[DailyTrend], metric: TrendMetric, window: usize) -> Vec<TrendPoint> {
  let mut ordered: Vec<&DailyTrend> = trends.iter().collect();
  ordered.sort_by_key(|t| t.date);

  let raw: Vec<f64> = ordered.iter().map(|t| metric_value(t, metric)).collect();
  let values: Vec<f64> = match metric {
    TrendMetric::HealthScore => running_average(&raw, window)
      .into_iter()
      .map(|v| v as f64)
      .collect(),
    _ => raw.clone(),
  };

  ordered
    .iter()
    .zip(values)
    .zip(raw)
    .map(|((trend, value), raw)| TrendPoint {
      date: trend.date,
      value,
      raw,
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::NaiveDate;

  fn day(d: u32, overall: f64, incidents: u64) -> DailyTrend {
    DailyTrend {
      date: NaiveDate::from_ymd_opt(2025, 3, d).unwrap(),
      incident_count: incidents,
      after_hours_count: 0,
      severity_weighted_count: None,
      overall_score: Some(overall),
      members_at_risk: 0,
    }
  }

  #[test]
  fn growing_then_trailing_window() {
    let scores = [10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0];
    let avg = running_average(&scores, 7);
    assert_eq!(avg.len(), 8);
    assert_eq!(avg[0], 10);
    assert_eq!(avg[1], 15);
    assert_eq!(avg[6], 40);
    // 20..=80
    assert_eq!(avg[7], 50);
  }

  #[test]
  fn average_is_causal() {
    let base = [50.0, 60.0, 70.0];
    let extended = [50.0, 60.0, 70.0, 1000.0];
    let a = running_average(&base, 7);
    let b = running_average(&extended, 7);
    assert_eq!(a[..], b[..3]);
  }

  #[test]
  fn empty_input_gives_empty_output() {
    assert!(running_average(&[], 7).is_empty());
  }

  #[test]
  fn zero_window_treated_as_one() {
    assert_eq!(running_average(&[3.0, 9.0], 0), vec![3, 9]);
  }

  #[test]
  fn health_series_is_smoothed_and_date_ordered() {
    let trends = vec![day(3, 30.0, 1), day(1, 10.0, 5), day(2, 20.0, 3)];
    let series = trend_series(&trends, TrendMetric::HealthScore, 7);
    let dates: Vec<u32> = series.iter().map(|p| chrono::Datelike::day(&p.date)).collect();
    assert_eq!(dates, vec![1, 2, 3]);
    assert_eq!(series[1].value, 15.0);
    assert_eq!(series[1].raw, 20.0);
    assert_eq!(series[2].value, 20.0);
  }

  #[test]
  fn other_metrics_are_raw() {
    let trends = vec![day(1, 10.0, 5), day(2, 20.0, 3)];
    let series = trend_series(&trends, TrendMetric::IncidentCount, 7);
    assert_eq!(series[0].value, 5.0);
    assert_eq!(series[1].value, 3.0);
  }

  #[test]
  fn fractional_metrics_are_not_rounded() {
    let mut trend = day(1, 10.0, 0);
    trend.severity_weighted_count = Some(2.37);
    let series = trend_series(&[trend], TrendMetric::SeverityWeightedCount, 7);
    assert_eq!(series[0].value, 2.37);
    assert_eq!(series[0].raw, 2.37);
  }
}
