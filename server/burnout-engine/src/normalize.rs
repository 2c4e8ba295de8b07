//! Lenient decoding of upstream analysis records.
//!
//! The analysis API hands over loosely typed JSON. Individual numeric fields
//! that are missing, null or non-numeric read as absent; whole records that
//! cannot be decoded are dropped instead of failing the batch.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::debug;

use crate::types::{DailyTrend, Member};

/// Decode every record that can be decoded; skip the rest.
pub fn parse_records<T: DeserializeOwned>(values: &[Value], kind: &str) -> Vec<T> {
  values
    .iter()
    .enumerate()
    .filter_map(|(idx, value)| match T::deserialize(value) {
      Ok(record) => Some(record),
      Err(e) => {
        debug!(kind, idx, error = %e, "dropping malformed record");
        None
      }
    })
    .collect()
}

pub fn parse_members(values: &[Value]) -> Vec<Member> {
  parse_records(values, "member")
}

pub fn parse_trends(values: &[Value]) -> Vec<DailyTrend> {
  parse_records(values, "daily_trend")
}

/// Read a score from a JSON value: numbers as-is, numeric strings parsed,
/// anything else (including NaN/inf) is absent.
pub fn value_as_f64(value: &Value) -> Option<f64> {
  let v = match value {
    Value::Number(n) => n.as_f64(),
    Value::String(s) => s.trim().parse::<f64>().ok(),
    _ => None,
  };
  v.filter(|v| v.is_finite())
}

pub(crate) fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
  D: Deserializer<'de>,
{
  let value = Value::deserialize(deserializer)?;
  Ok(value_as_f64(&value))
}

pub(crate) fn lenient_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
  D: Deserializer<'de>,
{
  let value = Value::deserialize(deserializer)?;
  Ok(
    value_as_f64(&value)
      .filter(|v| *v >= 0.0)
      .map(|v| v.round() as u64)
      .unwrap_or(0),
  )
}

pub(crate) fn default_on_null<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
  D: Deserializer<'de>,
  T: Deserialize<'de> + Default,
{
  Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
