//! On-call roster cache. Entries live until the next UTC midnight, since
//! schedules follow daily patterns.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use tracing::{debug, info};

/// Source of "now"; injected so expiry can be tested.
pub trait Clock: Send + Sync {
  fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> DateTime<Utc> {
    Utc::now()
  }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
  now: RwLock<DateTime<Utc>>,
}

impl ManualClock {
  pub fn new(now: DateTime<Utc>) -> Self {
    Self {
      now: RwLock::new(now),
    }
  }

  pub fn advance(&self, by: Duration) {
    let mut now = self.now.write();
    *now = *now + by;
  }
}

impl Clock for ManualClock {
  fn now(&self) -> DateTime<Utc> {
    *self.now.read()
  }
}

/// Cache key for today's roster: `oncall:{integration_id}:{YYYY-MM-DD}`.
pub fn cache_key(integration_id: &str, now: DateTime<Utc>) -> String {
  format!("oncall:{}:{}", integration_id, now.format("%Y-%m-%d"))
}

pub fn next_midnight(now: DateTime<Utc>) -> DateTime<Utc> {
  now
    .date_naive()
    .succ_opt()
    .and_then(|d| d.and_hms_opt(0, 0, 0))
    .map(|dt| dt.and_utc())
    .unwrap_or_else(|| now + Duration::days(1))
}

pub fn seconds_until_midnight(now: DateTime<Utc>) -> i64 {
  (next_midnight(now) - now).num_seconds()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheInfo {
  pub key: String,
  pub cached_at: DateTime<Utc>,
  pub expires_at: DateTime<Utc>,
  pub ttl_seconds: i64,
  pub user_count: usize,
}

/// Storage for per-integration on-call email sets.
pub trait OnCallCache: Send + Sync {
  /// Today's cached emails, or `None` on a miss.
  fn get(&self, integration_id: &str) -> Option<BTreeSet<String>>;
  /// Cache emails until the next UTC midnight.
  fn set(&self, integration_id: &str, emails: BTreeSet<String>) -> CacheInfo;
  /// Drop today's entry. Returns whether one existed.
  fn clear(&self, integration_id: &str) -> bool;
  fn info(&self, integration_id: &str) -> Option<CacheInfo>;
  /// Emails and metadata read from a single snapshot of today's entry.
  fn lookup(&self, integration_id: &str) -> Option<(BTreeSet<String>, CacheInfo)>;
}

#[derive(Debug, Clone)]
struct Entry {
  emails: BTreeSet<String>,
  cached_at: DateTime<Utc>,
  expires_at: DateTime<Utc>,
}

pub struct InMemoryOnCallCache<C: Clock = SystemClock> {
  clock: C,
  entries: RwLock<HashMap<String, Entry>>,
}

impl InMemoryOnCallCache<SystemClock> {
  pub fn new() -> Self {
    Self::with_clock(SystemClock)
  }
}

impl Default for InMemoryOnCallCache<SystemClock> {
  fn default() -> Self {
    Self::new()
  }
}

impl<C: Clock> InMemoryOnCallCache<C> {
  pub fn with_clock(clock: C) -> Self {
    Self {
      clock,
      entries: RwLock::new(HashMap::new()),
    }
  }

  pub fn clock(&self) -> &C {
    &self.clock
  }

  fn live_entry(&self, integration_id: &str) -> Option<(String, Entry, DateTime<Utc>)> {
    let now = self.clock.now();
    let key = cache_key(integration_id, now);
    let entries = self.entries.read();
    entries
      .get(&key)
      .filter(|e| e.expires_at > now)
      .map(|e| (key.clone(), e.clone(), now))
  }
}

fn info_for(key: String, entry: &Entry, now: DateTime<Utc>) -> CacheInfo {
  CacheInfo {
    key,
    cached_at: entry.cached_at,
    expires_at: entry.expires_at,
    ttl_seconds: (entry.expires_at - now).num_seconds(),
    user_count: entry.emails.len(),
  }
}

impl<C: Clock> OnCallCache for InMemoryOnCallCache<C> {
  fn get(&self, integration_id: &str) -> Option<BTreeSet<String>> {
    match self.live_entry(integration_id) {
      Some((key, entry, _)) => {
        debug!(%key, users = entry.emails.len(), "on-call cache hit");
        Some(entry.emails)
      }
      None => {
        debug!(integration_id, "on-call cache miss");
        None
      }
    }
  }

  fn set(&self, integration_id: &str, emails: BTreeSet<String>) -> CacheInfo {
    let now = self.clock.now();
    let key = cache_key(integration_id, now);
    let expires_at = next_midnight(now);
    let user_count = emails.len();

    let mut entries = self.entries.write();
    entries.retain(|_, e| e.expires_at > now);
    entries.insert(
      key.clone(),
      Entry {
        emails,
        cached_at: now,
        expires_at,
      },
    );

    let ttl_seconds = (expires_at - now).num_seconds();
    info!(%key, users = user_count, ttl_seconds, "cached on-call users");
    CacheInfo {
      key,
      cached_at: now,
      expires_at,
      ttl_seconds,
      user_count,
    }
  }

  fn clear(&self, integration_id: &str) -> bool {
    let key = cache_key(integration_id, self.clock.now());
    let removed = self.entries.write().remove(&key).is_some();
    info!(%key, removed, "cleared on-call cache");
    removed
  }

  fn info(&self, integration_id: &str) -> Option<CacheInfo> {
    self
      .live_entry(integration_id)
      .map(|(key, entry, now)| info_for(key, &entry, now))
  }

  fn lookup(&self, integration_id: &str) -> Option<(BTreeSet<String>, CacheInfo)> {
    let (key, entry, now) = self.live_entry(integration_id)?;
    let info = info_for(key, &entry, now);
    debug!(key = %info.key, users = info.user_count, "on-call cache lookup");
    Some((entry.emails, info))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;

  fn at(h: u32, m: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 15, h, m, 0).unwrap()
  }

  fn emails(list: &[&str]) -> BTreeSet<String> {
    list.iter().map(|s| s.to_string()).collect()
  }

  #[test]
  fn key_includes_utc_date() {
    assert_eq!(cache_key("pd-42", at(23, 59)), "oncall:pd-42:2025-01-15");
  }

  #[test]
  fn ttl_runs_to_midnight() {
    assert_eq!(seconds_until_midnight(at(23, 0)), 3600);
    assert_eq!(seconds_until_midnight(at(0, 0)), 86_400);
  }

  #[test]
  fn set_then_get_hits() {
    let cache = InMemoryOnCallCache::with_clock(ManualClock::new(at(9, 0)));
    let info = cache.set("rootly-1", emails(&["a@x.io", "b@x.io"]));
    assert_eq!(info.user_count, 2);
    assert_eq!(info.ttl_seconds, 15 * 3600);
    assert_eq!(cache.get("rootly-1"), Some(emails(&["a@x.io", "b@x.io"])));
    assert!(cache.get("rootly-2").is_none());
  }

  #[test]
  fn entry_expires_at_midnight() {
    let cache = InMemoryOnCallCache::with_clock(ManualClock::new(at(22, 0)));
    cache.set("pd-1", emails(&["a@x.io"]));
    cache.clock().advance(Duration::minutes(119));
    assert!(cache.get("pd-1").is_some());
    cache.clock().advance(Duration::minutes(2));
    assert!(cache.get("pd-1").is_none());
    assert!(cache.info("pd-1").is_none());
  }

  #[test]
  fn clear_removes_entry() {
    let cache = InMemoryOnCallCache::with_clock(ManualClock::new(at(9, 0)));
    cache.set("pd-1", emails(&["a@x.io"]));
    assert!(cache.clear("pd-1"));
    assert!(!cache.clear("pd-1"));
    assert!(cache.get("pd-1").is_none());
  }

  #[test]
  fn info_reports_remaining_ttl() {
    let cache = InMemoryOnCallCache::with_clock(ManualClock::new(at(12, 0)));
    cache.set("pd-1", emails(&["a@x.io", "b@x.io", "c@x.io"]));
    cache.clock().advance(Duration::hours(2));
    let info = cache.info("pd-1").unwrap();
    assert_eq!(info.ttl_seconds, 10 * 3600);
    assert_eq!(info.user_count, 3);
    assert_eq!(info.cached_at, at(12, 0));
  }

  #[test]
  fn lookup_returns_emails_with_info() {
    let cache = InMemoryOnCallCache::with_clock(ManualClock::new(at(23, 0)));
    assert!(cache.lookup("pd-1").is_none());
    cache.set("pd-1", emails(&["a@x.io", "b@x.io"]));
    let (found, info) = cache.lookup("pd-1").unwrap();
    assert_eq!(found, emails(&["a@x.io", "b@x.io"]));
    assert_eq!(info.user_count, found.len());
    assert_eq!(info.ttl_seconds, 3600);
    cache.clock().advance(Duration::hours(1));
    assert!(cache.lookup("pd-1").is_none());
  }
}
