//! Engine configuration with sane defaults.

use chrono::{Duration, FixedOffset, Offset, Utc};

/// Env var overriding [`Config::utc_offset_minutes`].
pub const ENV_UTC_OFFSET: &str = "TRIGGER_ENGINE_UTC_OFFSET_MINUTES";
/// Env var overriding [`Config::correlation_window_hours`].
pub const ENV_WINDOW_HOURS: &str = "TRIGGER_ENGINE_WINDOW_HOURS";

/// Tunable thresholds for trigger analysis.
#[derive(Debug, Clone)]
pub struct Config {
  /// Lookback before a symptom in which a food/drink counts as a potential trigger.
  pub correlation_window_hours: i64,
  /// Items exposed fewer times than this are never reported.
  pub min_exposures: u32,
  /// Analysis window used when the caller gives none.
  pub default_timeframe_days: u32,
  /// Trend buckets used when the caller gives none.
  pub default_trend_weeks: u32,
  /// Largest trend a request may ask for (ten years of weeks).
  pub max_trend_weeks: u32,
  /// Summary counts triggers strictly above this percentage as "potential".
  pub potential_trigger_threshold: u8,
  /// Logged entries per day that count as 100% complete.
  pub entries_per_complete_day: u32,
  /// Hours with more than this fraction of the peak hour are high risk.
  pub high_risk_ratio: f64,
  /// Offset of the diarist's local zone, for calendar days and hours of day.
  pub utc_offset_minutes: i32,
  /// Report tier: "high" at or above this percentage.
  pub high_risk_percentage: u8,
  /// Report tier: "moderate" at or above this percentage.
  pub moderate_risk_percentage: u8,
  /// Max triggers listed in a report.
  pub report_top_triggers: usize,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      correlation_window_hours: 6,
      min_exposures: 3,
      default_timeframe_days: 30,
      default_trend_weeks: 4,
      max_trend_weeks: 520,
      potential_trigger_threshold: 50,
      entries_per_complete_day: 4,
      high_risk_ratio: 0.7,
      utc_offset_minutes: 0,
      high_risk_percentage: 70,
      moderate_risk_percentage: 50,
      report_top_triggers: 10,
    }
  }
}

impl Config {
  /// Defaults overlaid with any parseable `TRIGGER_ENGINE_*` env vars.
  pub fn from_env() -> Self {
    Self::from_lookup(|key| std::env::var(key).ok())
  }

  fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
    let mut config = Self::default();

    if let Some(raw) = lookup(ENV_UTC_OFFSET) {
      match raw.trim().parse::<i32>() {
        Ok(minutes) if minutes.checked_mul(60).and_then(FixedOffset::east_opt).is_some() => {
          config.utc_offset_minutes = minutes;
        }
        _ => tracing::warn!(var = ENV_UTC_OFFSET, value = %raw, "ignoring invalid utc offset"),
      }
    }

    if let Some(raw) = lookup(ENV_WINDOW_HOURS) {
      match raw.trim().parse::<i64>() {
        Ok(hours) if hours > 0 => config.correlation_window_hours = hours,
        _ => tracing::warn!(var = ENV_WINDOW_HOURS, value = %raw, "ignoring invalid window"),
      }
    }

    config
  }

  /// Lookback as a duration; absurdly large values saturate.
  pub fn correlation_window(&self) -> Duration {
    Duration::try_hours(self.correlation_window_hours.max(0)).unwrap_or(Duration::MAX)
  }

  /// The local zone as a fixed offset; out-of-range values fall back to UTC.
  pub fn local_offset(&self) -> FixedOffset {
    self
      .utc_offset_minutes
      .checked_mul(60)
      .and_then(FixedOffset::east_opt)
      .unwrap_or_else(|| Utc.fix())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashMap;

  fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
      .iter()
      .map(|(k, v)| (k.to_string(), v.to_string()))
      .collect();
    move |key: &str| map.get(key).cloned()
  }

  #[test]
  fn env_overrides_apply() {
    let config = Config::from_lookup(lookup_from(&[(ENV_UTC_OFFSET, "-300"), (ENV_WINDOW_HOURS, "4")]));
    assert_eq!(config.utc_offset_minutes, -300);
    assert_eq!(config.correlation_window_hours, 4);
    assert_eq!(config.local_offset().local_minus_utc(), -300 * 60);
  }

  #[test]
  fn invalid_env_values_keep_defaults() {
    let config = Config::from_lookup(lookup_from(&[(ENV_UTC_OFFSET, "east"), (ENV_WINDOW_HOURS, "0")]));
    assert_eq!(config.utc_offset_minutes, 0);
    assert_eq!(config.correlation_window_hours, 6);
  }

  #[test]
  fn out_of_range_offset_falls_back_to_utc() {
    let config = Config {
      utc_offset_minutes: 100_000,
      ..Config::default()
    };
    assert_eq!(config.local_offset().local_minus_utc(), 0);
  }
}
