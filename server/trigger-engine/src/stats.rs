//! Summary statistics and hour-of-day symptom histogram.

use std::collections::HashSet;

use chrono::{FixedOffset, NaiveDate, Timelike};

use crate::config::Config;
use crate::types::DiaryEntry;

/// Distinct local calendar days with at least one entry.
pub fn tracked_days(entries: &[DiaryEntry], offset: FixedOffset) -> usize {
  entries
    .iter()
    .map(|e| e.timestamp.with_timezone(&offset).date_naive())
    .collect::<HashSet<NaiveDate>>()
    .len()
}

/// Logged entries relative to `entries_per_complete_day` per tracked day,
/// capped at 100. No tracked days means 0.
pub fn data_completeness(total_entries: usize, tracked_days: usize, config: &Config) -> u8 {
  let expected = tracked_days as f64 * f64::from(config.entries_per_complete_day);
  if expected <= 0.0 {
    return 0;
  }
  (total_entries as f64 * 100.0 / expected).round().min(100.0) as u8
}

/// Symptom counts per local hour of day.
pub fn hourly_symptom_histogram(entries: &[DiaryEntry], offset: FixedOffset) -> [u32; 24] {
  let mut hours = [0u32; 24];
  for entry in entries.iter().filter(|e| e.symptom().is_some()) {
    let hour = entry.timestamp.with_timezone(&offset).hour() as usize;
    hours[hour] += 1;
  }
  hours
}

/// Hours (ascending) whose count is strictly above `ratio` × the peak hour.
/// A histogram with no symptoms has no high-risk hours.
pub fn high_risk_hours(histogram: &[u32; 24], ratio: f64) -> Vec<u32> {
  let max = histogram.iter().copied().max().unwrap_or(0);
  if max == 0 {
    return Vec::new();
  }
  let cutoff = f64::from(max) * ratio;
  histogram
    .iter()
    .enumerate()
    .filter(|(_, &count)| f64::from(count) > cutoff)
    .map(|(hour, _)| hour as u32)
    .collect()
}
