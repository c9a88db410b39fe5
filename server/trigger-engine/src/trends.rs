//! Week-bucketed item/symptom counts for trend charts.

use chrono::{DateTime, Duration, Utc};

use crate::extract;
use crate::types::{DiaryEntry, TrendPoint};

/// Split `[now - weeks*7d, now)` into `weeks` half-open 7-day buckets,
/// oldest first, counting matching consumables and symptoms in each.
///
/// Always returns exactly `weeks` points. Bucket bounds saturate at the
/// ends of the representable range instead of overflowing.
pub fn weekly_trend(
  entries: &[DiaryEntry],
  item_name: &str,
  symptom_type: &str,
  weeks: u32,
  now: DateTime<Utc>,
) -> Vec<TrendPoint> {
  let start = now
    .checked_sub_signed(weeks_span(i64::from(weeks)))
    .unwrap_or(DateTime::<Utc>::MIN_UTC);

  (0..weeks)
    .map(|w| {
      let week_start = start
        .checked_add_signed(weeks_span(i64::from(w)))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);
      let week_end = week_start
        .checked_add_signed(weeks_span(1))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);
      let in_bucket = |e: &&DiaryEntry| e.timestamp >= week_start && e.timestamp < week_end;

      let item_count = entries
        .iter()
        .filter(in_bucket)
        .filter(|e| e.is_consumable() && extract::entry_label(e) == Some(item_name))
        .count();
      let symptom_count = entries
        .iter()
        .filter(in_bucket)
        .filter(|e| e.symptom().is_some_and(|s| s.symptom_type == symptom_type))
        .count();

      TrendPoint {
        label: format!("Week {}", w + 1),
        week_start,
        symptom_count,
        item_count,
      }
    })
    .collect()
}

fn weeks_span(weeks: i64) -> Duration {
  weeks
    .checked_mul(7)
    .and_then(Duration::try_days)
    .unwrap_or(Duration::MAX)
}
