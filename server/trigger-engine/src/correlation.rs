//! Link food/drink exposures to later symptom episodes.
//!
//! Every consumable in the analysis window counts as one exposure per item
//! name it contributes. A symptom credits each distinct item consumed within
//! the lookback (inclusive on both ends, never after the symptom) once.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};

use crate::config::Config;
use crate::extract;
use crate::types::{DiaryEntry, ItemExposure, ItemType, Timeframe, TriggerCorrelation};

/// Exposure counts keyed by exact, case-sensitive item name.
/// Rows keep first-seen order so ties rank stably.
#[derive(Debug, Default)]
pub struct ExposureTracker {
  index: HashMap<String, usize>,
  rows: Vec<ItemExposure>,
}

impl ExposureTracker {
  pub fn new() -> Self {
    Self::default()
  }

  /// Count one exposure, creating the row on first sight.
  pub fn record_exposure(&mut self, name: &str, item_type: ItemType) {
    let idx = match self.index.get(name) {
      Some(&idx) => idx,
      None => {
        self.rows.push(ItemExposure::new(name, item_type));
        self.index.insert(name.to_string(), self.rows.len() - 1);
        self.rows.len() - 1
      }
    };
    self.rows[idx].total_exposures += 1;
  }

  /// Credit a symptom episode to an already-tracked item.
  pub fn record_occurrence(&mut self, name: &str, severity: u8) {
    if let Some(&idx) = self.index.get(name) {
      let row = &mut self.rows[idx];
      row.symptom_occurrences += 1;
      row.severity_sum += u32::from(severity);
      row.severity_count += 1;
    }
  }

  pub fn get(&self, name: &str) -> Option<&ItemExposure> {
    self.index.get(name).map(|&idx| &self.rows[idx])
  }

  pub fn len(&self) -> usize {
    self.rows.len()
  }

  pub fn is_empty(&self) -> bool {
    self.rows.is_empty()
  }

  /// Emit correlations for rows at or above the exposure floor.
  pub fn into_correlations(self, symptom_label: &str, min_exposures: u32) -> Vec<TriggerCorrelation> {
    self
      .rows
      .into_iter()
      .filter(|row| row.total_exposures >= min_exposures.max(1))
      .map(|row| to_correlation(row, symptom_label))
      .collect()
  }
}

/// Occurrences are capped at exposures so the percentage stays within 0–100
/// when several symptoms follow a single exposure.
fn to_correlation(row: ItemExposure, symptom_label: &str) -> TriggerCorrelation {
  let occurrences = row.symptom_occurrences.min(row.total_exposures);
  let correlation_percentage = percentage(occurrences, row.total_exposures);
  let average_severity = if row.severity_count > 0 {
    Some((f64::from(row.severity_sum) / f64::from(row.severity_count)).round() as u8)
  } else {
    None
  };

  TriggerCorrelation {
    item: row.item,
    item_type: row.item_type,
    symptom: symptom_label.to_string(),
    correlation_percentage,
    occurrences,
    total_exposures: row.total_exposures,
    average_severity,
  }
}

/// round(100 × part / whole); 0 when whole is 0.
pub fn percentage(part: u32, whole: u32) -> u8 {
  if whole == 0 {
    return 0;
  }
  (f64::from(part) * 100.0 / f64::from(whole)).round().min(100.0) as u8
}

/// Entries whose timestamp lies in `[start, end]`.
pub fn window_entries(entries: &[DiaryEntry], timeframe: Timeframe) -> Vec<&DiaryEntry> {
  entries
    .iter()
    .filter(|e| e.timestamp >= timeframe.start && e.timestamp <= timeframe.end)
    .collect()
}

/// Build the exposure tracker from consumables and credit it from symptoms.
///
/// Consumables are sorted once by time so each symptom scans only its
/// lookback slice instead of every entry.
pub fn build_tracker(consumables: &[&DiaryEntry], symptoms: &[&DiaryEntry], config: &Config) -> ExposureTracker {
  let mut tracker = ExposureTracker::new();
  for entry in consumables {
    if let Some(item_type) = extract::item_type(entry) {
      for name in extract::exposure_names(entry) {
        tracker.record_exposure(name, item_type);
      }
    }
  }

  let mut by_time: Vec<&DiaryEntry> = consumables.to_vec();
  by_time.sort_by_key(|e| e.timestamp);
  let window = config.correlation_window();

  for symptom in symptoms {
    let Some(data) = symptom.symptom() else {
      continue;
    };
    let end = symptom.timestamp;
    let start = end
      .checked_sub_signed(window)
      .unwrap_or(DateTime::<Utc>::MIN_UTC);
    let lo = by_time.partition_point(|e| e.timestamp < start);
    let hi = by_time.partition_point(|e| e.timestamp <= end);

    let triggered: BTreeSet<&str> = by_time[lo..hi.max(lo)]
      .iter()
      .flat_map(|e| extract::exposure_names(e))
      .collect();

    for name in triggered {
      tracker.record_occurrence(name, data.severity);
    }
  }

  tracker
}

/// Correlations in tracker order (unranked). See [`rank`].
pub fn calculate_triggers(
  consumables: &[&DiaryEntry],
  symptoms: &[&DiaryEntry],
  symptom_label: &str,
  config: &Config,
) -> Vec<TriggerCorrelation> {
  let tracker = build_tracker(consumables, symptoms, config);
  tracing::debug!(
    tracked_items = tracker.len(),
    symptoms = symptoms.len(),
    "exposure tracker built"
  );
  tracker.into_correlations(symptom_label, config.min_exposures)
}

/// Sort by percentage descending; equal scores keep their order.
pub fn rank(triggers: &mut [TriggerCorrelation]) {
  triggers.sort_by(|a, b| b.correlation_percentage.cmp(&a.correlation_percentage));
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::types::{DrinkData, EntryKind, FoodData, Ingredient, SymptomData, ANY_SYMPTOM};
  use chrono::{Duration, TimeZone};

  fn at(day: u32, hour: u32, min: u32, sec: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, day, hour, min, sec).unwrap()
  }

  fn food(id: &str, ts: DateTime<Utc>, item: &str) -> DiaryEntry {
    DiaryEntry {
      id: id.into(),
      user_id: "user1".into(),
      timestamp: ts,
      kind: EntryKind::Food(FoodData {
        food_item: Some(item.into()),
        portion: Some("1 serving".into()),
        ..FoodData::default()
      }),
    }
  }

  fn meal(id: &str, ts: DateTime<Utc>, ingredients: &[&str]) -> DiaryEntry {
    DiaryEntry {
      id: id.into(),
      user_id: "user1".into(),
      timestamp: ts,
      kind: EntryKind::Food(FoodData {
        meal_label: Some("Meal".into()),
        ingredients: ingredients
          .iter()
          .map(|n| Ingredient {
            id: n.to_string(),
            name: n.to_string(),
            portion: "some".into(),
            brand_name: None,
          })
          .collect(),
        ..FoodData::default()
      }),
    }
  }

  fn drink(id: &str, ts: DateTime<Utc>, item: &str) -> DiaryEntry {
    DiaryEntry {
      id: id.into(),
      user_id: "user1".into(),
      timestamp: ts,
      kind: EntryKind::Drink(DrinkData {
        drink_item: item.into(),
        amount: "1 cup".into(),
        brand_name: None,
      }),
    }
  }

  fn symptom(id: &str, ts: DateTime<Utc>, severity: u8) -> DiaryEntry {
    DiaryEntry {
      id: id.into(),
      user_id: "user1".into(),
      timestamp: ts,
      kind: EntryKind::Symptom(SymptomData {
        symptom_type: "bloating".into(),
        severity,
        ..SymptomData::default()
      }),
    }
  }

  fn split(entries: &[DiaryEntry]) -> (Vec<&DiaryEntry>, Vec<&DiaryEntry>) {
    let consumables = entries.iter().filter(|e| e.is_consumable()).collect();
    let symptoms = entries.iter().filter(|e| e.symptom().is_some()).collect();
    (consumables, symptoms)
  }

  fn run(entries: &[DiaryEntry]) -> Vec<TriggerCorrelation> {
    let (consumables, symptoms) = split(entries);
    calculate_triggers(&consumables, &symptoms, ANY_SYMPTOM, &Config::default())
  }

  #[test]
  fn repeated_item_followed_by_symptoms_scores_100() {
    let mut entries = Vec::new();
    for day in 1..=5 {
      entries.push(food(&format!("f{day}"), at(day, 12, 0, 0), "White Bread"));
      entries.push(symptom(&format!("s{day}"), at(day, 15, 0, 0), 5 + day as u8));
    }
    let triggers = run(&entries);
    assert_eq!(triggers.len(), 1);
    let t = &triggers[0];
    assert_eq!(t.item, "White Bread");
    assert_eq!(t.item_type, ItemType::Food);
    assert_eq!(t.symptom, "any");
    assert_eq!(t.occurrences, 5);
    assert_eq!(t.total_exposures, 5);
    assert_eq!(t.correlation_percentage, 100);
    // severities 6..=10 average to 8
    assert_eq!(t.average_severity, Some(8));
  }

  #[test]
  fn window_is_inclusive_at_six_hours() {
    let base = at(10, 6, 0, 0);
    let mut entries = Vec::new();
    for i in 0..3 {
      let day = Duration::days(i);
      entries.push(food(&format!("edge{i}"), base + day, "Edge"));
      entries.push(food(&format!("late{i}"), base + day - Duration::seconds(1), "TooEarly"));
      entries.push(food(&format!("after{i}"), base + day + Duration::hours(6) + Duration::seconds(1), "After"));
      entries.push(symptom(&format!("s{i}"), base + day + Duration::hours(6), 4));
    }
    let triggers = run(&entries);
    let by_item = |name: &str| triggers.iter().find(|t| t.item == name).unwrap();

    assert_eq!(by_item("Edge").occurrences, 3);
    assert_eq!(by_item("Edge").correlation_percentage, 100);
    assert_eq!(by_item("TooEarly").occurrences, 0);
    assert_eq!(by_item("TooEarly").average_severity, None);
    assert_eq!(by_item("After").occurrences, 0);
  }

  #[test]
  fn symptom_eight_hours_later_is_not_credited() {
    let entries = vec![
      food("f1", at(1, 12, 0, 0), "White Bread"),
      symptom("s1", at(1, 20, 0, 0), 7),
    ];
    let (consumables, symptoms) = split(&entries);
    let tracker = build_tracker(&consumables, &symptoms, &Config::default());
    let row = tracker.get("White Bread").unwrap();
    assert_eq!(row.total_exposures, 1);
    assert_eq!(row.symptom_occurrences, 0);
    assert!(run(&entries).is_empty());
  }

  #[test]
  fn below_exposure_floor_is_excluded() {
    let entries = vec![
      food("f1", at(1, 12, 0, 0), "Beans"),
      symptom("s1", at(1, 13, 0, 0), 7),
      food("f2", at(2, 12, 0, 0), "Beans"),
      symptom("s2", at(2, 13, 0, 0), 7),
    ];
    assert!(run(&entries).is_empty());
  }

  #[test]
  fn item_counts_once_per_symptom_episode() {
    let mut entries = Vec::new();
    for day in 1..=3 {
      entries.push(drink(&format!("a{day}"), at(day, 8, 0, 0), "Coffee"));
      entries.push(drink(&format!("b{day}"), at(day, 9, 0, 0), "Coffee"));
      entries.push(symptom(&format!("s{day}"), at(day, 10, 0, 0), 3));
    }
    let triggers = run(&entries);
    assert_eq!(triggers[0].item_type, ItemType::Drink);
    assert_eq!(triggers[0].total_exposures, 6);
    assert_eq!(triggers[0].occurrences, 3);
    assert_eq!(triggers[0].correlation_percentage, 50);
  }

  #[test]
  fn ingredients_tracked_individually() {
    let mut entries = Vec::new();
    for day in 1..=4 {
      entries.push(meal(&format!("m{day}"), at(day, 12, 0, 0), &["Wheat Bread", "Cheddar"]));
    }
    entries.push(symptom("s1", at(1, 14, 0, 0), 6));
    let triggers = run(&entries);
    let names: Vec<&str> = triggers.iter().map(|t| t.item.as_str()).collect();
    assert_eq!(names, vec!["Wheat Bread", "Cheddar"]);
    assert!(triggers.iter().all(|t| t.item_type == ItemType::Food));
    assert!(triggers.iter().all(|t| t.correlation_percentage == 25));
  }

  #[test]
  fn occurrences_never_exceed_exposures() {
    let mut entries = vec![
      food("f1", at(1, 8, 0, 0), "Milk"),
      food("f2", at(5, 8, 0, 0), "Milk"),
      food("f3", at(9, 8, 0, 0), "Milk"),
    ];
    for hour in 9..14 {
      entries.push(symptom(&format!("s{hour}"), at(1, hour, 0, 0), 5));
    }
    let triggers = run(&entries);
    assert_eq!(triggers[0].occurrences, 3);
    assert_eq!(triggers[0].correlation_percentage, 100);
    // Severity still averages all five credited episodes.
    assert_eq!(triggers[0].average_severity, Some(5));
  }

  #[test]
  fn rank_is_descending_and_stable() {
    let mk = |item: &str, pct: u8| TriggerCorrelation {
      item: item.into(),
      item_type: ItemType::Food,
      symptom: ANY_SYMPTOM.into(),
      correlation_percentage: pct,
      occurrences: 0,
      total_exposures: 3,
      average_severity: None,
    };
    let mut triggers = vec![mk("a", 33), mk("b", 67), mk("c", 33), mk("d", 100)];
    rank(&mut triggers);
    let order: Vec<&str> = triggers.iter().map(|t| t.item.as_str()).collect();
    assert_eq!(order, vec!["d", "b", "a", "c"]);
  }

  #[test]
  fn percentage_guards_zero() {
    assert_eq!(percentage(0, 0), 0);
    assert_eq!(percentage(1, 3), 33);
    assert_eq!(percentage(2, 3), 67);
  }
}
