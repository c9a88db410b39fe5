//! Report assembly for the export layer: tiers, recent entries, advice.

use chrono::{DateTime, Duration, FixedOffset, Utc};

use crate::config::Config;
use crate::types::*;
use crate::validate;

/// Stable report id: hash of entry ids + analysis window + symptom filter.
pub fn report_id(entries: &[DiaryEntry], timeframe: &Timeframe, symptom_type: Option<&str>) -> String {
  let mut hasher = blake3::Hasher::new();
  for entry in entries {
    hasher.update(entry.id.as_bytes());
    hasher.update(b"\n");
  }
  hasher.update(b"|");
  hasher.update(timeframe.start.to_rfc3339().as_bytes());
  hasher.update(b"|");
  hasher.update(timeframe.end.to_rfc3339().as_bytes());
  hasher.update(b"|");
  hasher.update(symptom_type.unwrap_or("").as_bytes());
  let hex = hasher.finalize().to_hex();
  format!("rpt-{}", &hex[..16])
}

/// Whole days covered by a date range, rounded up; inverted ranges are 0.
pub fn range_days(range: &DateRange) -> u32 {
  let seconds = (range.end - range.start).num_seconds();
  if seconds <= 0 {
    return 0;
  }
  let days = (seconds + 86_399) / 86_400;
  u32::try_from(days).unwrap_or(u32::MAX)
}

pub fn risk_tier(percentage: u8, config: &Config) -> RiskTier {
  if percentage >= config.high_risk_percentage {
    RiskTier::High
  } else if percentage >= config.moderate_risk_percentage {
    RiskTier::Moderate
  } else {
    RiskTier::Low
  }
}

/// First `report_top_triggers` of an already-ranked list, tagged with tiers.
pub fn top_triggers(triggers: &[TriggerCorrelation], config: &Config) -> Vec<RankedTrigger> {
  triggers
    .iter()
    .take(config.report_top_triggers)
    .map(|t| RankedTrigger {
      trigger: t.clone(),
      tier: risk_tier(t.correlation_percentage, config),
    })
    .collect()
}

/// Advice lines derived from trigger tiers.
pub fn recommendations(triggers: &[TriggerCorrelation], config: &Config) -> Vec<String> {
  if triggers.is_empty() {
    return vec![
      "Continue tracking your food intake and symptoms to identify patterns.".to_string(),
      "Aim for at least 3 meals per day with consistent logging.".to_string(),
    ];
  }

  let names_in = |tier: RiskTier| -> Vec<&str> {
    triggers
      .iter()
      .filter(|t| risk_tier(t.correlation_percentage, config) == tier)
      .take(3)
      .map(|t| t.item.as_str())
      .collect()
  };

  let mut out = Vec::new();
  let high = names_in(RiskTier::High);
  if !high.is_empty() {
    out.push(format!(
      "Consider avoiding or reducing: {} as they show strong correlation with symptoms.",
      high.join(", ")
    ));
  }
  let moderate = names_in(RiskTier::Moderate);
  if !moderate.is_empty() {
    out.push(format!(
      "Monitor consumption of: {} and note any symptoms.",
      moderate.join(", ")
    ));
  }
  out.push("Keep a consistent eating schedule and note portion sizes.".to_string());
  out.push("Share this report with your healthcare provider for personalized advice.".to_string());
  out.push("Continue daily logging to improve pattern recognition accuracy.".to_string());
  out
}

/// Entries from the last 7 days, newest first, grouped by local day.
pub fn recent_entries(entries: &[DiaryEntry], now: DateTime<Utc>, offset: FixedOffset) -> Vec<RecentDay> {
  let cutoff = now - Duration::days(7);
  let mut recent: Vec<&DiaryEntry> = entries.iter().filter(|e| e.timestamp >= cutoff).collect();
  recent.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

  let mut days: Vec<RecentDay> = Vec::new();
  for entry in recent {
    let date = entry.timestamp.with_timezone(&offset).date_naive();
    let item = RecentEntry {
      id: entry.id.clone(),
      entry_type: entry.kind.type_name(),
      timestamp: entry.timestamp,
      description: describe(entry),
    };
    match days.last_mut() {
      Some(day) if day.date == date => day.entries.push(item),
      _ => days.push(RecentDay {
        date,
        entries: vec![item],
      }),
    }
  }
  days
}

/// One-line human description of an entry, with diarist text sanitized for
/// the exported document.
pub fn describe(entry: &DiaryEntry) -> String {
  validate::sanitize_string(&raw_description(entry))
}

fn raw_description(entry: &DiaryEntry) -> String {
  match &entry.kind {
    EntryKind::Food(food) => {
      if food.ingredients.is_empty() {
        let item = food.food_item.as_deref().unwrap_or("Unknown food");
        match food.portion.as_deref().filter(|p| !p.is_empty()) {
          Some(portion) => format!("{} ({})", item, portion),
          None => item.to_string(),
        }
      } else {
        let names: Vec<&str> = food.ingredients.iter().map(|i| i.name.as_str()).collect();
        let label = food.meal_label.as_deref().unwrap_or("Meal");
        format!("{}: {}", label, names.join(", "))
      }
    }
    EntryKind::Drink(d) => format!("{} ({})", d.drink_item, d.amount),
    EntryKind::Symptom(s) => {
      let name = match s.custom_symptom.as_deref() {
        Some(custom) if s.symptom_type == "other" && !custom.is_empty() => custom,
        _ => s.symptom_type.as_str(),
      };
      format!("{} ({}/10)", name, s.severity)
    }
    EntryKind::Exercise(x) => format!("{} ({} min)", x.activity_type, x.duration),
    EntryKind::Supplement(s) => format!("{} ({})", s.supplement_name, s.dose),
    EntryKind::Wellness(w) => format!(
      "{} ({}/10)",
      w.kind.map_or("wellness", WellnessKind::as_str),
      w.rating
    ),
    EntryKind::BowelMovement(b) => format!("Bristol type {}", b.bristol_type),
  }
}
