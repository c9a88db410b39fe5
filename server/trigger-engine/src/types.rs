//! Core types for the trigger engine (JSON contracts + internal models).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Inbound types (JSON contract: what the host sends)
// ---------------------------------------------------------------------------

/// One diary entry as stored by the host. `data` is shaped by `type`.
/// Unknown fields are silently ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundEntry {
  pub id: String,
  #[serde(default)]
  pub user_id: String,
  pub timestamp: String,
  #[serde(rename = "type")]
  pub entry_type: String,
  #[serde(default)]
  pub data: serde_json::Value,
}

// ---------------------------------------------------------------------------
// Entry payloads. Missing, null or mistyped fields deserialize to defaults so
// a sparse record still reaches the engine; `validate` is where they get rejected.
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
  Breakfast,
  Lunch,
  Dinner,
  Snack,
  #[serde(other)]
  Other,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Ingredient {
  #[serde(deserialize_with = "crate::normalize::null_as_default")]
  pub id: String,
  #[serde(deserialize_with = "crate::normalize::null_as_default")]
  pub name: String,
  #[serde(deserialize_with = "crate::normalize::null_as_default")]
  pub portion: String,
  pub brand_name: Option<String>,
}

/// Either the legacy single-item form (`foodItem` + `portion`) or the
/// ingredient-list form (`mealLabel` + `ingredients`).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FoodData {
  pub food_item: Option<String>,
  pub portion: Option<String>,
  pub brand_name: Option<String>,
  pub meal_label: Option<String>,
  #[serde(deserialize_with = "crate::normalize::null_as_default")]
  pub ingredients: Vec<Ingredient>,
  pub meal_type: Option<MealType>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DrinkData {
  #[serde(deserialize_with = "crate::normalize::null_as_default")]
  pub drink_item: String,
  #[serde(deserialize_with = "crate::normalize::null_as_default")]
  pub amount: String,
  pub brand_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SymptomData {
  #[serde(deserialize_with = "crate::normalize::null_as_default")]
  pub symptom_type: String,
  /// 1–10 scale.
  #[serde(deserialize_with = "crate::normalize::lenient_u8")]
  pub severity: u8,
  /// Minutes; hosts may send fractional values.
  #[serde(deserialize_with = "crate::normalize::lenient_f64")]
  pub duration: Option<f64>,
  pub custom_symptom: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SupplementData {
  #[serde(deserialize_with = "crate::normalize::null_as_default")]
  pub supplement_name: String,
  #[serde(deserialize_with = "crate::normalize::null_as_default")]
  pub dose: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExerciseData {
  #[serde(deserialize_with = "crate::normalize::null_as_default")]
  pub activity_type: String,
  /// Minutes.
  #[serde(deserialize_with = "crate::normalize::lenient_u32")]
  pub duration: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WellnessKind {
  Sleep,
  Stress,
  Energy,
  Mood,
}

impl WellnessKind {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Sleep => "sleep",
      Self::Stress => "stress",
      Self::Energy => "energy",
      Self::Mood => "mood",
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WellnessData {
  #[serde(rename = "type")]
  pub kind: Option<WellnessKind>,
  /// 1–10 scale.
  #[serde(deserialize_with = "crate::normalize::lenient_u8")]
  pub rating: u8,
  /// Hours for sleep; hosts may send fractional values.
  #[serde(deserialize_with = "crate::normalize::lenient_f64")]
  pub duration: Option<f64>,
  pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BowelMovementData {
  /// Bristol stool type, 1–7.
  #[serde(deserialize_with = "crate::normalize::lenient_u8")]
  pub bristol_type: u8,
  pub notes: Option<String>,
}

// ---------------------------------------------------------------------------
// Internal normalized types
// ---------------------------------------------------------------------------

/// The seven diary entry kinds, each with its payload.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryKind {
  Food(FoodData),
  Drink(DrinkData),
  Supplement(SupplementData),
  Exercise(ExerciseData),
  Wellness(WellnessData),
  Symptom(SymptomData),
  BowelMovement(BowelMovementData),
}

impl EntryKind {
  /// Wire name of the kind (the inbound `type` string).
  pub fn type_name(&self) -> &'static str {
    match self {
      Self::Food(_) => "food",
      Self::Drink(_) => "drink",
      Self::Supplement(_) => "supplement",
      Self::Exercise(_) => "exercise",
      Self::Wellness(_) => "wellness",
      Self::Symptom(_) => "symptom",
      Self::BowelMovement(_) => "bowel_movement",
    }
  }
}

/// Canonical internal entry after normalization. Read-only to the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct DiaryEntry {
  pub id: String,
  pub user_id: String,
  pub timestamp: DateTime<Utc>,
  pub kind: EntryKind,
}

impl DiaryEntry {
  pub fn is_consumable(&self) -> bool {
    matches!(self.kind, EntryKind::Food(_) | EntryKind::Drink(_))
  }

  pub fn symptom(&self) -> Option<&SymptomData> {
    match &self.kind {
      EntryKind::Symptom(s) => Some(s),
      _ => None,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
  Food,
  Drink,
}

// ---------------------------------------------------------------------------
// Exposure tracking (per analysis call, discarded afterwards)
// ---------------------------------------------------------------------------

/// Running counts for one tracked item name.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemExposure {
  pub item: String,
  pub item_type: ItemType,
  pub total_exposures: u32,
  pub symptom_occurrences: u32,
  pub severity_sum: u32,
  pub severity_count: u32,
}

impl ItemExposure {
  pub fn new(item: impl Into<String>, item_type: ItemType) -> Self {
    Self {
      item: item.into(),
      item_type,
      total_exposures: 0,
      symptom_occurrences: 0,
      severity_sum: 0,
      severity_count: 0,
    }
  }
}

// ---------------------------------------------------------------------------
// Output types (JSON contract: what we emit)
// ---------------------------------------------------------------------------

/// Placeholder symptom label when symptom types are mixed in one analysis.
pub const ANY_SYMPTOM: &str = "any";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerCorrelation {
  pub item: String,
  pub item_type: ItemType,
  pub symptom: String,
  /// 0–100.
  pub correlation_percentage: u8,
  /// Symptom episodes credited to the item, capped at `total_exposures`
  /// (several symptoms can follow one exposure). `average_severity` still
  /// averages every credited episode.
  pub occurrences: u32,
  pub total_exposures: u32,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub average_severity: Option<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Timeframe {
  pub start: DateTime<Utc>,
  pub end: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrelationAnalysis {
  pub triggers: Vec<TriggerCorrelation>,
  pub timeframe: Timeframe,
  pub total_entries: usize,
  pub symptom_episodes: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
  /// "Week 1" is the oldest bucket.
  pub label: String,
  pub week_start: DateTime<Utc>,
  pub symptom_count: usize,
  pub item_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryStats {
  pub total_entries: usize,
  pub symptom_episodes: usize,
  pub potential_triggers: usize,
  pub tracked_days: usize,
  /// 0–100.
  pub data_completeness: u8,
}

// ---------------------------------------------------------------------------
// Report document (consumed by the PDF/CSV export layer)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
  pub start: DateTime<Utc>,
  pub end: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportOptions {
  pub symptom_type: Option<String>,
  pub date_range: Option<DateRange>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
  High,
  Moderate,
  Low,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedTrigger {
  #[serde(flatten)]
  pub trigger: TriggerCorrelation,
  pub tier: RiskTier,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentEntry {
  pub id: String,
  #[serde(rename = "type")]
  pub entry_type: &'static str,
  pub timestamp: DateTime<Utc>,
  pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentDay {
  /// Local calendar day.
  pub date: NaiveDate,
  pub entries: Vec<RecentEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportDocument {
  pub report_id: String,
  pub generated_at: DateTime<Utc>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub period: Option<DateRange>,
  pub summary: SummaryStats,
  pub timeframe: Timeframe,
  pub symptom_episodes: usize,
  pub top_triggers: Vec<RankedTrigger>,
  pub high_risk_hours: Vec<u32>,
  pub recent_entries: Vec<RecentDay>,
  pub recommendations: Vec<String>,
}

// ---------------------------------------------------------------------------
// Validation results
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
  pub is_valid: bool,
  pub errors: Vec<String>,
}

impl ValidationResult {
  pub fn from_errors(errors: Vec<String>) -> Self {
    Self {
      is_valid: errors.is_empty(),
      errors,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryValidation {
  pub id: String,
  #[serde(flatten)]
  pub result: ValidationResult,
}

// ---------------------------------------------------------------------------
// CLI stream wrappers
// ---------------------------------------------------------------------------

/// One request read from stdin. `now` pins the analysis clock.
#[derive(Debug, Clone, Deserialize)]
pub struct RequestEnvelope {
  #[serde(default)]
  pub now: Option<String>,
  #[serde(flatten)]
  pub request: Request,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "operation", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum Request {
  Analyze {
    entries: Vec<InboundEntry>,
    #[serde(default)]
    symptom_type: Option<String>,
    #[serde(default)]
    timeframe_days: Option<u32>,
  },
  AnalyzeBySymptom {
    entries: Vec<InboundEntry>,
    #[serde(default)]
    timeframe_days: Option<u32>,
  },
  Trend {
    entries: Vec<InboundEntry>,
    item_name: String,
    symptom_type: String,
    #[serde(default)]
    weeks: Option<u32>,
  },
  Summary {
    entries: Vec<InboundEntry>,
  },
  HighRisk {
    entries: Vec<InboundEntry>,
  },
  Report {
    entries: Vec<InboundEntry>,
    #[serde(default)]
    symptom_type: Option<String>,
    #[serde(default)]
    date_range: Option<DateRange>,
  },
  Validate {
    entries: Vec<InboundEntry>,
  },
}

/// Structured error output for invalid input.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorOutput {
  pub error: bool,
  pub message: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub field: Option<String>,
}

impl ErrorOutput {
  pub fn new(message: impl Into<String>) -> Self {
    Self {
      error: true,
      message: message.into(),
      field: None,
    }
  }

  pub fn with_field(mut self, field: impl Into<String>) -> Self {
    self.field = Some(field.into());
    self
  }
}
