//! Entry validation rules, applied by the host before entries are stored.
//!
//! The analysis functions never call these; they accept whatever they get.

use chrono::{DateTime, Duration, Months, Utc};

use crate::types::*;

/// Check one entry against the rules for its kind and the accepted time range.
pub fn validate_entry(entry: &DiaryEntry, now: DateTime<Utc>) -> ValidationResult {
  let mut errors = match &entry.kind {
    EntryKind::Food(food) => food_errors(food),
    EntryKind::Drink(drink) => drink_errors(drink),
    EntryKind::Symptom(symptom) => symptom_errors(symptom),
    EntryKind::Supplement(supplement) => supplement_errors(supplement),
    EntryKind::Exercise(exercise) => exercise_errors(exercise),
    EntryKind::Wellness(wellness) => wellness_errors(wellness),
    EntryKind::BowelMovement(bowel) => bowel_errors(bowel),
  };

  if !is_within_reasonable_timeframe(entry.timestamp, now) {
    errors.push("Date must be within the last 2 years and no more than 1 day ahead".to_string());
  }

  ValidationResult::from_errors(errors)
}

/// Accepted range: `[now - 2 years, now + 1 day]`.
pub fn is_within_reasonable_timeframe(ts: DateTime<Utc>, now: DateTime<Utc>) -> bool {
  let earliest = now.checked_sub_months(Months::new(24)).unwrap_or(DateTime::<Utc>::MIN_UTC);
  let latest = now + Duration::days(1);
  ts >= earliest && ts <= latest
}

/// Trim and strip angle brackets.
pub fn sanitize_string(input: &str) -> String {
  input.trim().chars().filter(|c| *c != '<' && *c != '>').collect()
}

fn blank(s: &str) -> bool {
  s.trim().is_empty()
}

fn food_errors(food: &FoodData) -> Vec<String> {
  let mut errors = Vec::new();
  if food.ingredients.is_empty() {
    if food.food_item.as_deref().map_or(true, blank) {
      errors.push("Food item is required".to_string());
    }
    if food.portion.as_deref().map_or(true, blank) {
      errors.push("Portion size is required".to_string());
    }
  } else {
    if food.ingredients.iter().any(|i| blank(&i.name)) {
      errors.push("Every ingredient needs a name".to_string());
    }
    if food.ingredients.iter().any(|i| blank(&i.portion)) {
      errors.push("Portion size is required".to_string());
    }
  }
  if food.meal_type.is_none() {
    errors.push("Meal type is required".to_string());
  }
  errors
}

fn drink_errors(drink: &DrinkData) -> Vec<String> {
  let mut errors = Vec::new();
  if blank(&drink.drink_item) {
    errors.push("Drink item is required".to_string());
  }
  if blank(&drink.amount) {
    errors.push("Amount is required".to_string());
  }
  errors
}

fn symptom_errors(symptom: &SymptomData) -> Vec<String> {
  let mut errors = Vec::new();
  if blank(&symptom.symptom_type) {
    errors.push("Symptom type is required".to_string());
  }
  if symptom.symptom_type == "other" && symptom.custom_symptom.as_deref().map_or(true, blank) {
    errors.push("Custom symptom description is required".to_string());
  }
  if !(1..=10).contains(&symptom.severity) {
    errors.push("Severity must be between 1 and 10".to_string());
  }
  errors
}

fn supplement_errors(supplement: &SupplementData) -> Vec<String> {
  let mut errors = Vec::new();
  if blank(&supplement.supplement_name) {
    errors.push("Supplement name is required".to_string());
  }
  if blank(&supplement.dose) {
    errors.push("Dose is required".to_string());
  }
  errors
}

fn exercise_errors(exercise: &ExerciseData) -> Vec<String> {
  let mut errors = Vec::new();
  if blank(&exercise.activity_type) {
    errors.push("Activity type is required".to_string());
  }
  if exercise.duration < 1 {
    errors.push("Duration must be at least 1 minute".to_string());
  }
  errors
}

fn wellness_errors(wellness: &WellnessData) -> Vec<String> {
  let mut errors = Vec::new();
  if wellness.kind.is_none() {
    errors.push("Wellness type is required".to_string());
  }
  if !(1..=10).contains(&wellness.rating) {
    errors.push("Rating must be between 1 and 10".to_string());
  }
  errors
}

fn bowel_errors(bowel: &BowelMovementData) -> Vec<String> {
  if (1..=7).contains(&bowel.bristol_type) {
    Vec::new()
  } else {
    vec!["Bristol stool type is required (1-7)".to_string()]
  }
}
