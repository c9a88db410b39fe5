//! Normalize inbound JSON entries into typed DiaryEntry models.
//!
//! Only the envelope is checked strictly here (id, timestamp, known type).
//! Payloads are read leniently: a mistyped or null field falls back to its
//! default so one odd record cannot sink a whole batch. Range and presence
//! rules live in `validate`.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

use crate::error::EngineError;
use crate::types::*;

/// Parse and normalize one InboundEntry.
pub fn normalize(raw: &InboundEntry) -> Result<DiaryEntry, EngineError> {
  if raw.id.is_empty() {
    return Err(EngineError::validation("id", "must not be empty"));
  }

  let timestamp: DateTime<Utc> = DateTime::parse_from_rfc3339(&raw.timestamp)
    .map_err(|e| EngineError::validation("timestamp", &format!("invalid RFC3339: {}", e)))?
    .with_timezone(&Utc);

  let kind = match raw.entry_type.as_str() {
    "food" => EntryKind::Food(payload(raw)),
    "drink" => EntryKind::Drink(payload(raw)),
    "supplement" => EntryKind::Supplement(payload(raw)),
    "exercise" => EntryKind::Exercise(payload(raw)),
    "wellness" => EntryKind::Wellness(payload(raw)),
    "symptom" => EntryKind::Symptom(payload(raw)),
    "bowel_movement" => EntryKind::BowelMovement(payload(raw)),
    other => {
      return Err(EngineError::validation(
        "type",
        &format!("unknown entry type {:?}", other),
      ))
    }
  };

  Ok(DiaryEntry {
    id: raw.id.clone(),
    user_id: raw.user_id.clone(),
    timestamp,
    kind,
  })
}

/// Normalize a batch, tagging errors with the offending index.
pub fn normalize_all(raw: &[InboundEntry]) -> Result<Vec<DiaryEntry>, EngineError> {
  raw
    .iter()
    .enumerate()
    .map(|(i, entry)| {
      normalize(entry).map_err(|e| match e {
        EngineError::Validation { field, reason } => EngineError::Validation {
          field: format!("entries[{}].{}", i, field),
          reason,
        },
        other => other,
      })
    })
    .collect()
}

/// A null or absent payload is treated as an empty object. A payload that is
/// not an object at all degrades to defaults with a warning.
fn payload<T: DeserializeOwned + Default>(raw: &InboundEntry) -> T {
  if raw.data.is_null() {
    return T::default();
  }
  serde_json::from_value(raw.data.clone()).unwrap_or_else(|e| {
    tracing::warn!(id = %raw.id, entry_type = %raw.entry_type, error = %e, "malformed payload, using defaults");
    T::default()
  })
}

// ---------------------------------------------------------------------------
// Field-level leniency, wired in through `#[serde(deserialize_with)]`.
// ---------------------------------------------------------------------------

/// Explicit `null` reads as the type's default.
pub(crate) fn null_as_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
  D: Deserializer<'de>,
  T: Deserialize<'de> + Default,
{
  Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

/// Any JSON number, rounded and clamped into `0..=max`. Non-numbers read as 0.
fn lenient_int<'de, D: Deserializer<'de>>(d: D, max: f64) -> Result<f64, D::Error> {
  let value = serde_json::Value::deserialize(d)?;
  Ok(
    value
      .as_f64()
      .filter(|n| n.is_finite())
      .map(|n| n.round().clamp(0.0, max))
      .unwrap_or_default(),
  )
}

pub(crate) fn lenient_u8<'de, D: Deserializer<'de>>(d: D) -> Result<u8, D::Error> {
  lenient_int(d, f64::from(u8::MAX)).map(|n| n as u8)
}

pub(crate) fn lenient_u32<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
  lenient_int(d, f64::from(u32::MAX)).map(|n| n as u32)
}

/// Optional measurement: any finite number is kept, anything else is absent.
pub(crate) fn lenient_f64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
  let value = serde_json::Value::deserialize(d)?;
  Ok(value.as_f64().filter(|n| n.is_finite()))
}
