//! Core engine: holds configuration and a clock, runs analyses over a
//! caller-owned snapshot of entries. No state survives between calls.

use chrono::{DateTime, Duration, Utc};

use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::correlation;
use crate::error::EngineError;
use crate::report;
use crate::stats;
use crate::trends;
use crate::types::*;
use crate::validate;

/// The trigger correlation engine.
pub struct Engine {
  config: Config,
  clock: Box<dyn Clock>,
}

impl Engine {
  pub fn new(config: Config) -> Self {
    Self::with_clock(config, SystemClock)
  }

  pub fn with_defaults() -> Self {
    Self::new(Config::default())
  }

  pub fn with_clock(config: Config, clock: impl Clock + 'static) -> Self {
    Self {
      config,
      clock: Box::new(clock),
    }
  }

  pub fn config(&self) -> &Config {
    &self.config
  }

  pub fn now(&self) -> DateTime<Utc> {
    self.clock.now()
  }

  /// `[now - days, now]`.
  pub fn timeframe(&self, timeframe_days: u32) -> Timeframe {
    let end = self.now();
    let start = end
      .checked_sub_signed(Duration::days(i64::from(timeframe_days)))
      .unwrap_or(DateTime::<Utc>::MIN_UTC);
    Timeframe { start, end }
  }

  /// Rank consumed items by how often a symptom followed them within the
  /// correlation window. `symptom_type` restricts which symptoms count
  /// (exact match); the `symptom` field of every trigger is `"any"`.
  pub fn analyze_correlations(
    &self,
    entries: &[DiaryEntry],
    symptom_type: Option<&str>,
    timeframe_days: u32,
  ) -> CorrelationAnalysis {
    let timeframe = self.timeframe(timeframe_days);
    let in_window = correlation::window_entries(entries, timeframe);

    let consumables: Vec<&DiaryEntry> = in_window.iter().copied().filter(|e| e.is_consumable()).collect();
    let symptoms: Vec<&DiaryEntry> = in_window
      .iter()
      .copied()
      .filter(|e| match (e.symptom(), symptom_type) {
        (Some(s), Some(wanted)) => s.symptom_type == wanted,
        (Some(_), None) => true,
        (None, _) => false,
      })
      .collect();

    let mut triggers = correlation::calculate_triggers(&consumables, &symptoms, ANY_SYMPTOM, &self.config);
    correlation::rank(&mut triggers);

    tracing::debug!(
      entries = in_window.len(),
      symptom_episodes = symptoms.len(),
      triggers = triggers.len(),
      timeframe_days,
      "correlation analysis complete"
    );

    CorrelationAnalysis {
      triggers,
      timeframe,
      total_entries: in_window.len(),
      symptom_episodes: symptoms.len(),
    }
  }

  /// Like [`Engine::analyze_correlations`] without a filter, but scored
  /// separately for each symptom type in the window, each trigger carrying
  /// the symptom it was scored against.
  pub fn analyze_by_symptom(&self, entries: &[DiaryEntry], timeframe_days: u32) -> CorrelationAnalysis {
    let timeframe = self.timeframe(timeframe_days);
    let in_window = correlation::window_entries(entries, timeframe);
    let consumables: Vec<&DiaryEntry> = in_window.iter().copied().filter(|e| e.is_consumable()).collect();
    let all_symptoms: Vec<&DiaryEntry> = in_window.iter().copied().filter(|e| e.symptom().is_some()).collect();

    let mut symptom_types: Vec<&str> = Vec::new();
    for s in all_symptoms.iter().filter_map(|e| e.symptom()) {
      if !symptom_types.contains(&s.symptom_type.as_str()) {
        symptom_types.push(s.symptom_type.as_str());
      }
    }

    let mut triggers = Vec::new();
    for symptom_type in &symptom_types {
      let matching: Vec<&DiaryEntry> = all_symptoms
        .iter()
        .copied()
        .filter(|e| e.symptom().is_some_and(|s| s.symptom_type == *symptom_type))
        .collect();
      triggers.extend(correlation::calculate_triggers(
        &consumables,
        &matching,
        symptom_type,
        &self.config,
      ));
    }
    correlation::rank(&mut triggers);

    tracing::debug!(
      symptom_types = symptom_types.len(),
      triggers = triggers.len(),
      "per-symptom analysis complete"
    );

    CorrelationAnalysis {
      triggers,
      timeframe,
      total_entries: in_window.len(),
      symptom_episodes: all_symptoms.len(),
    }
  }

  /// Resolve a requested trend length: the default when absent, rejected
  /// above `max_trend_weeks`.
  pub fn trend_weeks(&self, requested: Option<u32>) -> Result<u32, EngineError> {
    let weeks = requested.unwrap_or(self.config.default_trend_weeks);
    if weeks > self.config.max_trend_weeks {
      return Err(EngineError::validation(
        "weeks",
        &format!("must be at most {}, got {}", self.config.max_trend_weeks, weeks),
      ));
    }
    Ok(weeks)
  }

  /// `weeks` buckets of item consumption vs. symptom counts, oldest first.
  pub fn generate_trend_data(
    &self,
    entries: &[DiaryEntry],
    item_name: &str,
    symptom_type: &str,
    weeks: u32,
  ) -> Vec<TrendPoint> {
    trends::weekly_trend(entries, item_name, symptom_type, weeks, self.now())
  }

  /// Headline numbers over the whole snapshot.
  pub fn generate_summary_stats(&self, entries: &[DiaryEntry]) -> SummaryStats {
    let total_entries = entries.len();
    let symptom_episodes = entries.iter().filter(|e| e.symptom().is_some()).count();
    let tracked_days = stats::tracked_days(entries, self.config.local_offset());

    let analysis = self.analyze_correlations(entries, None, self.config.default_timeframe_days);
    let potential_triggers = analysis
      .triggers
      .iter()
      .filter(|t| t.correlation_percentage > self.config.potential_trigger_threshold)
      .count();

    SummaryStats {
      total_entries,
      symptom_episodes,
      potential_triggers,
      tracked_days,
      data_completeness: stats::data_completeness(total_entries, tracked_days, &self.config),
    }
  }

  /// Local hours of day (ascending) where symptoms cluster.
  pub fn identify_high_risk_periods(&self, entries: &[DiaryEntry]) -> Vec<u32> {
    let histogram = stats::hourly_symptom_histogram(entries, self.config.local_offset());
    stats::high_risk_hours(&histogram, self.config.high_risk_ratio)
  }

  /// Everything the export layer needs for one report document.
  pub fn build_report(&self, entries: &[DiaryEntry], options: &ReportOptions) -> ReportDocument {
    let timeframe_days = options
      .date_range
      .as_ref()
      .map_or(self.config.default_timeframe_days, report::range_days);
    let analysis = self.analyze_correlations(entries, options.symptom_type.as_deref(), timeframe_days);
    let now = self.now();

    ReportDocument {
      report_id: report::report_id(entries, &analysis.timeframe, options.symptom_type.as_deref()),
      generated_at: now,
      period: options.date_range,
      summary: self.generate_summary_stats(entries),
      timeframe: analysis.timeframe,
      symptom_episodes: analysis.symptom_episodes,
      top_triggers: report::top_triggers(&analysis.triggers, &self.config),
      high_risk_hours: self.identify_high_risk_periods(entries),
      recent_entries: report::recent_entries(entries, now, self.config.local_offset()),
      recommendations: report::recommendations(&analysis.triggers, &self.config),
    }
  }

  /// Validation result per entry, in input order.
  pub fn validate_entries(&self, entries: &[DiaryEntry]) -> Vec<EntryValidation> {
    let now = self.now();
    entries
      .iter()
      .map(|e| EntryValidation {
        id: e.id.clone(),
        result: validate::validate_entry(e, now),
      })
      .collect()
  }
}
