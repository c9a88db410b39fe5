//! Binary entrypoint: read one JSON request from stdin, write one JSON
//! response to stdout.
//!
//! The response is the operation's result, or an ErrorOutput when the request
//! or one of its entries is malformed. Logs go to stderr
//! (filter via `TRIGGER_ENGINE_LOG`, default `warn`).

use std::io::{self, Read, Write};

use chrono::{DateTime, Utc};
use tracing_subscriber::EnvFilter;

use trigger_engine::normalize::normalize_all;
use trigger_engine::types::{ErrorOutput, ReportOptions, Request, RequestEnvelope};
use trigger_engine::{Config, Engine, EngineError, FixedClock};

fn main() {
  init_tracing();

  let mut raw = String::new();
  if let Err(e) = io::stdin().lock().read_to_string(&mut raw) {
    let _ = writeln!(io::stderr(), "trigger-engine: read error: {}", e);
    std::process::exit(1);
  }

  let response = match handle(&raw) {
    Ok(value) => value,
    Err(e) => {
      tracing::warn!(error = %e, "request rejected");
      let mut err = ErrorOutput::new(e.to_string());
      if let Some(field) = e.field() {
        err = err.with_field(field);
      }
      match serde_json::to_value(&err) {
        Ok(v) => v,
        Err(e) => {
          let _ = writeln!(io::stderr(), "trigger-engine: encode error: {}", e);
          std::process::exit(1);
        }
      }
    }
  };

  let stdout = io::stdout();
  let mut out = io::BufWriter::new(stdout.lock());
  let written = serde_json::to_writer(&mut out, &response)
    .map_err(io::Error::from)
    .and_then(|_| writeln!(out))
    .and_then(|_| out.flush());
  if let Err(e) = written {
    let _ = writeln!(io::stderr(), "trigger-engine: write error: {}", e);
    std::process::exit(1);
  }
}

fn init_tracing() {
  let filter = EnvFilter::try_from_env("TRIGGER_ENGINE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(io::stderr)
    .with_target(false)
    .init();
}

fn handle(raw: &str) -> Result<serde_json::Value, EngineError> {
  let envelope: RequestEnvelope = serde_json::from_str(raw.trim())?;
  let engine = build_engine(envelope.now.as_deref())?;
  let config = engine.config().clone();

  let value = match envelope.request {
    Request::Analyze {
      entries,
      symptom_type,
      timeframe_days,
    } => {
      let entries = normalize_all(&entries)?;
      let days = timeframe_days.unwrap_or(config.default_timeframe_days);
      serde_json::to_value(engine.analyze_correlations(&entries, symptom_type.as_deref(), days))?
    }
    Request::AnalyzeBySymptom { entries, timeframe_days } => {
      let entries = normalize_all(&entries)?;
      let days = timeframe_days.unwrap_or(config.default_timeframe_days);
      serde_json::to_value(engine.analyze_by_symptom(&entries, days))?
    }
    Request::Trend {
      entries,
      item_name,
      symptom_type,
      weeks,
    } => {
      let entries = normalize_all(&entries)?;
      let weeks = engine.trend_weeks(weeks)?;
      serde_json::to_value(engine.generate_trend_data(&entries, &item_name, &symptom_type, weeks))?
    }
    Request::Summary { entries } => {
      let entries = normalize_all(&entries)?;
      serde_json::to_value(engine.generate_summary_stats(&entries))?
    }
    Request::HighRisk { entries } => {
      let entries = normalize_all(&entries)?;
      serde_json::to_value(engine.identify_high_risk_periods(&entries))?
    }
    Request::Report {
      entries,
      symptom_type,
      date_range,
    } => {
      let entries = normalize_all(&entries)?;
      let options = ReportOptions {
        symptom_type,
        date_range,
      };
      serde_json::to_value(engine.build_report(&entries, &options))?
    }
    Request::Validate { entries } => {
      let entries = normalize_all(&entries)?;
      serde_json::to_value(engine.validate_entries(&entries))?
    }
  };

  Ok(value)
}

fn build_engine(now: Option<&str>) -> Result<Engine, EngineError> {
  let config = Config::from_env();
  match now {
    Some(ts) => {
      let now: DateTime<Utc> = DateTime::parse_from_rfc3339(ts)
        .map_err(|e| EngineError::validation("now", &format!("invalid RFC3339: {}", e)))?
        .with_timezone(&Utc);
      Ok(Engine::with_clock(config, FixedClock(now)))
    }
    None => Ok(Engine::new(config)),
  }
}
