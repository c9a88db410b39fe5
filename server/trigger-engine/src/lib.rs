//! Trigger Correlation Engine: deterministic, ratio-based.
//!
//! Reads a snapshot of symptom/diet diary entries, tracks ingredient-level
//! exposures, credits symptom episodes to items consumed within a fixed
//! lookback, and emits ranked trigger correlations, weekly trends, summary
//! statistics, high-risk hours and report documents.
//!
//! No DB, no network, no significance testing; pure computation.

pub mod clock;
pub mod config;
pub mod correlation;
pub mod engine;
pub mod error;
pub mod extract;
pub mod normalize;
pub mod report;
pub mod stats;
pub mod trends;
pub mod types;
pub mod validate;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::Config;
pub use engine::Engine;
pub use error::EngineError;
pub use types::{
  CorrelationAnalysis, DiaryEntry, EntryKind, InboundEntry, ReportDocument, SummaryStats, TrendPoint,
  TriggerCorrelation,
};
