//! Write-only health sink that mirrors workout summaries.
//!
//! # Responsibility
//! - Define the summary shape handed to the platform health store.
//! - Define the asynchronous, fire-and-forget sink contract.
//!
//! # Invariants
//! - Core never reads back from a sink.
//! - A sink failure never affects the persisted workout.
//! - Completion callbacks may run on any thread.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

mod jsonl;

pub use jsonl::JsonlHealthSink;

/// Duration reported for every created workout. Not derived from content.
pub const PLACEHOLDER_DURATION_SECS: u32 = 300;
/// Energy reported for every created workout. Not derived from content.
pub const PLACEHOLDER_ENERGY_KCAL: f64 = 200.0;

pub const STRENGTH_ACTIVITY: &str = "traditional_strength_training";
pub const SOURCE_NAME: &str = "SweaySync";

pub type SinkResult<T> = Result<T, SinkError>;

/// Completion callback invoked exactly once per `record_workout` call.
pub type SinkCallback = Box<dyn FnOnce(SinkResult<()>) + Send + 'static>;

/// Failure reported asynchronously by a health sink.
#[derive(Debug)]
pub enum SinkError {
    Io(std::io::Error),
    Encode(serde_json::Error),
    /// The sink's worker is gone; the summary was dropped.
    Closed,
    /// The platform store refused the write (e.g. missing authorization).
    Rejected(String),
}

impl Display for SinkError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "{err}"),
            Self::Encode(err) => write!(f, "failed to encode workout summary: {err}"),
            Self::Closed => write!(f, "health sink is closed"),
            Self::Rejected(message) => write!(f, "health store rejected workout: {message}"),
        }
    }
}

impl Error for SinkError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Encode(err) => Some(err),
            Self::Closed | Self::Rejected(_) => None,
        }
    }
}

impl From<std::io::Error> for SinkError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for SinkError {
    fn from(value: serde_json::Error) -> Self {
        Self::Encode(value)
    }
}

/// Workout record written to the health store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSummary {
    pub start: DateTime<Utc>,
    pub duration_seconds: u32,
    pub energy_kcal: f64,
    pub activity: String,
    pub indoor: bool,
    pub source_name: String,
}

impl WorkoutSummary {
    pub fn new(start: DateTime<Utc>, duration_seconds: u32, energy_kcal: f64) -> Self {
        Self {
            start,
            duration_seconds,
            energy_kcal,
            activity: STRENGTH_ACTIVITY.to_string(),
            indoor: true,
            source_name: SOURCE_NAME.to_string(),
        }
    }

    /// Summary sent on workout creation: fixed 300 s and 200 kcal.
    pub fn placeholder(start: DateTime<Utc>) -> Self {
        Self::new(start, PLACEHOLDER_DURATION_SECS, PLACEHOLDER_ENERGY_KCAL)
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.start + Duration::seconds(i64::from(self.duration_seconds))
    }
}

/// Write-only destination for workout summaries.
///
/// Implementations must not block the caller on the actual write and must
/// invoke `on_complete` exactly once.
pub trait HealthSink {
    fn record_workout(&self, summary: WorkoutSummary, on_complete: SinkCallback);
}

/// Sink that accepts and discards every summary.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHealthSink;

impl HealthSink for NoopHealthSink {
    fn record_workout(&self, _summary: WorkoutSummary, on_complete: SinkCallback) {
        on_complete(Ok(()));
    }
}

impl<T: HealthSink + ?Sized> HealthSink for Box<T> {
    fn record_workout(&self, summary: WorkoutSummary, on_complete: SinkCallback) {
        (**self).record_workout(summary, on_complete);
    }
}

#[cfg(test)]
mod tests {
    use super::{HealthSink, NoopHealthSink, WorkoutSummary};
    use chrono::{TimeZone, Utc};
    use std::sync::mpsc;

    #[test]
    fn placeholder_summary_uses_fixed_values() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
        let summary = WorkoutSummary::placeholder(start);
        assert_eq!(summary.duration_seconds, 300);
        assert_eq!(summary.energy_kcal, 200.0);
        assert_eq!(summary.end(), Utc.with_ymd_and_hms(2024, 1, 1, 9, 5, 0).unwrap());
        assert!(summary.indoor);
        assert_eq!(summary.activity, "traditional_strength_training");
    }

    #[test]
    fn noop_sink_reports_success() {
        let (tx, rx) = mpsc::channel();
        NoopHealthSink.record_workout(
            WorkoutSummary::placeholder(Utc::now()),
            Box::new(move |outcome| {
                tx.send(outcome.is_ok()).unwrap();
            }),
        );
        assert!(rx.recv().unwrap());
    }
}
