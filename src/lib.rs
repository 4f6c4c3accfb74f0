//! disasterlens – filtering and derived-metrics engine for disaster event
//! datasets.
//!
//! The crate owns an immutable table of disaster events loaded once from a
//! CSV or JSON file, applies composable per-dimension filter criteria to it,
//! and computes derived metrics (counts, sums, means, Pearson correlations
//! with significance, percentile buckets, top-N rankings, grouped totals)
//! over the filtered subset.  Rendering is somebody else's job: a
//! presentation layer calls [`Engine`] and displays what comes back.
//!
//! ```no_run
//! use disasterlens::{Engine, FilterCriteria, Metric, NumericField};
//!
//! # fn main() -> Result<(), disasterlens::EngineError> {
//! let engine = Engine::from_path(std::path::Path::new("disaster_events.csv"))?;
//! let criteria = FilterCriteria::new()
//!     .with_disaster_types(["Flood", "Hurricane"])
//!     .with_severity_range(5, 10)?;
//! let view = engine.apply_filters(&criteria);
//! let mean_loss = engine.compute(&view, &Metric::Mean(NumericField::EconomicLossUsd))?;
//! # let _ = mean_loss;
//! # Ok(())
//! # }
//! ```

pub mod data;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod session;

pub use data::export::{to_csv_string, write_csv};
pub use data::filter::{apply_filters, FilterCriteria, FilteredView};
pub use data::loader::load_file;
pub use data::model::{DisasterEvent, EventTable, NumericField, SeverityCategory};
pub use engine::{table_from_events, Engine};
pub use error::EngineError;
pub use metrics::{
    Bucket, Correlation, GroupKey, LinearFit, Metric, MetricValue, RankedEvent, SummaryStats,
};
pub use session::Session;
