use thiserror::Error;

/// Errors produced by the filter & metrics engine.
///
/// Only `DataUnavailable` is fatal (it aborts engine construction); the other
/// two are local to a single filter change or metric request and callers are
/// expected to keep their previous state.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The source file could not be read or a record failed schema validation.
    #[error("dataset unavailable: {0}")]
    DataUnavailable(String),

    /// A range constraint whose lower bound exceeds its upper bound.
    #[error("invalid {dimension} range: lower bound {lower} exceeds upper bound {upper}")]
    InvalidFilterRange {
        dimension: &'static str,
        lower: String,
        upper: String,
    },

    /// A metric was requested on a view with too few rows to be meaningful.
    #[error("insufficient data for {metric}: need at least {needed} rows, view has {got}")]
    InsufficientData {
        metric: &'static str,
        needed: usize,
        got: usize,
    },
}

impl EngineError {
    pub(crate) fn bad_range<L: std::fmt::Display, U: std::fmt::Display>(
        dimension: &'static str,
        lower: L,
        upper: U,
    ) -> Self {
        EngineError::InvalidFilterRange {
            dimension,
            lower: lower.to_string(),
            upper: upper.to_string(),
        }
    }
}
