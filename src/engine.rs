use std::path::Path;

use crate::data::filter::{apply_filters, FilterCriteria, FilteredView};
use crate::data::loader;
use crate::data::model::{DisasterEvent, EventTable};
use crate::error::EngineError;
use crate::metrics::{self, Metric, MetricValue, SummaryStats};
use crate::session::Session;

// ---------------------------------------------------------------------------
// Engine – owns the immutable base table
// ---------------------------------------------------------------------------

/// The filter & metrics engine.
///
/// Construction performs the read and schema validation exactly once and
/// stores the immutable table in the instance; every later operation is a
/// pure function of that table and its explicit parameters.  There is no
/// static state, so independent engines (one per test, one per dataset)
/// never interfere.
pub struct Engine {
    table: EventTable,
}

impl Engine {
    /// Load and validate the dataset at `path`.  A load failure is fatal to
    /// construction; no partially-valid engine is ever produced.
    pub fn from_path(path: &Path) -> Result<Self, EngineError> {
        let table = loader::load_file(path)?;
        Ok(Engine { table })
    }

    /// Build an engine over already-validated events (tests, embedding).
    pub fn from_table(table: EventTable) -> Self {
        Engine { table }
    }

    /// The immutable base table.
    pub fn table(&self) -> &EventTable {
        &self.table
    }

    /// Apply filter criteria, returning the order-preserving view of matching
    /// rows.  The base table is never mutated; identical criteria always
    /// yield identical views.
    pub fn apply_filters(&self, criteria: &FilterCriteria) -> FilteredView<'_> {
        apply_filters(&self.table, criteria)
    }

    /// A view over the whole table (no filtering).
    pub fn full_view(&self) -> FilteredView<'_> {
        FilteredView::all(&self.table)
    }

    /// Compute one metric over a view produced by this engine.
    pub fn compute(
        &self,
        view: &FilteredView<'_>,
        metric: &Metric,
    ) -> Result<MetricValue, EngineError> {
        metrics::compute(view, metric)
    }

    /// The dashboard summary block for a view.
    pub fn summary(&self, view: &FilteredView<'_>) -> Result<SummaryStats, EngineError> {
        metrics::summary(view)
    }

    /// Start a session: an independent criteria + cached-view pair.  Sessions
    /// share nothing but the immutable table.
    pub fn session(&self) -> Session<'_> {
        Session::new(&self.table)
    }
}

/// Validate a list of in-memory events and build a table from them, applying
/// the same schema checks as a file load.
pub fn table_from_events(events: Vec<DisasterEvent>) -> Result<EventTable, EngineError> {
    crate::data::loader::validate_events(&events)?;
    Ok(EventTable::from_events(events))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::NumericField;
    use crate::data::testutil::sample_event;

    fn engine_with_severities(severities: &[u8]) -> Engine {
        let events = severities
            .iter()
            .enumerate()
            .map(|(i, &s)| sample_event(&format!("EV-{i}"), s))
            .collect();
        Engine::from_table(EventTable::from_events(events))
    }

    #[test]
    fn independent_engines_do_not_interfere() {
        let a = engine_with_severities(&[1, 2, 3]);
        let b = engine_with_severities(&[9, 10]);
        assert_eq!(a.full_view().len(), 3);
        assert_eq!(b.full_view().len(), 2);
    }

    #[test]
    fn severity_scenario_from_the_dashboard() {
        // severities [2, 8, 5, 9, 1], range [5, 10] → exactly 8, 5, 9.
        let engine = engine_with_severities(&[2, 8, 5, 9, 1]);
        let criteria = FilterCriteria::new().with_severity_range(5, 10).unwrap();
        let view = engine.apply_filters(&criteria);
        let severities: Vec<u8> = view.events().map(|e| e.severity_level).collect();
        assert_eq!(severities, vec![8, 5, 9]);
    }

    #[test]
    fn mean_of_loss_on_empty_view_is_insufficient_data() {
        let engine = engine_with_severities(&[2, 3]);
        let criteria = FilterCriteria::new().with_severity_range(9, 10).unwrap();
        let view = engine.apply_filters(&criteria);
        assert!(view.is_empty());

        let err = engine
            .compute(&view, &Metric::Mean(NumericField::EconomicLossUsd))
            .unwrap_err();
        assert!(matches!(err, EngineError::InsufficientData { .. }));
    }

    #[test]
    fn table_from_events_applies_schema_validation() {
        let mut bad = sample_event("EV-1", 5);
        bad.infrastructure_damage_index = 2.0;
        let err = table_from_events(vec![bad]).unwrap_err();
        assert!(matches!(err, EngineError::DataUnavailable(_)));
    }
}
