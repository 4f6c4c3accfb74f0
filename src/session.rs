use chrono::NaiveDate;

use crate::data::filter::{apply_filters, FilterCriteria, FilteredView};
use crate::data::model::EventTable;
use crate::error::EngineError;

// ---------------------------------------------------------------------------
// Session – one user's criteria and cached view
// ---------------------------------------------------------------------------

/// Per-session filter state over a shared immutable table.
///
/// Each mutator validates its input first and refilters on success; a
/// rejected change (e.g. an inverted range) leaves both the criteria and the
/// cached view exactly as they were, so the caller can keep rendering the
/// last valid state.  Sessions share nothing with each other except the
/// borrowed table.
pub struct Session<'a> {
    table: &'a EventTable,
    criteria: FilterCriteria,
    /// Indices of events passing the current criteria (cached).
    indices: Vec<usize>,
}

impl<'a> Session<'a> {
    /// Fresh session: no constraints, every row visible.
    pub(crate) fn new(table: &'a EventTable) -> Self {
        Session {
            table,
            criteria: FilterCriteria::new(),
            indices: (0..table.len()).collect(),
        }
    }

    /// The current criteria.
    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    /// The current filtered view.
    pub fn view(&self) -> FilteredView<'a> {
        FilteredView::new(self.table, self.indices.clone())
    }

    /// Number of rows passing the current criteria.
    pub fn visible_count(&self) -> usize {
        self.indices.len()
    }

    /// Replace the whole criteria set at once.
    pub fn set_criteria(&mut self, criteria: FilterCriteria) {
        self.criteria = criteria;
        self.refilter();
    }

    /// Drop all constraints.
    pub fn reset(&mut self) {
        self.criteria = FilterCriteria::new();
        self.refilter();
    }

    pub fn set_date_range(&mut self, start: NaiveDate, end: NaiveDate) -> Result<(), EngineError> {
        match self.criteria.clone().with_date_range(start, end) {
            Ok(criteria) => {
                self.criteria = criteria;
                self.refilter();
                Ok(())
            }
            Err(e) => {
                log::warn!("rejected filter change: {e}");
                Err(e)
            }
        }
    }

    pub fn set_severity_range(&mut self, lo: u8, hi: u8) -> Result<(), EngineError> {
        match self.criteria.clone().with_severity_range(lo, hi) {
            Ok(criteria) => {
                self.criteria = criteria;
                self.refilter();
                Ok(())
            }
            Err(e) => {
                log::warn!("rejected filter change: {e}");
                Err(e)
            }
        }
    }

    pub fn set_disaster_types<I, S>(&mut self, types: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.criteria = self.criteria.clone().with_disaster_types(types);
        self.refilter();
    }

    pub fn set_locations<I, S>(&mut self, locations: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.criteria = self.criteria.clone().with_locations(locations);
        self.refilter();
    }

    pub fn set_aid_types<I, S>(&mut self, aid_types: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.criteria = self.criteria.clone().with_aid_types(aid_types);
        self.refilter();
    }

    pub fn set_major_only(&mut self, enabled: bool) {
        self.criteria = self.criteria.clone().major_only(enabled);
        self.refilter();
    }

    /// Recompute the cached indices after a criteria change.
    fn refilter(&mut self) {
        self.indices = apply_filters(self.table, &self.criteria)
            .indices()
            .to_vec();
    }
}
