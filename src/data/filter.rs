use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::error::EngineError;

use super::model::{DisasterEvent, EventTable};

// ---------------------------------------------------------------------------
// FilterCriteria – one optional constraint per dimension
// ---------------------------------------------------------------------------

/// Per-dimension filter constraints.  An unset dimension means "match all";
/// set-valued dimensions are OR within the set, and all active dimensions are
/// ANDed together.
///
/// Range dimensions are validated when set, so an inverted range can never
/// reach evaluation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    date_range: Option<(NaiveDate, NaiveDate)>,
    disaster_types: Option<BTreeSet<String>>,
    severity_range: Option<(u8, u8)>,
    locations: Option<BTreeSet<String>>,
    aid_types: Option<BTreeSet<String>>,
    major_only: bool,
}

impl FilterCriteria {
    /// Criteria with every dimension unset: matches the whole table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to events dated within `[start, end]` (inclusive both ends).
    pub fn with_date_range(mut self, start: NaiveDate, end: NaiveDate) -> Result<Self, EngineError> {
        if start > end {
            return Err(EngineError::bad_range("date", start, end));
        }
        self.date_range = Some((start, end));
        Ok(self)
    }

    /// Restrict to events whose disaster type is in the set.
    pub fn with_disaster_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.disaster_types = Some(types.into_iter().map(Into::into).collect());
        self
    }

    /// Restrict to events with severity in `[lo, hi]` (inclusive).  Bounds
    /// are clamped to the schema's 1..=10 band; an inverted range is an
    /// error.
    pub fn with_severity_range(mut self, lo: u8, hi: u8) -> Result<Self, EngineError> {
        if lo > hi {
            return Err(EngineError::bad_range("severity", lo, hi));
        }
        self.severity_range = Some((lo.clamp(1, 10), hi.clamp(1, 10)));
        Ok(self)
    }

    /// Restrict to events whose location is in the set.
    pub fn with_locations<I, S>(mut self, locations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.locations = Some(locations.into_iter().map(Into::into).collect());
        self
    }

    /// Restrict to events whose aid type is in the set.
    pub fn with_aid_types<I, S>(mut self, aid_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aid_types = Some(aid_types.into_iter().map(Into::into).collect());
        self
    }

    /// Keep only events with the major-disaster flag set.
    pub fn major_only(mut self, enabled: bool) -> Self {
        self.major_only = enabled;
        self
    }

    /// Whether a single event satisfies every active dimension.
    fn matches(&self, ev: &DisasterEvent) -> bool {
        if let Some((start, end)) = self.date_range {
            if ev.date < start || ev.date > end {
                return false;
            }
        }
        if let Some(types) = &self.disaster_types {
            if !types.contains(&ev.disaster_type) {
                return false;
            }
        }
        if let Some((lo, hi)) = self.severity_range {
            if ev.severity_level < lo || ev.severity_level > hi {
                return false;
            }
        }
        if let Some(locations) = &self.locations {
            if !locations.contains(&ev.location) {
                return false;
            }
        }
        if let Some(aid_types) = &self.aid_types {
            if !aid_types.contains(&ev.aid_provided) {
                return false;
            }
        }
        if self.major_only && !ev.is_major_disaster {
            return false;
        }
        true
    }
}

// ---------------------------------------------------------------------------
// FilteredView – an ordered subsequence of the base table
// ---------------------------------------------------------------------------

/// Read-only view over the rows of an [`EventTable`] passing a filter.
/// Holds indices into the base table, never row copies; the base table is
/// untouched by filtering and the same table can back any number of
/// overlapping views.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    table: &'a EventTable,
    indices: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    pub(crate) fn new(table: &'a EventTable, indices: Vec<usize>) -> Self {
        FilteredView { table, indices }
    }

    /// View covering the whole table.
    pub fn all(table: &'a EventTable) -> Self {
        FilteredView {
            table,
            indices: (0..table.len()).collect(),
        }
    }

    /// Number of rows in the view.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Whether the view has no rows (a valid state, not an error).
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Iterate the view's rows in base-table order.
    pub fn events(&self) -> impl Iterator<Item = &'a DisasterEvent> + '_ {
        let events = self.table.events();
        self.indices.iter().map(move |&i| &events[i])
    }

    /// Positions of the view's rows within the base table.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn table(&self) -> &'a EventTable {
        self.table
    }
}

impl PartialEq for FilteredView<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.table, other.table) && self.indices == other.indices
    }
}

/// Return the view of events passing all active criteria, preserving base
/// table order.  An empty result is returned as an empty view, never an
/// error; criteria are validated at construction so this cannot fail on a
/// well-formed [`FilterCriteria`].
pub fn apply_filters<'a>(table: &'a EventTable, criteria: &FilterCriteria) -> FilteredView<'a> {
    let indices: Vec<usize> = table
        .events()
        .iter()
        .enumerate()
        .filter(|(_, ev)| criteria.matches(ev))
        .map(|(i, _)| i)
        .collect();

    log::debug!(
        "filter matched {} of {} events",
        indices.len(),
        table.len()
    );
    FilteredView::new(table, indices)
}
