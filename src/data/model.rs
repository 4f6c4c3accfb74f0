use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ---------------------------------------------------------------------------
// DisasterEvent – one row of the source table
// ---------------------------------------------------------------------------

/// A single disaster occurrence (one row of the source CSV).
///
/// Field order matters: `csv` serializes structs in declaration order, and the
/// export format mirrors the input schema exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisasterEvent {
    pub event_id: String,
    pub date: NaiveDate,
    pub disaster_type: String,
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
    pub severity_level: u8,
    pub infrastructure_damage_index: f64,
    pub affected_population: u64,
    pub estimated_economic_loss_usd: f64,
    pub response_time_hours: f64,
    pub aid_provided: String,
    pub aid_amount_usd: f64,
    /// Stored as `1`/`0` in the file; the loader also accepts `true`/`false`.
    #[serde(
        serialize_with = "serialize_flag",
        deserialize_with = "deserialize_flag"
    )]
    pub is_major_disaster: bool,
}

/// The CSV column names in schema order, matching the struct's field order.
pub(crate) const CSV_COLUMNS: [&str; 14] = [
    "event_id",
    "date",
    "disaster_type",
    "location",
    "latitude",
    "longitude",
    "severity_level",
    "infrastructure_damage_index",
    "affected_population",
    "estimated_economic_loss_usd",
    "response_time_hours",
    "aid_provided",
    "aid_amount_usd",
    "is_major_disaster",
];

fn serialize_flag<S: Serializer>(flag: &bool, ser: S) -> Result<S::Ok, S::Error> {
    ser.serialize_u8(u8::from(*flag))
}

fn deserialize_flag<'de, D: Deserializer<'de>>(de: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum FlagRepr {
        Bool(bool),
        Int(u64),
        Text(String),
    }

    match FlagRepr::deserialize(de)? {
        FlagRepr::Bool(b) => Ok(b),
        FlagRepr::Int(0) => Ok(false),
        FlagRepr::Int(1) => Ok(true),
        FlagRepr::Int(other) => Err(serde::de::Error::custom(format!(
            "invalid major-disaster flag '{other}' (expected 0/1 or true/false)"
        ))),
        FlagRepr::Text(s) => match s.trim() {
            "1" | "true" | "True" => Ok(true),
            "0" | "false" | "False" => Ok(false),
            other => Err(serde::de::Error::custom(format!(
                "invalid major-disaster flag '{other}' (expected 0/1 or true/false)"
            ))),
        },
    }
}

// ---------------------------------------------------------------------------
// NumericField – tagged selector over the numeric columns
// ---------------------------------------------------------------------------

/// Selects one of the numeric columns for sums, means, correlations, etc.
/// A tagged enum instead of a column-name string, so an invalid field is
/// unrepresentable rather than a runtime lookup failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericField {
    SeverityLevel,
    InfrastructureDamageIndex,
    AffectedPopulation,
    EconomicLossUsd,
    ResponseTimeHours,
    AidAmountUsd,
}

impl NumericField {
    /// Read this field from an event as an `f64`.
    pub fn value(&self, event: &DisasterEvent) -> f64 {
        match self {
            NumericField::SeverityLevel => f64::from(event.severity_level),
            NumericField::InfrastructureDamageIndex => event.infrastructure_damage_index,
            NumericField::AffectedPopulation => event.affected_population as f64,
            NumericField::EconomicLossUsd => event.estimated_economic_loss_usd,
            NumericField::ResponseTimeHours => event.response_time_hours,
            NumericField::AidAmountUsd => event.aid_amount_usd,
        }
    }
}

impl fmt::Display for NumericField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NumericField::SeverityLevel => "severity_level",
            NumericField::InfrastructureDamageIndex => "infrastructure_damage_index",
            NumericField::AffectedPopulation => "affected_population",
            NumericField::EconomicLossUsd => "estimated_economic_loss_usd",
            NumericField::ResponseTimeHours => "response_time_hours",
            NumericField::AidAmountUsd => "aid_amount_usd",
        };
        write!(f, "{name}")
    }
}

// ---------------------------------------------------------------------------
// SeverityCategory – coarse labels over severity_level
// ---------------------------------------------------------------------------

/// Categorical severity label derived from the 1–10 level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SeverityCategory {
    Low,
    Medium,
    High,
    Critical,
}

impl SeverityCategory {
    /// Low = 1–3, Medium = 4–6, High = 7–8, Critical = 9–10.
    pub fn from_level(level: u8) -> Self {
        match level {
            0..=3 => SeverityCategory::Low,
            4..=6 => SeverityCategory::Medium,
            7..=8 => SeverityCategory::High,
            _ => SeverityCategory::Critical,
        }
    }
}

impl fmt::Display for SeverityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SeverityCategory::Low => "Low",
            SeverityCategory::Medium => "Medium",
            SeverityCategory::High => "High",
            SeverityCategory::Critical => "Critical",
        };
        write!(f, "{label}")
    }
}

// ---------------------------------------------------------------------------
// EventTable – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full validated dataset with pre-computed categorical indices.
/// Immutable after construction; filtered views borrow it.
#[derive(Debug, Clone)]
pub struct EventTable {
    events: Vec<DisasterEvent>,
    /// Sorted unique disaster types.
    disaster_types: BTreeSet<String>,
    /// Sorted unique location names.
    locations: BTreeSet<String>,
    /// Sorted unique aid types.
    aid_types: BTreeSet<String>,
    /// Earliest and latest event date, `None` for an empty table.
    date_span: Option<(NaiveDate, NaiveDate)>,
}

impl EventTable {
    /// Build the categorical indices from already-validated events.
    pub(crate) fn from_events(events: Vec<DisasterEvent>) -> Self {
        let mut disaster_types = BTreeSet::new();
        let mut locations = BTreeSet::new();
        let mut aid_types = BTreeSet::new();
        let mut date_span: Option<(NaiveDate, NaiveDate)> = None;

        for ev in &events {
            disaster_types.insert(ev.disaster_type.clone());
            locations.insert(ev.location.clone());
            aid_types.insert(ev.aid_provided.clone());
            date_span = Some(match date_span {
                None => (ev.date, ev.date),
                Some((lo, hi)) => (lo.min(ev.date), hi.max(ev.date)),
            });
        }

        EventTable {
            events,
            disaster_types,
            locations,
            aid_types,
            date_span,
        }
    }

    pub fn events(&self) -> &[DisasterEvent] {
        &self.events
    }

    /// Number of events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn disaster_types(&self) -> &BTreeSet<String> {
        &self.disaster_types
    }

    pub fn locations(&self) -> &BTreeSet<String> {
        &self.locations
    }

    pub fn aid_types(&self) -> &BTreeSet<String> {
        &self.aid_types
    }

    pub fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.date_span
    }
}
