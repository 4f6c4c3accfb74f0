use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use crate::error::EngineError;

use super::model::{DisasterEvent, EventTable};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load an event table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`  – delimited text with a header row matching the event schema
/// * `.json` – records-oriented array of event objects
///
/// Any IO, parse, or schema-validation failure maps to
/// [`EngineError::DataUnavailable`]; a table that loads at all is fully valid.
pub fn load_file(path: &Path) -> Result<EventTable, EngineError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "csv" => {
            let file = std::fs::File::open(path)
                .map_err(|e| EngineError::DataUnavailable(format!("opening {path:?}: {e}")))?;
            load_csv(file)
        }
        "json" => {
            let file = std::fs::File::open(path)
                .map_err(|e| EngineError::DataUnavailable(format!("opening {path:?}: {e}")))?;
            load_json(file)
        }
        other => Err(EngineError::DataUnavailable(format!(
            "unsupported file extension: .{other}"
        ))),
    }?;

    log::info!(
        "loaded {} events ({} disaster types, {} locations) from {}",
        table.len(),
        table.disaster_types().len(),
        table.locations().len(),
        path.display()
    );
    Ok(table)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Parse a CSV event table from any reader.  Header row required; column
/// names must match the schema (`event_id`, `date`, `disaster_type`, ...).
pub fn load_csv<R: Read>(reader: R) -> Result<EventTable, EngineError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut events = Vec::new();

    for (row_no, result) in csv_reader.deserialize::<DisasterEvent>().enumerate() {
        let event =
            result.map_err(|e| EngineError::DataUnavailable(format!("CSV row {row_no}: {e}")))?;
        events.push(event);
    }

    validate_events(&events)?;
    Ok(EventTable::from_events(events))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Parse a records-oriented JSON array (`[{ "event_id": ..., ... }, ...]`),
/// the shape produced by `df.to_json(orient='records')`.
pub fn load_json<R: Read>(reader: R) -> Result<EventTable, EngineError> {
    let events: Vec<DisasterEvent> = serde_json::from_reader(reader)
        .map_err(|e| EngineError::DataUnavailable(format!("parsing JSON: {e}")))?;

    validate_events(&events)?;
    Ok(EventTable::from_events(events))
}

// ---------------------------------------------------------------------------
// Schema validation
// ---------------------------------------------------------------------------

/// Check every record against the schema invariants.  The first violation
/// aborts the load; a partially valid table is never produced.
pub(crate) fn validate_events(events: &[DisasterEvent]) -> Result<(), EngineError> {
    let mut seen_ids: HashSet<&str> = HashSet::with_capacity(events.len());

    for (row_no, ev) in events.iter().enumerate() {
        let fail = |what: String| {
            Err(EngineError::DataUnavailable(format!(
                "row {row_no} (event_id '{}'): {what}",
                ev.event_id
            )))
        };

        if ev.event_id.trim().is_empty() {
            return fail("empty event_id".to_string());
        }
        if !seen_ids.insert(ev.event_id.as_str()) {
            return fail("duplicate event_id".to_string());
        }
        if ev.disaster_type.trim().is_empty() {
            return fail("empty disaster_type".to_string());
        }
        if ev.location.trim().is_empty() {
            return fail("empty location".to_string());
        }
        if ev.aid_provided.trim().is_empty() {
            return fail("empty aid_provided".to_string());
        }
        if !(1..=10).contains(&ev.severity_level) {
            return fail(format!(
                "severity_level {} outside [1, 10]",
                ev.severity_level
            ));
        }
        if !(0.0..=1.0).contains(&ev.infrastructure_damage_index) {
            return fail(format!(
                "infrastructure_damage_index {} outside [0, 1]",
                ev.infrastructure_damage_index
            ));
        }
        if !(-90.0..=90.0).contains(&ev.latitude) {
            return fail(format!("latitude {} outside [-90, 90]", ev.latitude));
        }
        if !(-180.0..=180.0).contains(&ev.longitude) {
            return fail(format!("longitude {} outside [-180, 180]", ev.longitude));
        }
        if !(ev.estimated_economic_loss_usd >= 0.0) {
            return fail(format!(
                "negative estimated_economic_loss_usd {}",
                ev.estimated_economic_loss_usd
            ));
        }
        if !(ev.response_time_hours >= 0.0) {
            return fail(format!(
                "negative response_time_hours {}",
                ev.response_time_hours
            ));
        }
        if !(ev.aid_amount_usd >= 0.0) {
            return fail(format!("negative aid_amount_usd {}", ev.aid_amount_usd));
        }
    }
    Ok(())
}
