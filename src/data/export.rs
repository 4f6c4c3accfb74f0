use std::io::Write;

use crate::error::EngineError;

use super::filter::FilteredView;
use super::model::CSV_COLUMNS;

// ---------------------------------------------------------------------------
// CSV export – mirrors the input schema exactly
// ---------------------------------------------------------------------------

/// Write the view's rows as CSV with the same column names and order as the
/// input schema, so an exported file round-trips through the loader.  The
/// header row is written even when the view is empty.
pub fn write_csv<W: Write>(view: &FilteredView<'_>, writer: W) -> Result<(), EngineError> {
    // The header is written explicitly so empty views still export the
    // schema; automatic headers would only appear with the first record.
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv_writer
        .write_record(CSV_COLUMNS)
        .map_err(|e| EngineError::DataUnavailable(format!("writing CSV export: {e}")))?;
    for event in view.events() {
        csv_writer
            .serialize(event)
            .map_err(|e| EngineError::DataUnavailable(format!("writing CSV export: {e}")))?;
    }
    csv_writer
        .flush()
        .map_err(|e| EngineError::DataUnavailable(format!("flushing CSV export: {e}")))?;
    Ok(())
}

/// Render the view as an in-memory CSV string (e.g. for a download button).
pub fn to_csv_string(view: &FilteredView<'_>) -> Result<String, EngineError> {
    let mut buf = Vec::new();
    write_csv(view, &mut buf)?;
    String::from_utf8(buf)
        .map_err(|e| EngineError::DataUnavailable(format!("CSV export was not UTF-8: {e}")))
}
