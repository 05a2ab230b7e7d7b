// CSV export of computed tables
use crate::domain::measurement::JoinedRecord;
use crate::domain::summary::StationSummary;
use anyhow::Result;
use chrono::NaiveDate;
use csv::WriterBuilder;
use serde::Serialize;

pub const MAP_DATA_PREFIX: &str = "map_data";

/// `<prefix>_YYYYMMDD.csv`
pub fn export_filename(prefix: &str, date: NaiveDate) -> String {
    format!("{}_{}.csv", prefix, date.format("%Y%m%d"))
}

/// Serialize rows with a header line taken from the field names.
/// No rows produce an empty document.
fn to_csv<T: Serialize>(rows: &[T]) -> Result<Vec<u8>> {
    let mut writer = WriterBuilder::new().has_headers(true).from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(writer.into_inner().map_err(|e| e.into_error())?)
}

pub fn map_data_csv(summaries: &[StationSummary]) -> Result<Vec<u8>> {
    tracing::debug!(rows = summaries.len(), "Exporting map data");
    to_csv(summaries)
}

pub fn records_csv(records: &[JoinedRecord]) -> Result<Vec<u8>> {
    tracing::debug!(rows = records.len(), "Exporting filtered records");
    to_csv(records)
}
