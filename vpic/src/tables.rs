//! Raw rows of the bundled vPIC extract.
//!
//! Each struct mirrors one CSV relation of the data image byte for byte.
//! The rows are joined and indexed into a [`Snapshot`](crate::Snapshot) by
//! `Snapshot::load`; nothing outside this crate sees them.

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::SnapshotError;

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ManufacturerRow {
    pub manufacturer_id: u32,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct MakeRow {
    pub make_id: u32,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct VehicleTypeRow {
    pub vehicle_type_id: u32,
    pub name: String,
}

/// One World Manufacturer Identifier assignment.
///
/// An empty `vis_suffix` marks a mass-market 3-character WMI; a 3-character
/// suffix marks a specialized manufacturer whose VINs carry the rest of the
/// identifier in positions 12-14.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct WmiRow {
    pub wmi: String,
    pub vis_suffix: Option<String>,
    pub manufacturer_id: u32,
    pub make_id: u32,
    pub vehicle_type_id: u32,
    pub country: String,
    pub created_on: NaiveDate,
    pub updated_on: NaiveDate,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct PatternRow {
    pub pattern_id: u32,
    pub wmi: String,
    pub key_pattern: String,
    pub element_id: u32,
    pub value: String,
    pub year_from: Option<i32>,
    pub year_to: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ElementRow {
    pub element_id: u32,
    pub name: String,
    pub group: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct VersionRow {
    pub version: String,
    pub release_date: NaiveDate,
}

/// Parses one embedded CSV relation into typed rows.
pub(crate) fn parse_table<T: DeserializeOwned>(
    table: &'static str,
    data: &str,
) -> Result<Vec<T>, SnapshotError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b',')
        .from_reader(data.as_bytes());

    let mut rows = Vec::new();
    for record in reader.deserialize() {
        let row = record.map_err(|e| SnapshotError::Unreadable {
            table,
            message: e.to_string(),
        })?;
        rows.push(row);
    }
    Ok(rows)
}
