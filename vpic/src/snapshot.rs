//! The immutable vPIC snapshot and its lookup indexes.
//!
//! The snapshot is built once from the embedded table data and never written
//! afterwards, so concurrent readers need no synchronization. The process-wide
//! instance behind [`Snapshot::shared`] is initialized through `LazyLock`:
//! the first caller builds the indexes, concurrent callers wait, and every
//! later call is a plain reference read.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};

use crate::error::SnapshotError;
use crate::tables::{
    parse_table, ElementRow, MakeRow, ManufacturerRow, PatternRow, VehicleTypeRow, VersionRow,
    WmiRow,
};

static MANUFACTURER_DATA: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/", "src/data/manufacturer.csv"));
static MAKE_DATA: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/", "src/data/make.csv"));
static VEHICLE_TYPE_DATA: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/", "src/data/vehicle_type.csv"));
static WMI_DATA: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/", "src/data/wmi.csv"));
static PATTERN_DATA: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/", "src/data/pattern.csv"));
static ELEMENT_DATA: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/", "src/data/element.csv"));
static VERSION_DATA: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/", "src/data/version.csv"));

static SHARED: LazyLock<Result<Snapshot, SnapshotError>> = LazyLock::new(Snapshot::load);

/// A World Manufacturer Identifier record, denormalized at load time.
///
/// `vis_suffix` is `None` for mass-market 3-character WMIs. A `Some` suffix
/// marks a specialized manufacturer whose VINs match both the first three
/// characters and positions 12-14.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wmi {
    pub code: String,
    pub vis_suffix: Option<String>,
    pub manufacturer: String,
    pub make: String,
    pub vehicle_type: String,
    pub country: String,
    pub created_on: NaiveDate,
    pub updated_on: NaiveDate,
}

/// One decoding rule: a key pattern over VIN positions 4.. and the element
/// value it assigns when the pattern matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    pub id: u32,
    pub wmi: String,
    pub key: String,
    pub element_id: u32,
    pub value: String,
    pub year_from: Option<i32>,
    pub year_to: Option<i32>,
}

impl Pattern {
    /// Number of single-position wildcards in the key.
    pub fn wildcards(&self) -> usize {
        self.key.bytes().filter(|&b| b == b'*').count()
    }

    /// Whether this pattern applies to the given model year.
    ///
    /// An unbounded endpoint is treated as open. An unknown model year
    /// (`None`) only matches patterns that are unbounded on both ends.
    pub fn year_scope_contains(&self, model_year: Option<i32>) -> bool {
        match model_year {
            Some(year) => {
                self.year_from.map_or(true, |from| from <= year)
                    && self.year_to.map_or(true, |to| year <= to)
            }
            None => self.year_from.is_none() && self.year_to.is_none(),
        }
    }

    fn year_span(&self) -> i64 {
        match (self.year_from, self.year_to) {
            (Some(from), Some(to)) => i64::from(to) - i64::from(from),
            _ => i64::MAX,
        }
    }
}

/// A decodable vehicle specification element (`Make`, `Model`, `Series`, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub id: u32,
    pub name: String,
    pub group: String,
}

/// The loaded vPIC reference data: WMI assignments, decoding patterns and
/// element names, indexed for resolution and immutable after construction.
#[derive(Debug, Clone)]
pub struct Snapshot {
    by_wmi3: HashMap<String, Wmi>,
    by_wmi6: HashMap<String, Vec<Wmi>>,
    patterns_by_wmi: HashMap<String, Vec<Pattern>>,
    element_name_by_id: HashMap<u32, String>,
    version: String,
    release_date: NaiveDate,
}

/// Evaluation order for the patterns of one WMI: fewer wildcards first, then
/// longer keys, then narrower year spans, then ascending pattern id.
fn evaluation_order(a: &Pattern, b: &Pattern) -> Ordering {
    a.wildcards()
        .cmp(&b.wildcards())
        .then_with(|| b.key.len().cmp(&a.key.len()))
        .then_with(|| a.year_span().cmp(&b.year_span()))
        .then_with(|| a.id.cmp(&b.id))
}

impl Snapshot {
    /// Builds the snapshot from the embedded table data.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError`] when a table is malformed, a WMI row
    /// references a missing manufacturer, make or vehicle type, or the
    /// version row is absent.
    pub fn load() -> Result<Self, SnapshotError> {
        let manufacturers: Vec<ManufacturerRow> = parse_table("manufacturer", MANUFACTURER_DATA)?;
        let makes: Vec<MakeRow> = parse_table("make", MAKE_DATA)?;
        let vehicle_types: Vec<VehicleTypeRow> = parse_table("vehicle_type", VEHICLE_TYPE_DATA)?;
        let wmi_rows: Vec<WmiRow> = parse_table("wmi", WMI_DATA)?;
        let pattern_rows: Vec<PatternRow> = parse_table("pattern", PATTERN_DATA)?;
        let element_rows: Vec<ElementRow> = parse_table("element", ELEMENT_DATA)?;
        let version_rows: Vec<VersionRow> = parse_table("version", VERSION_DATA)?;

        let manufacturer_names: HashMap<u32, String> = manufacturers
            .into_iter()
            .map(|row| (row.manufacturer_id, row.name))
            .collect();
        let make_names: HashMap<u32, String> =
            makes.into_iter().map(|row| (row.make_id, row.name)).collect();
        let vehicle_type_names: HashMap<u32, String> = vehicle_types
            .into_iter()
            .map(|row| (row.vehicle_type_id, row.name))
            .collect();

        let mut wmis = Vec::with_capacity(wmi_rows.len());
        for (index, row) in wmi_rows.into_iter().enumerate() {
            let lookup = |names: &HashMap<u32, String>, what: &'static str, id: u32| {
                names
                    .get(&id)
                    .cloned()
                    .ok_or(SnapshotError::DanglingReference {
                        table: "wmi",
                        row: index + 1,
                        what,
                        id,
                    })
            };
            wmis.push(Wmi {
                code: row.wmi,
                vis_suffix: row.vis_suffix,
                manufacturer: lookup(&manufacturer_names, "manufacturer", row.manufacturer_id)?,
                make: lookup(&make_names, "make", row.make_id)?,
                vehicle_type: lookup(&vehicle_type_names, "vehicle type", row.vehicle_type_id)?,
                country: row.country,
                created_on: row.created_on,
                updated_on: row.updated_on,
            });
        }

        let patterns = pattern_rows
            .into_iter()
            .map(|row| Pattern {
                id: row.pattern_id,
                wmi: row.wmi,
                key: row.key_pattern,
                element_id: row.element_id,
                value: row.value,
                year_from: row.year_from,
                year_to: row.year_to,
            })
            .collect();

        let elements = element_rows
            .into_iter()
            .map(|row| Element {
                id: row.element_id,
                name: row.name,
                group: row.group,
            })
            .collect();

        let version = version_rows
            .into_iter()
            .next()
            .ok_or(SnapshotError::MissingVersion)?;

        Ok(Self::from_tables(
            wmis,
            patterns,
            elements,
            version.version,
            version.release_date,
        ))
    }

    /// Assembles a snapshot from already-typed rows and precomputes the
    /// lookup indexes. `load` goes through here; tests can too.
    pub fn from_tables(
        wmis: Vec<Wmi>,
        patterns: Vec<Pattern>,
        elements: Vec<Element>,
        version: String,
        release_date: NaiveDate,
    ) -> Self {
        let mut by_wmi3 = HashMap::new();
        let mut by_wmi6: HashMap<String, Vec<Wmi>> = HashMap::new();
        for wmi in wmis {
            if wmi.vis_suffix.is_some() {
                by_wmi6.entry(wmi.code.clone()).or_default().push(wmi);
            } else {
                by_wmi3.insert(wmi.code.clone(), wmi);
            }
        }
        for entries in by_wmi6.values_mut() {
            entries.sort_by(|a, b| a.vis_suffix.cmp(&b.vis_suffix));
        }

        let mut patterns_by_wmi: HashMap<String, Vec<Pattern>> = HashMap::new();
        for pattern in patterns {
            patterns_by_wmi
                .entry(pattern.wmi.clone())
                .or_default()
                .push(pattern);
        }
        for entries in patterns_by_wmi.values_mut() {
            entries.sort_by(evaluation_order);
        }

        let element_name_by_id = elements
            .into_iter()
            .map(|element| (element.id, element.name))
            .collect();

        Self {
            by_wmi3,
            by_wmi6,
            patterns_by_wmi,
            element_name_by_id,
            version,
            release_date,
        }
    }

    /// The process-wide snapshot, loaded on first use.
    ///
    /// Initialization runs at most once even under concurrent first callers;
    /// afterwards this is a plain read.
    ///
    /// # Errors
    ///
    /// Every caller sees the same [`SnapshotError`] when the bundled data
    /// image is malformed.
    pub fn shared() -> Result<&'static Snapshot, SnapshotError> {
        SHARED.as_ref().map_err(Clone::clone)
    }

    /// The mass-market WMI record for a 3-character code.
    pub fn wmi3(&self, code: &str) -> Option<&Wmi> {
        self.by_wmi3.get(code)
    }

    /// The specialized WMI record for a 3-character code whose VIS suffix
    /// equals `suffix` (VIN positions 12-14).
    pub fn wmi6(&self, code: &str, suffix: &str) -> Option<&Wmi> {
        self.by_wmi6
            .get(code)?
            .iter()
            .find(|wmi| wmi.vis_suffix.as_deref() == Some(suffix))
    }

    /// The decoding patterns registered under a WMI code, in evaluation
    /// order.
    pub fn patterns(&self, wmi: &str) -> &[Pattern] {
        self.patterns_by_wmi.get(wmi).map_or(&[], Vec::as_slice)
    }

    /// The name of a vehicle specification element.
    pub fn element_name(&self, element_id: u32) -> Option<&str> {
        self.element_name_by_id.get(&element_id).map(String::as_str)
    }

    /// The vPIC version the snapshot was extracted from.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// The release date of the vPIC extract.
    pub fn release_date(&self) -> NaiveDate {
        self.release_date
    }

    /// Highest model year the snapshot can describe.
    ///
    /// vPIC lists next-year models ahead of the calendar, so the 30-year
    /// cycle is clipped one year past the release date.
    pub fn max_model_year(&self) -> i32 {
        self.release_date.year() + 1
    }
}
