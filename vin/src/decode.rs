//! Resolution of a validated VIN against the vPIC reference snapshot.
//!
//! A [`Decoder`] borrows an immutable [`Snapshot`] and turns a [`Vin`] into
//! a [`DecodedVehicle`]: it selects the manufacturer's WMI record (6-character
//! specialized identifiers win over 3-character mass-market ones), walks the
//! WMI's patterns in precomputed specificity order, and merges the element
//! values they assign. Decoding never fails; fields the snapshot cannot
//! resolve stay empty.

use std::collections::HashMap;

use vpic::{Snapshot, Wmi};

use crate::error::VinError;
use crate::vin::Vin;
use crate::year;

const MAKE: &str = "Make";
const MODEL: &str = "Model";
const SERIES: &str = "Series";
const TRIM: &str = "Trim";
const BODY_CLASS: &str = "Body Class";
const VEHICLE_TYPE: &str = "Vehicle Type";
const PLANT_CITY: &str = "Plant City";
const PLANT_STATE: &str = "Plant State";
const PLANT_COUNTRY: &str = "Plant Country";
const PLANT_COMPANY_NAME: &str = "Plant Company Name";
const ELECTRIFICATION_LEVEL: &str = "Electrification Level";

/// The structured description of a decoded vehicle.
///
/// String fields default to the empty string when the snapshot carries no
/// value for them; `model_year` is `None` when the VIN's year code is
/// unrecognized.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedVehicle {
    /// Canonical 17-character form of the decoded VIN.
    pub vin: String,
    /// VIN positions 1-3.
    pub wmi_code: String,
    pub manufacturer: String,
    pub make: String,
    pub model: String,
    pub series: String,
    pub trim: String,
    pub body_class: String,
    pub vehicle_type: String,
    pub model_year: Option<i32>,
    pub plant_city: String,
    pub plant_state: String,
    pub plant_country: String,
    pub plant_company: String,
    pub electrification_level: String,
    /// Year, make, model, series and trim joined by single spaces, with
    /// unresolved parts elided.
    pub description: String,
}

/// Stateless facade over a [`Snapshot`].
#[derive(Debug, Clone, Copy)]
pub struct Decoder<'a> {
    snapshot: &'a Snapshot,
}

impl<'a> Decoder<'a> {
    /// A decoder over an explicit snapshot.
    pub fn new(snapshot: &'a Snapshot) -> Self {
        Self { snapshot }
    }

    /// A decoder over the process-wide snapshot, loading it on first use.
    ///
    /// # Errors
    ///
    /// [`VinError::Snapshot`] when the bundled data image is malformed.
    pub fn shared() -> Result<Decoder<'static>, VinError> {
        Ok(Decoder::new(Snapshot::shared()?))
    }

    /// The snapshot this decoder resolves against.
    pub fn snapshot(&self) -> &'a Snapshot {
        self.snapshot
    }

    /// Selects the WMI record for a VIN. A specialized manufacturer whose
    /// VIS suffix matches positions 12-14 takes precedence over the
    /// mass-market record for the same 3-character code.
    fn select_wmi(&self, vin: &Vin) -> Option<&'a Wmi> {
        self.snapshot
            .wmi6(vin.wmi(), vin.extended_wmi())
            .or_else(|| self.snapshot.wmi3(vin.wmi()))
    }

    /// Decodes a validated VIN. Infallible: unknown manufacturers, models
    /// and years come back as empty fields, not errors.
    ///
    /// # Examples
    ///
    /// ```
    /// use vin::{Decoder, Vin};
    ///
    /// let decoder = Decoder::shared()?;
    /// let vehicle = decoder.decode(&Vin::new("YT9NN1U14KA007175")?);
    /// assert_eq!(vehicle.manufacturer, "Koenigsegg");
    /// assert_eq!(vehicle.model, "Regera");
    /// # Ok::<(), vin::VinError>(())
    /// ```
    pub fn decode(&self, vin: &Vin) -> DecodedVehicle {
        let model_year = year::model_year(
            vin.raw()[9],
            vin.raw()[6],
            self.snapshot.max_model_year(),
        );

        let mut elements: HashMap<&str, &str> = HashMap::new();
        for pattern in self.snapshot.patterns(vin.wmi()) {
            if !pattern.year_scope_contains(model_year) {
                continue;
            }
            if !key_matches(&pattern.key, vin.as_str()) {
                continue;
            }
            let Some(name) = self.snapshot.element_name(pattern.element_id) else {
                continue;
            };
            // Patterns arrive most-specific first; the first assignment of
            // an element wins.
            elements.entry(name).or_insert(pattern.value.as_str());
        }

        let wmi = self.select_wmi(vin);
        let element = |name: &str| elements.get(name).copied().unwrap_or_default().to_string();
        let wmi_field = |field: fn(&Wmi) -> &String| {
            wmi.map(|record| field(record).clone()).unwrap_or_default()
        };

        let make = match elements.get(MAKE) {
            Some(assigned) => (*assigned).to_string(),
            None => wmi_field(|record| &record.make),
        };
        let vehicle_type = match elements.get(VEHICLE_TYPE) {
            Some(assigned) => (*assigned).to_string(),
            None => wmi_field(|record| &record.vehicle_type),
        };
        let model = element(MODEL);
        let series = element(SERIES);
        let trim = element(TRIM);
        let description = build_description(model_year, [&make, &model, &series, &trim]);

        DecodedVehicle {
            vin: vin.as_str().to_string(),
            wmi_code: vin.wmi().to_string(),
            manufacturer: wmi_field(|record| &record.manufacturer),
            make,
            model,
            series,
            trim,
            body_class: element(BODY_CLASS),
            vehicle_type,
            model_year,
            plant_city: element(PLANT_CITY),
            plant_state: element(PLANT_STATE),
            plant_country: element(PLANT_COUNTRY),
            plant_company: element(PLANT_COMPANY_NAME),
            electrification_level: element(ELECTRIFICATION_LEVEL),
            description,
        }
    }
}

/// Validates and decodes in one step, against the shared snapshot.
///
/// # Errors
///
/// Validation errors for malformed input (no check-digit correction is
/// applied), or [`VinError::Snapshot`] when the bundled snapshot cannot be
/// loaded. An unknown vehicle is not an error.
///
/// # Examples
///
/// ```
/// use vin::decode;
///
/// let vehicle = decode("5FNYF5H59HB011946")?;
/// assert_eq!(vehicle.manufacturer, "Honda");
/// assert_eq!(vehicle.model_year, Some(2017));
/// # Ok::<(), vin::VinError>(())
/// ```
pub fn decode(text: &str) -> Result<DecodedVehicle, VinError> {
    let vin = crate::vin::validate(text, false)?;
    Ok(Decoder::shared()?.decode(&vin))
}

/// Matches a key pattern against a VIN from position 4 onward. `*` matches
/// any single character.
fn key_matches(key: &str, vin: &str) -> bool {
    let tail = &vin.as_bytes()[3..];
    key.len() <= tail.len()
        && key
            .bytes()
            .zip(tail)
            .all(|(pattern, &actual)| pattern == b'*' || pattern == actual)
}

/// Joins the non-empty description parts with single spaces.
fn build_description(model_year: Option<i32>, parts: [&str; 4]) -> String {
    let mut description = String::new();
    if let Some(year) = model_year {
        description.push_str(&year.to_string());
    }
    for part in parts {
        if part.is_empty() {
            continue;
        }
        if !description.is_empty() {
            description.push(' ');
        }
        description.push_str(part);
    }
    description
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::NaiveDate;
    use vpic::{Element, Pattern};

    fn wmi(code: &str, suffix: Option<&str>, manufacturer: &str, make: &str) -> Wmi {
        Wmi {
            code: code.to_string(),
            vis_suffix: suffix.map(str::to_string),
            manufacturer: manufacturer.to_string(),
            make: make.to_string(),
            vehicle_type: "Passenger Car".to_string(),
            country: "UNITED STATES (USA)".to_string(),
            created_on: NaiveDate::from_ymd_opt(2015, 3, 26).unwrap(),
            updated_on: NaiveDate::from_ymd_opt(2015, 3, 26).unwrap(),
        }
    }

    fn pattern(
        id: u32,
        wmi: &str,
        key: &str,
        element_id: u32,
        value: &str,
        years: Option<(i32, i32)>,
    ) -> Pattern {
        Pattern {
            id,
            wmi: wmi.to_string(),
            key: key.to_string(),
            element_id,
            value: value.to_string(),
            year_from: years.map(|(from, _)| from),
            year_to: years.map(|(_, to)| to),
        }
    }

    fn elements() -> Vec<Element> {
        [(26, MAKE), (28, MODEL), (34, SERIES), (38, TRIM)]
            .into_iter()
            .map(|(id, name)| Element {
                id,
                name: name.to_string(),
                group: "General".to_string(),
            })
            .collect()
    }

    fn snapshot(wmis: Vec<Wmi>, patterns: Vec<Pattern>) -> Snapshot {
        Snapshot::from_tables(
            wmis,
            patterns,
            elements(),
            "test".to_string(),
            NaiveDate::from_ymd_opt(2025, 7, 14).unwrap(),
        )
    }

    #[test]
    fn key_matching() {
        let vin = "4T1BE46K19U856421";
        assert!(key_matches("BE46K", vin));
        assert!(key_matches("B*46K", vin));
        assert!(key_matches("*****", vin));
        assert!(key_matches("", vin));
        // A key may extend past the descriptor section, through the check
        // digit and year positions.
        assert!(key_matches("BE46K19", vin));
        assert!(!key_matches("BE46J", vin));
        assert!(!key_matches("E46K", vin));
        assert!(!key_matches("BE46K19U85642199999", vin));
    }

    #[test]
    fn description_elides_empty_parts() {
        assert_eq!(
            build_description(Some(2020), ["Kia", "Niro", "EX", "Premium"]),
            "2020 Kia Niro EX Premium"
        );
        assert_eq!(build_description(None, ["Honda", "", "", ""]), "Honda");
        assert_eq!(build_description(Some(2009), ["", "", "", ""]), "2009");
        assert_eq!(build_description(None, ["", "", "", ""]), "");
        assert_eq!(
            build_description(Some(2017), ["Honda", "Pilot", "", "Touring"]),
            "2017 Honda Pilot Touring"
        );
    }

    #[test]
    fn specialized_wmi_wins_over_mass_market() {
        let store = snapshot(
            vec![
                wmi("YT9", None, "Generic Sweden", "Generic"),
                wmi("YT9", Some("007"), "Koenigsegg", "Koenigsegg"),
            ],
            vec![],
        );
        let decoder = Decoder::new(&store);

        // Positions 12-14 are 007: the specialized record wins.
        let vin = Vin::new("YT9NN1U14KA007175").unwrap();
        assert_eq!(decoder.decode(&vin).manufacturer, "Koenigsegg");

        // Positions 12-14 differ: fall back to the 3-character record.
        let vin = Vin::new("YT9NN1U13KA123175").unwrap();
        assert_eq!(decoder.decode(&vin).manufacturer, "Generic Sweden");
    }

    #[test]
    fn unknown_wmi_still_evaluates_patterns() {
        let store = snapshot(
            vec![],
            vec![pattern(1, "YT9", "NN1", 28, "Regera", None)],
        );
        let decoder = Decoder::new(&store);
        let vehicle = decoder.decode(&Vin::new("YT9NN1U14KA007175").unwrap());
        assert_eq!(vehicle.manufacturer, "");
        assert_eq!(vehicle.make, "");
        assert_eq!(vehicle.model, "Regera");
        assert_eq!(vehicle.wmi_code, "YT9");
    }

    #[test]
    fn first_match_wins_per_element() {
        // KNDCE3LG2L5073161 decodes to model year 2020, VDS CE3LG.
        let store = snapshot(
            vec![wmi("KND", None, "Kia", "Kia")],
            vec![
                pattern(27, "KND", "CE*", 34, "LX", Some((2017, 2022))),
                pattern(21, "KND", "CE3LG", 34, "EX", Some((2019, 2022))),
            ],
        );
        let decoder = Decoder::new(&store);
        let vehicle = decoder.decode(&Vin::new("KNDCE3LG2L5073161").unwrap());
        // The exact key is more specific than the wildcard, whatever the id
        // order says.
        assert_eq!(vehicle.series, "EX");
    }

    #[test]
    fn make_pattern_overrides_wmi_make() {
        let store = snapshot(
            vec![wmi("KND", None, "Kia", "Kia")],
            vec![pattern(1, "KND", "CE3", 26, "Kia Export", None)],
        );
        let decoder = Decoder::new(&store);
        let vehicle = decoder.decode(&Vin::new("KNDCE3LG2L5073161").unwrap());
        assert_eq!(vehicle.make, "Kia Export");
    }

    #[test]
    fn unknown_model_year_only_matches_open_patterns() {
        // Position 10 is 0: no model year.
        let store = snapshot(
            vec![wmi("5FN", None, "Honda", "Honda")],
            vec![
                pattern(2, "5FN", "YF5", 28, "Pilot", Some((2016, 2018))),
                pattern(3, "5FN", "YF5", 34, "Open Series", None),
            ],
        );
        let decoder = Decoder::new(&store);
        let vehicle = decoder.decode(&Vin::new("5FNYF5H530B011946").unwrap());
        assert_eq!(vehicle.model_year, None);
        assert_eq!(vehicle.model, "");
        assert_eq!(vehicle.series, "Open Series");
        assert_eq!(vehicle.manufacturer, "Honda");
    }

    // End-to-end scenarios against the bundled snapshot.

    #[test]
    fn decodes_a_honda_pilot() {
        let vehicle = decode("5FNYF5H59HB011946").unwrap();
        assert_eq!(vehicle.manufacturer, "Honda");
        assert_eq!(vehicle.make, "Honda");
        assert_eq!(vehicle.model, "Pilot");
        assert_eq!(vehicle.model_year, Some(2017));
        assert_eq!(vehicle.wmi_code, "5FN");
        assert_eq!(vehicle.plant_city, "LINCOLN");
        assert_eq!(vehicle.plant_state, "ALABAMA");
        assert_eq!(vehicle.plant_country, "UNITED STATES (USA)");
        assert_eq!(vehicle.plant_company, "Honda Manufacturing of Alabama LLC");
        assert_eq!(
            vehicle.vehicle_type,
            "Multipurpose Passenger Vehicle (MPV)"
        );
    }

    #[test]
    fn decodes_a_specialized_manufacturer() {
        let vehicle = decode("YT9NN1U14KA007175").unwrap();
        assert_eq!(vehicle.manufacturer, "Koenigsegg");
        assert_eq!(vehicle.make, "Koenigsegg");
        assert_eq!(vehicle.model, "Regera");
        assert_eq!(vehicle.model_year, Some(2019));
        assert_eq!(
            vehicle.electrification_level,
            "PHEV (Plug-in Hybrid Electric Vehicle)"
        );
    }

    #[test]
    fn decodes_a_kia_niro_description() {
        let vehicle = decode("KNDCE3LG2L5073161").unwrap();
        assert_eq!(vehicle.description, "2020 Kia Niro EX Premium");
        assert_eq!(vehicle.series, "EX");
        assert_eq!(vehicle.trim, "Premium");
        assert_eq!(
            vehicle.electrification_level,
            "HEV (Hybrid Electric Vehicle)"
        );
    }

    #[test]
    fn decodes_a_toyota_camry() {
        let vehicle = decode("4T1BE46K19U856421").unwrap();
        assert_eq!(vehicle.make, "Toyota");
        assert_eq!(vehicle.model, "Camry");
        assert_eq!(vehicle.model_year, Some(2009));
        assert_eq!(vehicle.body_class, "Sedan/Saloon");
        assert_eq!(vehicle.description, "2009 Toyota Camry");
    }

    #[test]
    fn unknown_year_keeps_the_manufacturer() {
        let vehicle = decode("5FNYF5H530B011946").unwrap();
        assert_eq!(vehicle.model_year, None);
        assert_eq!(vehicle.manufacturer, "Honda");
        // Year-scoped patterns are excluded without a model year.
        assert_eq!(vehicle.model, "");
        assert_eq!(vehicle.plant_city, "LINCOLN");
        assert_eq!(vehicle.description, "Honda");
    }

    #[test]
    fn unknown_wmi_decodes_to_empty_fields() {
        let vehicle = decode("1GKKRNED9EJ262581").unwrap();
        assert_eq!(vehicle.manufacturer, "");
        assert_eq!(vehicle.make, "");
        assert_eq!(vehicle.model_year, Some(2014));
        assert_eq!(vehicle.description, "2014");
    }

    #[test]
    fn decoding_is_idempotent() {
        let first = decode("KNDCE3LG2L5073161").unwrap();
        let second = decode(&first.vin).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn accessors_are_memoized_and_deterministic() {
        let vin = Vin::new("5YJ3E1EAXJF006588").unwrap();
        assert_eq!(vin.model(), "Model 3");
        assert_eq!(vin.model(), "Model 3");
        assert_eq!(vin.make(), "Tesla");
        assert_eq!(vin.model_year(), Some(2018));
        assert_eq!(
            vin.electrification_level(),
            "BEV (Battery Electric Vehicle)"
        );
        assert_eq!(vin.description(), "2018 Tesla Model 3");
    }

    #[test]
    fn malformed_input_raises_through_decode() {
        assert!(matches!(
            decode("5FNYF5H59HB01194"),
            Err(VinError::InvalidLength(16))
        ));
        assert!(matches!(
            decode("5FNYF5H59HB01194O"),
            Err(VinError::InvalidCharacter { .. })
        ));
    }
}
