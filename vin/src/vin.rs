//! VIN validation and the [`Vin`] value object.
//!
//! A [`Vin`] is a syntactically valid 17-character Vehicle Identification
//! Number: every character is drawn from `0-9A-HJ-NPR-Z` and the weighted
//! check digit at position 9 matches the other sixteen positions. Input is
//! canonicalized to uppercase before validation, and a wrong check digit can
//! optionally be corrected instead of rejected.
//!
//! # Examples
//!
//! ```
//! use vin::{validate, Vin, VinError};
//!
//! // Lowercase input is accepted and canonicalized.
//! let vin = Vin::new("5fnyf5h59hb011946")?;
//! assert_eq!(vin.to_string(), "5FNYF5H59HB011946");
//! assert_eq!(vin.wmi(), "5FN");
//!
//! // A wrong check digit is rejected unless correction is requested.
//! assert!(matches!(
//!     Vin::new("4T1BE46K09U856421"),
//!     Err(VinError::InvalidCheckDigit { expected: '1', got: '0' })
//! ));
//! let corrected = validate("4T1BE46K09U856421", true)?;
//! assert_eq!(corrected.to_string(), "4T1BE46K19U856421");
//! # Ok::<(), vin::VinError>(())
//! ```

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::OnceLock;

use crate::chars::{self, CHECK_DIGIT_INDEX, VIN_LENGTH};
use crate::decode::{DecodedVehicle, Decoder};
use crate::error::VinError;

/// Validates a 17-character VIN.
///
/// ASCII letters are uppercased before validation; any other character
/// fails with [`VinError::InvalidCharacter`]. With `correct_check_digit`
/// set, a mismatched check digit is replaced by the computed one instead of
/// raising [`VinError::InvalidCheckDigit`], and the returned VIN carries the
/// corrected character.
///
/// # Examples
///
/// ```
/// use vin::{validate, VinError};
///
/// assert!(validate("KNDCE3LG2L5073161", false).is_ok());
/// assert!(matches!(
///     validate("KNDCE3LG2L507316", false),
///     Err(VinError::InvalidLength(16))
/// ));
/// // I, O and Q never appear in a VIN.
/// assert!(matches!(
///     validate("KNDCE3LG2L50731O1", false),
///     Err(VinError::InvalidCharacter { position: 16, character: 'O' })
/// ));
/// ```
pub fn validate(text: &str, correct_check_digit: bool) -> Result<Vin, VinError> {
    let length = text.chars().count();
    if length != VIN_LENGTH {
        return Err(VinError::InvalidLength(length));
    }

    let mut bytes = [0u8; VIN_LENGTH];
    for (index, character) in text.chars().enumerate() {
        let upper = character.to_ascii_uppercase();
        if !character.is_ascii() || !chars::is_permitted(upper) {
            return Err(VinError::InvalidCharacter {
                position: index + 1,
                character,
            });
        }
        bytes[index] = upper as u8;
    }

    let expected = chars::check_digit(&bytes);
    let got = bytes[CHECK_DIGIT_INDEX];
    if got != expected {
        if correct_check_digit {
            bytes[CHECK_DIGIT_INDEX] = expected;
        } else {
            return Err(VinError::InvalidCheckDigit {
                expected: expected as char,
                got: got as char,
            });
        }
    }

    Ok(Vin {
        bytes,
        decoded: OnceLock::new(),
    })
}

/// A validated Vehicle Identification Number.
///
/// Immutable after construction. The vehicle accessors (`manufacturer`,
/// `make`, `model_year`, ...) resolve the VIN against the bundled vPIC
/// snapshot on first use and memoize the result, so repeated reads are pure.
///
/// # Examples
///
/// ```
/// use vin::Vin;
///
/// let vin = Vin::new("KNDCE3LG2L5073161")?;
/// assert_eq!(vin.manufacturer(), "Kia");
/// assert_eq!(vin.model_year(), Some(2020));
/// assert_eq!(vin.description(), "2020 Kia Niro EX Premium");
/// # Ok::<(), vin::VinError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Vin {
    bytes: [u8; VIN_LENGTH],
    decoded: OnceLock<Box<DecodedVehicle>>,
}

impl Vin {
    /// Validates `text` without check-digit correction.
    ///
    /// # Errors
    ///
    /// See [`validate`].
    pub fn new(text: &str) -> Result<Self, VinError> {
        validate(text, false)
    }

    /// Whether `text` is a valid VIN.
    ///
    /// # Examples
    ///
    /// ```
    /// use vin::Vin;
    ///
    /// assert!(Vin::is_valid("4T1BE46K19U856421"));
    /// assert!(!Vin::is_valid("4T1BE46K29U856421"));
    /// assert!(!Vin::is_valid("too short"));
    /// ```
    pub fn is_valid(text: &str) -> bool {
        validate(text, false).is_ok()
    }

    /// The canonical 17-character uppercase form.
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.bytes).expect("VIN bytes are ASCII")
    }

    pub(crate) fn raw(&self) -> &[u8; VIN_LENGTH] {
        &self.bytes
    }

    /// World Manufacturer Identifier, positions 1-3.
    pub fn wmi(&self) -> &str {
        &self.as_str()[..3]
    }

    /// Vehicle Descriptor Section, positions 4-8.
    pub fn vds(&self) -> &str {
        &self.as_str()[3..8]
    }

    /// The check digit at position 9.
    pub fn check_digit(&self) -> char {
        self.bytes[CHECK_DIGIT_INDEX] as char
    }

    /// Vehicle Identifier Section, positions 10-17.
    pub fn vis(&self) -> &str {
        &self.as_str()[9..]
    }

    /// Model-year code, position 10.
    pub fn year_code(&self) -> char {
        self.bytes[9] as char
    }

    /// Plant code, position 11.
    pub fn plant_code(&self) -> char {
        self.bytes[10] as char
    }

    /// Positions 12-14, the second half of a specialized manufacturer's
    /// 6-character WMI.
    pub fn extended_wmi(&self) -> &str {
        &self.as_str()[11..14]
    }

    /// Decodes this VIN against the shared vPIC snapshot.
    ///
    /// Unresolved fields come back as empty strings; only a broken snapshot
    /// image is an error.
    ///
    /// # Errors
    ///
    /// [`VinError::Snapshot`] when the bundled snapshot cannot be loaded.
    pub fn decode(&self) -> Result<DecodedVehicle, VinError> {
        Ok(Decoder::shared()?.decode(self))
    }

    /// The memoized decoded record behind the field accessors.
    ///
    /// The snapshot is embedded in the library, so a load failure is not
    /// reachable in practice; if it ever happens the accessors read from an
    /// empty record rather than panicking.
    fn record(&self) -> &DecodedVehicle {
        self.decoded.get_or_init(|| {
            let vehicle = match Decoder::shared() {
                Ok(decoder) => decoder.decode(self),
                Err(_) => DecodedVehicle {
                    vin: self.as_str().to_string(),
                    wmi_code: self.wmi().to_string(),
                    ..DecodedVehicle::default()
                },
            };
            Box::new(vehicle)
        })
    }

    /// Vehicle manufacturer, e.g. `"Honda"`.
    pub fn manufacturer(&self) -> &str {
        &self.record().manufacturer
    }

    /// Vehicle make, e.g. `"Kia"`.
    pub fn make(&self) -> &str {
        &self.record().make
    }

    /// Vehicle model, e.g. `"Niro"`.
    pub fn model(&self) -> &str {
        &self.record().model
    }

    /// Vehicle series within the model line.
    pub fn series(&self) -> &str {
        &self.record().series
    }

    /// Trim level.
    pub fn trim(&self) -> &str {
        &self.record().trim
    }

    /// Body class, e.g. `"Sedan/Saloon"`.
    pub fn body_class(&self) -> &str {
        &self.record().body_class
    }

    /// Vehicle type, e.g. `"Passenger Car"`.
    pub fn vehicle_type(&self) -> &str {
        &self.record().vehicle_type
    }

    /// Four-digit model year, or `None` when position 10 carries no
    /// recognizable year code.
    pub fn model_year(&self) -> Option<i32> {
        self.record().model_year
    }

    /// City of the assembly plant.
    pub fn plant_city(&self) -> &str {
        &self.record().plant_city
    }

    /// State or province of the assembly plant.
    pub fn plant_state(&self) -> &str {
        &self.record().plant_state
    }

    /// Country of the assembly plant.
    pub fn plant_country(&self) -> &str {
        &self.record().plant_country
    }

    /// Company operating the assembly plant.
    pub fn plant_company(&self) -> &str {
        &self.record().plant_company
    }

    /// Electrification level, e.g. `"BEV (Battery Electric Vehicle)"`.
    pub fn electrification_level(&self) -> &str {
        &self.record().electrification_level
    }

    /// One-line description: year, make, model, series and trim, with
    /// unresolved parts elided.
    pub fn description(&self) -> &str {
        &self.record().description
    }
}

impl fmt::Display for Vin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Vin {
    type Err = VinError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        validate(s, false)
    }
}

impl TryFrom<&str> for Vin {
    type Error = VinError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        validate(value, false)
    }
}

impl PartialEq for Vin {
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes
    }
}

impl Eq for Vin {}

impl Hash for Vin {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bytes.hash(state);
    }
}
