//! Vehicle Identification Number (VIN) validation and decoding.
//!
//! This crate validates 17-character VINs as defined by 49 CFR Part 565 and
//! resolves them against a bundled snapshot of the NHTSA vPIC reference
//! database (the [`vpic`] crate). It covers:
//!
//! - Character-set and weighted check-digit validation, with optional
//!   correction of a wrong check digit
//! - Model-year decoding, including the 30-year cycle and unknown year codes
//! - WMI / VDS / VIS field access
//! - Resolution of manufacturer, make, model, series, trim, body class,
//!   vehicle type, plant and electrification level from the vPIC snapshot
//!
//! # Examples
//!
//! ```
//! use vin::Vin;
//!
//! let vin = Vin::new("5FNYF5H59HB011946")?;
//! assert_eq!(vin.manufacturer(), "Honda");
//! assert_eq!(vin.model(), "Pilot");
//! assert_eq!(vin.model_year(), Some(2017));
//!
//! // Or decode into an owned record in one step.
//! let vehicle = vin::decode("KNDCE3LG2L5073161")?;
//! assert_eq!(vehicle.description, "2020 Kia Niro EX Premium");
//! # Ok::<(), vin::VinError>(())
//! ```

mod chars;
mod year;

pub mod decode;
pub mod error;
pub mod vin;

pub use crate::decode::{decode, DecodedVehicle, Decoder};
pub use crate::error::VinError;
pub use crate::vin::{validate, Vin};
pub use vpic::{Snapshot, SnapshotError};

use chrono::NaiveDate;

/// Version of the vPIC database the bundled snapshot was extracted from.
///
/// # Errors
///
/// [`VinError::Snapshot`] when the bundled snapshot cannot be loaded.
pub fn vpic_version() -> Result<&'static str, VinError> {
    Ok(Snapshot::shared()?.version())
}

/// Release date of the bundled vPIC snapshot.
///
/// # Errors
///
/// [`VinError::Snapshot`] when the bundled snapshot cannot be loaded.
pub fn vpic_release_date() -> Result<NaiveDate, VinError> {
    Ok(Snapshot::shared()?.release_date())
}
