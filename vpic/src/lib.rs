//! Read-only store over a bundled extract of the NHTSA vPIC database.
//!
//! This crate owns the reference data a VIN decoder resolves against: World
//! Manufacturer Identifier assignments, vehicle specification patterns and
//! the element catalog, shipped as CSV relations embedded at compile time.
//! On first use the tables are parsed, joined and indexed into an immutable
//! [`Snapshot`] that is safe to share across threads without locking.
//!
//! # Examples
//!
//! ```
//! use vpic::Snapshot;
//!
//! let snapshot = Snapshot::shared()?;
//! let honda = snapshot.wmi3("5FN").unwrap();
//! assert_eq!(honda.manufacturer, "Honda");
//! assert_eq!(snapshot.element_name(26), Some("Make"));
//! # Ok::<(), vpic::SnapshotError>(())
//! ```

mod tables;

pub mod error;
pub mod snapshot;

pub use crate::error::SnapshotError;
pub use crate::snapshot::{Element, Pattern, Snapshot, Wmi};
