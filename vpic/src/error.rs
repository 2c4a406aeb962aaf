//! Error type for loading the bundled vPIC snapshot.

use thiserror::Error;

/// Errors raised while building the [`Snapshot`](crate::Snapshot) from the
/// bundled table data.
///
/// The snapshot is embedded in the library at compile time, so these errors
/// only fire on a malformed data image. They are `Clone` because the shared
/// process-wide snapshot hands the same load result to every caller.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SnapshotError {
    /// A bundled table could not be parsed.
    #[error("vPIC snapshot table {table:?} is unreadable: {message}")]
    Unreadable {
        table: &'static str,
        message: String,
    },

    /// A row references an id that does not exist in the referenced table.
    #[error("vPIC snapshot table {table:?} row {row} references unknown {what} {id}")]
    DanglingReference {
        table: &'static str,
        row: usize,
        what: &'static str,
        id: u32,
    },

    /// The version table carries no row.
    #[error("vPIC snapshot has no version row")]
    MissingVersion,
}
