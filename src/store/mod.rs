//! SQL access for the registry (employees), the ledger (attendance) and the
//! dashboard aggregate. Handlers never touch SQL directly.

pub mod dashboard;
pub mod ledger;
pub mod registry;

use derive_more::Display;

pub use dashboard::Aggregator;
pub use ledger::Ledger;
pub use registry::Registry;

#[derive(Debug, Display)]
pub enum StoreError {
    /// A unique constraint rejected the write. Carries the client-facing detail.
    #[display(fmt = "{}", _0)]
    Duplicate(&'static str),

    #[display(fmt = "Record not found")]
    NotFound,

    /// Attendance points at an employee pk that does not exist.
    #[display(fmt = "Employee {} does not exist", _0)]
    MissingEmployee(i64),

    #[display(fmt = "Database error: {}", _0)]
    Database(sqlx::Error),
}

impl std::error::Error for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Database(err)
    }
}

/// Maps a failed write onto the store's error conditions.
///
/// Uniqueness is enforced by the database at write time; a unique violation
/// becomes `Duplicate(detail)`, a foreign key violation on an attendance row
/// becomes `MissingEmployee` when the referenced pk is known.
pub(crate) fn classify_write_error(
    err: sqlx::Error,
    duplicate_detail: &'static str,
    employee_pk: Option<i64>,
) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return StoreError::Duplicate(duplicate_detail);
        }
        if db_err.is_foreign_key_violation() {
            if let Some(pk) = employee_pk {
                return StoreError::MissingEmployee(pk);
            }
        }
    }
    StoreError::Database(err)
}
