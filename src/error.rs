// ⚠️ Error Taxonomy
// Validation (construction), Reconstruction (stored row → Movement), Store (I/O, SQL)

use chrono::NaiveDate;
use thiserror::Error;

// ============================================================================
// VALIDATION
// ============================================================================

/// Raised when a Movement cannot be constructed.
/// Shape errors (text that is not a date/number/category) come first,
/// semantic errors (length, zero, future) after.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("date `{0}` is not an ISO-8601 date (YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("amount `{0}` is not a number")]
    InvalidAmount(String),

    #[error("amount must be a finite number")]
    NonFiniteAmount,

    #[error("stored amount {0} is negative, amounts are stored as magnitudes")]
    NegativeStoredAmount(f64),

    #[error("category `{0}` is not a known expense category")]
    UnknownCategory(String),

    #[error("concept must have at least {min} characters, got {len}")]
    ConceptTooShort { len: usize, min: usize },

    #[error("amount cannot be 0")]
    ZeroAmount,

    #[error("date {date} is later than today ({today})")]
    FutureDate { date: NaiveDate, today: NaiveDate },
}

// ============================================================================
// RECONSTRUCTION
// ============================================================================

/// A stored row that does not decode into a valid Movement.
/// `at` locates the row ("row 3" in a CSV file, "id 7" in the database).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReconstructionError {
    #[error("{at}: unknown movement type `{tag}`")]
    UnknownKind { at: String, tag: String },

    #[error("{at}: {source}")]
    Invalid {
        at: String,
        #[source]
        source: ValidationError,
    },
}

// ============================================================================
// STORE
// ============================================================================

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("cannot rebuild stored movement: {0}")]
    Reconstruction(#[from] ReconstructionError),

    #[error("no movement with id {0}")]
    NotFound(i64),

    #[error("operation not supported by this store: {0}")]
    Unsupported(&'static str),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
