// Kakebo - Core Library
// Movement model plus its two stores (CSV file and SQLite), used by the CLI and tests

pub mod entities;
pub mod error;
pub mod store;
pub mod csv_store;  // Flat file, append-only
pub mod db;         // SQLite, full CRUD
pub mod summary;
pub mod settings;

// Re-export commonly used types
pub use entities::{
    parse_amount, parse_date,
    Category, Movement, MovementKind,
    DATE_FORMAT, MIN_CONCEPT_LEN,
};
pub use error::{ReconstructionError, StoreError, StoreResult, ValidationError};
pub use store::MovementStore;
pub use csv_store::{CsvStore, CSV_HEADER};
pub use db::{setup_database, SqliteStore};
pub use summary::Summary;
pub use settings::{Backend, Settings};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
