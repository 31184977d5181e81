// 🔌 Persistence Boundary
// The single entry point the presentation layer talks to.
// Implemented by CsvStore (flat file) and SqliteStore (relational).

use crate::entities::Movement;
use crate::error::StoreResult;
use chrono::NaiveDate;

pub trait MovementStore {
    /// Persist a validated movement.
    /// Returns the identifier when the store assigns one.
    fn submit(&mut self, movement: &Movement) -> StoreResult<Option<i64>>;

    /// Every stored movement
    fn fetch_all(&self) -> StoreResult<Vec<Movement>>;

    /// Movements dated within `from..=to`
    fn fetch_between(&self, from: NaiveDate, to: NaiveDate) -> StoreResult<Vec<Movement>>;
}
