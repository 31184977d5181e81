// Entity Models
//
// - Category: closed enumeration, persisted as a numeric code
// - Movement: Income or Expense, validated at construction

pub mod category;
pub mod movement;

pub use category::Category;
pub use movement::{check_stored_amount, parse_amount, parse_date, Movement, MovementKind, DATE_FORMAT, MIN_CONCEPT_LEN};
