// 🏷️ Category - Closed set of expense categories
//
// The numeric code is the ONLY persisted representation:
//   NECESSITY=1, CULTURE=2, LEISURE_VICE=3, EXTRAS=4
// Codes never change. An unknown code is a hard failure, never a default.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Rent, bills, groceries
    Necessity,

    /// Books, courses, museums
    Culture,

    /// Going out, treats, habits
    LeisureVice,

    /// Anything unplanned
    Extras,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Necessity,
        Category::Culture,
        Category::LeisureVice,
        Category::Extras,
    ];

    /// Stable code written to disk
    pub fn code(self) -> u8 {
        match self {
            Category::Necessity => 1,
            Category::Culture => 2,
            Category::LeisureVice => 3,
            Category::Extras => 4,
        }
    }

    pub fn from_code(code: i64) -> Result<Self, ValidationError> {
        match code {
            1 => Ok(Category::Necessity),
            2 => Ok(Category::Culture),
            3 => Ok(Category::LeisureVice),
            4 => Ok(Category::Extras),
            other => Err(ValidationError::UnknownCategory(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Necessity => "NECESSITY",
            Category::Culture => "CULTURE",
            Category::LeisureVice => "LEISURE_VICE",
            Category::Extras => "EXTRAS",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts the numeric code ("4") or the name ("extras", "leisure-vice")
impl FromStr for Category {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();

        if let Ok(code) = trimmed.parse::<i64>() {
            return Category::from_code(code);
        }

        let normalized = trimmed.to_ascii_uppercase().replace('-', "_");
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == normalized)
            .ok_or_else(|| ValidationError::UnknownCategory(s.to_string()))
    }
}
