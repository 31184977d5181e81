// 💶 Movement Entity - Income or Expense
//
// A Movement only exists if it is valid:
// - concept has at least 5 characters
// - date is not later than today
// - amount is finite and non-zero
//
// Amounts are stored as magnitudes. Direction comes from the kind:
// Income adds to the balance, Expense subtracts from it.

use super::category::Category;
use crate::error::ValidationError;
use chrono::{Local, NaiveDate};
use serde::Serialize;
use std::fmt;

/// Minimum concept length, in characters
pub const MIN_CONCEPT_LEN: usize = 5;

/// ISO-8601 date format used by both stores
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// ============================================================================
// MOVEMENT KIND
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MovementKind {
    Income,
    Expense(Category),
}

impl MovementKind {
    /// Discriminator written to the `tipo_movimiento` column
    pub fn tag(&self) -> &'static str {
        match self {
            MovementKind::Income => "I",
            MovementKind::Expense(_) => "G",
        }
    }

    pub fn category(&self) -> Option<Category> {
        match self {
            MovementKind::Income => None,
            MovementKind::Expense(category) => Some(*category),
        }
    }
}

// ============================================================================
// MOVEMENT
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct Movement {
    /// Surrogate key, only set once saved in the relational store
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<i64>,
    concept: String,
    date: NaiveDate,
    amount: f64,
    kind: MovementKind,
}

impl Movement {
    pub fn income(
        concept: impl Into<String>,
        date: NaiveDate,
        amount: f64,
    ) -> Result<Self, ValidationError> {
        Self::new(concept, date, amount, MovementKind::Income)
    }

    pub fn expense(
        concept: impl Into<String>,
        date: NaiveDate,
        amount: f64,
        category: Category,
    ) -> Result<Self, ValidationError> {
        Self::new(concept, date, amount, MovementKind::Expense(category))
    }

    /// Validate against the current local date and build the movement
    pub fn new(
        concept: impl Into<String>,
        date: NaiveDate,
        amount: f64,
        kind: MovementKind,
    ) -> Result<Self, ValidationError> {
        Self::new_as_of(concept, date, amount, kind, today())
    }

    pub(crate) fn new_as_of(
        concept: impl Into<String>,
        date: NaiveDate,
        amount: f64,
        kind: MovementKind,
        today: NaiveDate,
    ) -> Result<Self, ValidationError> {
        let concept = concept.into();

        check_amount(amount)?;
        check_concept(&concept)?;
        check_date(date, today)?;

        Ok(Movement {
            id: None,
            concept,
            date,
            amount: amount.abs(),
            kind,
        })
    }

    /// Attach the identifier assigned by a store
    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn id(&self) -> Option<i64> {
        self.id
    }

    pub fn concept(&self) -> &str {
        &self.concept
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Magnitude, always positive
    pub fn amount(&self) -> f64 {
        self.amount
    }

    /// Positive for income, negative for expenses
    pub fn signed_amount(&self) -> f64 {
        match self.kind {
            MovementKind::Income => self.amount,
            MovementKind::Expense(_) => -self.amount,
        }
    }

    pub fn kind(&self) -> MovementKind {
        self.kind
    }

    pub fn category(&self) -> Option<Category> {
        self.kind.category()
    }

    pub fn is_income(&self) -> bool {
        matches!(self.kind, MovementKind::Income)
    }

    pub fn is_expense(&self) -> bool {
        matches!(self.kind, MovementKind::Expense(_))
    }

    // ========================================================================
    // CORRECTION (before re-saving)
    // Each setter validates first; on error the movement is unchanged.
    // ========================================================================

    pub fn set_concept(&mut self, concept: impl Into<String>) -> Result<(), ValidationError> {
        let concept = concept.into();
        check_concept(&concept)?;
        self.concept = concept;
        Ok(())
    }

    pub fn set_date(&mut self, date: NaiveDate) -> Result<(), ValidationError> {
        check_date(date, today())?;
        self.date = date;
        Ok(())
    }

    pub fn set_amount(&mut self, amount: f64) -> Result<(), ValidationError> {
        check_amount(amount)?;
        self.amount = amount.abs();
        Ok(())
    }

    pub fn set_kind(&mut self, kind: MovementKind) {
        self.kind = kind;
    }
}

/// Identifier is not part of equality
impl PartialEq for Movement {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.concept == other.concept
            && self.date == other.date
            && self.amount == other.amount
    }
}

impl fmt::Display for Movement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            MovementKind::Income => write!(f, "Income: ")?,
            MovementKind::Expense(category) => write!(f, "Expense ({}): ", category)?,
        }
        write!(f, "{} {} {:.2}", self.date, self.concept, self.amount)
    }
}

// ============================================================================
// FIELD CHECKS
// ============================================================================

pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn check_amount(amount: f64) -> Result<(), ValidationError> {
    if !amount.is_finite() {
        return Err(ValidationError::NonFiniteAmount);
    }
    if amount == 0.0 {
        return Err(ValidationError::ZeroAmount);
    }
    Ok(())
}

fn check_concept(concept: &str) -> Result<(), ValidationError> {
    let len = concept.chars().count();
    if len < MIN_CONCEPT_LEN {
        return Err(ValidationError::ConceptTooShort {
            len,
            min: MIN_CONCEPT_LEN,
        });
    }
    Ok(())
}

fn check_date(date: NaiveDate, today: NaiveDate) -> Result<(), ValidationError> {
    if date > today {
        return Err(ValidationError::FutureDate { date, today });
    }
    Ok(())
}

/// Parse a stored or typed ISO-8601 date
pub fn parse_date(text: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(text.trim(), DATE_FORMAT)
        .map_err(|_| ValidationError::InvalidDate(text.to_string()))
}

/// Parse a stored or typed decimal amount
pub fn parse_amount(text: &str) -> Result<f64, ValidationError> {
    text.trim()
        .parse::<f64>()
        .map_err(|_| ValidationError::InvalidAmount(text.to_string()))
}

/// Stores hold magnitudes only. A negative stored amount is rejected, never flipped.
pub fn check_stored_amount(amount: f64) -> Result<f64, ValidationError> {
    if amount < 0.0 {
        return Err(ValidationError::NegativeStoredAmount(amount));
    }
    Ok(amount)
}
