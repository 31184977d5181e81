// 📊 Summary - Totals over a list of movements

use crate::entities::{Category, Movement, MovementKind};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    pub movement_count: usize,
    pub total_income: f64,
    /// Magnitude of all expenses
    pub total_expenses: f64,
    /// Income minus expenses
    pub balance: f64,
    /// Expense totals keyed by category name, only categories with movements
    pub expenses_by_category: BTreeMap<String, f64>,
}

impl Summary {
    pub fn from_movements(movements: &[Movement]) -> Self {
        let mut summary = Summary {
            movement_count: movements.len(),
            ..Default::default()
        };

        for movement in movements {
            match movement.kind() {
                MovementKind::Income => summary.total_income += movement.amount(),
                MovementKind::Expense(category) => {
                    summary.total_expenses += movement.amount();
                    *summary
                        .expenses_by_category
                        .entry(category.as_str().to_string())
                        .or_insert(0.0) += movement.amount();
                }
            }
            summary.balance += movement.signed_amount();
        }

        summary
    }

    pub fn expenses_for(&self, category: Category) -> f64 {
        self.expenses_by_category
            .get(category.as_str())
            .copied()
            .unwrap_or(0.0)
    }
}
