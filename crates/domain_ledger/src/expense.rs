//! Expense entity and its input field sets
//!
//! # Validation Rules
//!
//! - `amount` must be a positive integer
//! - `description` must be non-blank
//! - `date` and `account_id` arrive already typed from the request
//!   layer, so presence is guaranteed by construction
//!
//! Reassigning `account_id` is allowed; the reconciliation engine moves
//! the amount between the two accounts atomically.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{AccountId, ExpenseId, ValidationErrors};

/// An expense charged against an account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    /// Unique identifier, system-assigned and immutable
    pub id: ExpenseId,
    /// Amount deducted from the owning account; always > 0
    pub amount: i64,
    /// Date the expense occurred
    pub date: NaiveDate,
    /// What the expense was for
    pub description: String,
    /// The account currently owning this expense
    pub account_id: AccountId,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Last modified timestamp
    pub updated_at: DateTime<Utc>,
}

impl Expense {
    /// Creates a new expense from validated input fields
    pub fn new(fields: NewExpense) -> Self {
        let now = Utc::now();
        Self {
            id: ExpenseId::new_v7(),
            amount: fields.amount,
            date: fields.date,
            description: fields.description,
            account_id: fields.account_id,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Input fields for expense creation
#[derive(Debug, Clone, Deserialize)]
pub struct NewExpense {
    pub amount: i64,
    pub date: NaiveDate,
    pub description: String,
    pub account_id: AccountId,
}

impl NewExpense {
    /// Checks presence and range rules, collecting every failure
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.amount <= 0 {
            errors.add("amount", "must be greater than 0");
        }
        if self.description.trim().is_empty() {
            errors.add("description", "can't be blank");
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Partial update for an expense
///
/// Any combination of fields may be provided. Balance reconciliation is
/// only triggered when `amount` and/or `account_id` actually change
/// relative to the persisted row.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExpensePatch {
    pub amount: Option<i64>,
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
    pub account_id: Option<AccountId>,
}

impl ExpensePatch {
    /// Checks that provided fields satisfy the entity rules
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if matches!(self.amount, Some(amount) if amount <= 0) {
            errors.add("amount", "must be greater than 0");
        }
        if matches!(&self.description, Some(description) if description.trim().is_empty()) {
            errors.add("description", "can't be blank");
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Applies the provided fields to an expense row.
    ///
    /// Returns true if any field actually changed value; `updated_at`
    /// is only touched in that case.
    pub fn apply(&self, expense: &mut Expense) -> bool {
        let mut changed = false;
        if let Some(amount) = self.amount {
            changed |= expense.amount != amount;
            expense.amount = amount;
        }
        if let Some(date) = self.date {
            changed |= expense.date != date;
            expense.date = date;
        }
        if let Some(description) = &self.description {
            changed |= expense.description != *description;
            expense.description = description.clone();
        }
        if let Some(account_id) = self.account_id {
            changed |= expense.account_id != account_id;
            expense.account_id = account_id;
        }
        if changed {
            expense.updated_at = Utc::now();
        }
        changed
    }
}
