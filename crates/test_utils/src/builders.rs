//! Test Data Builders
//!
//! Builder patterns for the ledger input field sets, with sensible
//! defaults so tests only spell out the fields they care about.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::NaiveDate;
use core_kernel::AccountId;
use domain_ledger::{NewAccount, NewExpense};

use crate::fixtures::{fixture_date, MODEST_AMOUNT, STANDARD_BALANCE};

static ACCOUNT_SEQ: AtomicU64 = AtomicU64::new(1);

/// Builder for [`NewAccount`] inputs
///
/// Name and number are sequence-numbered so repeated builds never trip
/// the uniqueness constraints by accident.
pub struct AccountBuilder {
    name: String,
    number: String,
    balance: i64,
}

impl Default for AccountBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AccountBuilder {
    /// Creates a builder with unique identity fields and the standard balance
    pub fn new() -> Self {
        let seq = ACCOUNT_SEQ.fetch_add(1, Ordering::Relaxed);
        Self {
            name: format!("Account {seq}"),
            number: format!("{:08}", seq),
            balance: STANDARD_BALANCE,
        }
    }

    /// Sets the account name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the account number
    pub fn with_number(mut self, number: impl Into<String>) -> Self {
        self.number = number.into();
        self
    }

    /// Sets the starting balance
    pub fn with_balance(mut self, balance: i64) -> Self {
        self.balance = balance;
        self
    }

    /// Builds the input field set
    pub fn build(self) -> NewAccount {
        NewAccount {
            name: self.name,
            number: self.number,
            balance: self.balance,
        }
    }
}

/// Builder for [`NewExpense`] inputs
pub struct ExpenseBuilder {
    amount: i64,
    date: NaiveDate,
    description: String,
    account_id: AccountId,
}

impl ExpenseBuilder {
    /// Creates a builder charging a modest amount against the account
    pub fn new(account_id: AccountId) -> Self {
        Self {
            amount: MODEST_AMOUNT,
            date: fixture_date(),
            description: "Lunch".to_string(),
            account_id,
        }
    }

    /// Sets the amount
    pub fn with_amount(mut self, amount: i64) -> Self {
        self.amount = amount;
        self
    }

    /// Sets the date
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = date;
        self
    }

    /// Sets the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Builds the input field set
    pub fn build(self) -> NewExpense {
        NewExpense {
            amount: self.amount,
            date: self.date,
            description: self.description,
            account_id: self.account_id,
        }
    }
}
