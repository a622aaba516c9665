//! Account entity and its input field sets
//!
//! # Validation Rules
//!
//! - `name` and `number` must be non-blank and are globally unique
//!   (uniqueness is enforced by the store at commit time)
//! - `balance` must be greater than zero at creation; after creation it
//!   may reach exactly zero through expense deductions, but never below
//! - the balance is never writable through the public field sets:
//!   [`AccountPatch`] deliberately has no balance field, so only the
//!   reconciliation engine can move it

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{AccountId, ValidationErrors};

/// A financial account with a running balance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier, system-assigned and immutable
    pub id: AccountId,
    /// Display name, unique across all accounts
    pub name: String,
    /// Account number, unique across all accounts
    pub number: String,
    /// Current balance; kept >= 0 by the reconciliation engine
    pub balance: i64,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Last modified timestamp
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Creates a new account from validated input fields
    ///
    /// The identifier is time-ordered (UUIDv7) so insertion order is
    /// recoverable even for equal timestamps.
    pub fn new(fields: NewAccount) -> Self {
        let now = Utc::now();
        Self {
            id: AccountId::new_v7(),
            name: fields.name,
            number: fields.number,
            balance: fields.balance,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Input fields for account creation
#[derive(Debug, Clone, Deserialize)]
pub struct NewAccount {
    pub name: String,
    pub number: String,
    /// Starting balance; must be > 0
    pub balance: i64,
}

impl NewAccount {
    /// Checks presence and range rules, collecting every failure
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.name.trim().is_empty() {
            errors.add("name", "can't be blank");
        }
        if self.number.trim().is_empty() {
            errors.add("number", "can't be blank");
        }
        if self.balance <= 0 {
            errors.add("balance", "must be greater than 0");
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Partial update for an account
///
/// Only identity fields are patchable. There is intentionally no way to
/// express a balance write here; balance mutations happen solely inside
/// the reconciliation engine's atomic expense mutations.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountPatch {
    pub name: Option<String>,
    pub number: Option<String>,
}

impl AccountPatch {
    /// Checks that provided fields are non-blank
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if matches!(&self.name, Some(name) if name.trim().is_empty()) {
            errors.add("name", "can't be blank");
        }
        if matches!(&self.number, Some(number) if number.trim().is_empty()) {
            errors.add("number", "can't be blank");
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Returns true if no field is provided
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.number.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> NewAccount {
        NewAccount {
            name: "Checking".to_string(),
            number: "12345678".to_string(),
            balance: 1000,
        }
    }

    #[test]
    fn test_new_account_valid() {
        assert!(fields().validate().is_ok());
        let account = Account::new(fields());
        assert_eq!(account.balance, 1000);
        assert_eq!(account.created_at, account.updated_at);
    }

    #[test]
    fn test_blank_name_and_number_rejected() {
        let mut input = fields();
        input.name = "  ".to_string();
        input.number = String::new();
        let errors = input.validate().unwrap_err();
        assert_eq!(errors.messages("name"), ["can't be blank"]);
        assert_eq!(errors.messages("number"), ["can't be blank"]);
    }

    #[test]
    fn test_zero_or_negative_balance_rejected() {
        for balance in [0, -50] {
            let mut input = fields();
            input.balance = balance;
            let errors = input.validate().unwrap_err();
            assert_eq!(errors.messages("balance"), ["must be greater than 0"]);
        }
    }

    #[test]
    fn test_patch_validates_provided_fields_only() {
        let patch = AccountPatch {
            name: Some(String::new()),
            number: None,
        };
        let errors = patch.validate().unwrap_err();
        assert!(errors.contains("name"));
        assert!(!errors.contains("number"));

        assert!(AccountPatch::default().validate().is_ok());
        assert!(AccountPatch::default().is_empty());
    }
}
