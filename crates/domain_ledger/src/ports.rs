//! Ledger persistence port
//!
//! The domain talks to storage through the [`LedgerStore`] trait,
//! enabling swappable implementations:
//!
//! - **PostgreSQL adapter** (`infra_db`): row-level locks and SQL
//!   transactions
//! - **Memory adapter** ([`crate::MemoryStore`]): mutex-serialized,
//!   for tests and embedding
//!
//! The contract that makes reconciliation sound lives here:
//! [`LedgerStore::apply_expense_change`] must commit the expense row
//! change and every [`BalanceCharge`] as one atomic unit, rejecting the
//! whole operation if any charge would drive a balance below zero.
//! Adapters must also serialize concurrent mutations touching the same
//! account (row lock, version check, or equivalent) - never a broader
//! global lock than the accounts involved, except where the backing
//! store is inherently single-writer.

use async_trait::async_trait;
use thiserror::Error;

use core_kernel::{AccountId, ExpenseId};

use crate::account::{Account, AccountPatch};
use crate::expense::Expense;

/// A guarded, signed balance adjustment for a single account
///
/// Applied as `balance += delta` inside the surrounding transaction.
/// The store rejects the whole operation with
/// [`StoreError::InsufficientBalance`] if the resulting balance would
/// be negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceCharge {
    pub account_id: AccountId,
    pub delta: i64,
}

impl BalanceCharge {
    /// Charge that deducts `amount` from an account
    pub fn deduct(account_id: AccountId, amount: i64) -> Self {
        Self {
            account_id,
            delta: -amount,
        }
    }

    /// Charge that restores `amount` onto an account
    ///
    /// Restoring never reduces a balance, so this charge cannot fail
    /// the non-negativity check on its own.
    pub fn restore(account_id: AccountId, amount: i64) -> Self {
        Self {
            account_id,
            delta: amount,
        }
    }
}

/// The expense row change half of an atomic mutation
#[derive(Debug, Clone)]
pub enum ExpenseChange {
    /// Persist a new expense row
    Insert(Expense),
    /// Replace the persisted row with this state
    Update(Expense),
    /// Remove the row (standalone delete; cascade removal happens only
    /// inside [`LedgerStore::delete_account`] and carries no charges)
    Remove(ExpenseId),
}

/// Errors surfaced by store adapters
#[derive(Debug, Error)]
pub enum StoreError {
    /// Referenced row does not exist
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Unique field collision
    #[error("duplicate {field}: {value}")]
    Duplicate { field: &'static str, value: String },

    /// A charge would have driven the account's balance below zero;
    /// carries the persisted (pre-failure) balance
    #[error("insufficient balance on account {account_id}: {balance}")]
    InsufficientBalance {
        account_id: AccountId,
        balance: i64,
    },

    /// Concurrent mutation conflict; the operation may succeed on retry
    #[error("conflicting concurrent update: {0}")]
    Conflict(String),

    /// Could not reach the backing store
    #[error("store connection failed: {0}")]
    Connection(String),

    /// The operation did not complete in time
    #[error("store operation timed out: {0}")]
    Timeout(String),

    /// Adapter invariant violation or unclassified failure
    #[error("internal store error: {0}")]
    Internal(String),
}

impl StoreError {
    /// Creates a NotFound error for an entity/id pair
    pub fn not_found(entity: &'static str, id: impl std::fmt::Display) -> Self {
        StoreError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Returns true if the failure is transient and the whole mutation
    /// may be retried by the caller
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            StoreError::Conflict(_) | StoreError::Connection(_) | StoreError::Timeout(_)
        )
    }

    /// Returns true if the failure is a missing row
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

/// Persistence port for accounts and expenses
///
/// Mutating operations must have zero observable effect when they
/// return an error: no partial balance change, no orphaned row.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Persists a new account; rejects duplicate `name`/`number`
    async fn insert_account(&self, account: &Account) -> Result<(), StoreError>;

    /// Fetches a single account
    async fn account(&self, id: AccountId) -> Result<Option<Account>, StoreError>;

    /// Fetches the expenses owned by an account, date descending
    async fn account_expenses(&self, id: AccountId) -> Result<Vec<Expense>, StoreError>;

    /// Applies identity-field changes to an account, returning the
    /// updated row, or `None` if the account does not exist.
    ///
    /// The patch carries no balance by construction; this operation
    /// never moves a balance.
    async fn update_account(
        &self,
        id: AccountId,
        patch: &AccountPatch,
    ) -> Result<Option<Account>, StoreError>;

    /// Deletes an account and cascades to its expenses without
    /// restoring any balance (the account is being destroyed).
    ///
    /// Returns true if the account existed.
    async fn delete_account(&self, id: AccountId) -> Result<bool, StoreError>;

    /// Lists all accounts, creation time descending
    async fn accounts(&self) -> Result<Vec<Account>, StoreError>;

    /// Fetches a single expense
    async fn expense(&self, id: ExpenseId) -> Result<Option<Expense>, StoreError>;

    /// Lists all expenses, date descending
    async fn expenses(&self) -> Result<Vec<Expense>, StoreError>;

    /// Commits an expense row change and its balance charges as one
    /// atomic unit.
    ///
    /// Charges are checked in order against current balances before
    /// anything is written; the first charge whose resulting balance
    /// would be negative aborts the whole operation with
    /// [`StoreError::InsufficientBalance`] carrying that account's
    /// persisted balance. Concurrent mutations touching any charged
    /// account must be serialized against this one.
    async fn apply_expense_change(
        &self,
        change: ExpenseChange,
        charges: &[BalanceCharge],
    ) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_charge_constructors() {
        let id = AccountId::new_v7();
        assert_eq!(BalanceCharge::deduct(id, 400).delta, -400);
        assert_eq!(BalanceCharge::restore(id, 400).delta, 400);
    }

    #[test]
    fn test_transient_classification() {
        assert!(StoreError::Conflict("serialization".into()).is_transient());
        assert!(StoreError::Connection("refused".into()).is_transient());
        assert!(StoreError::Timeout("5s".into()).is_transient());

        assert!(!StoreError::not_found("account", "x").is_transient());
        assert!(StoreError::not_found("account", "x").is_not_found());
        assert!(!StoreError::InsufficientBalance {
            account_id: AccountId::new_v7(),
            balance: 300,
        }
        .is_transient());
    }
}
