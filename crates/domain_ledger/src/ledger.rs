//! The balance reconciliation engine
//!
//! [`Ledger`] wraps every expense mutation with the balance work needed
//! to preserve, for every account,
//! `balance == initial_balance - sum(amounts of its current expenses)`.
//!
//! The engine decides upfront which balances move and by how much
//! ([`BalanceCharge`]s), then hands the row change and the charges to
//! the store as a single atomic unit. There are no save hooks and no
//! ambient transaction: rejection at any point leaves every persisted
//! value exactly as it was.

use tracing::{debug, info};

use core_kernel::{AccountId, ExpenseId, ValidationErrors};

use crate::account::{Account, AccountPatch, NewAccount};
use crate::error::LedgerError;
use crate::expense::{Expense, ExpensePatch, NewExpense};
use crate::ports::{BalanceCharge, ExpenseChange, LedgerStore, StoreError};

/// The ledger service: sole writer of account balances
///
/// # Example
///
/// ```rust
/// use domain_ledger::{Ledger, MemoryStore, NewAccount, NewExpense};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), domain_ledger::LedgerError> {
/// let ledger = Ledger::new(MemoryStore::new());
///
/// let account = ledger
///     .create_account(NewAccount {
///         name: "Checking".into(),
///         number: "12345678".into(),
///         balance: 1000,
///     })
///     .await?;
///
/// let expense = ledger
///     .create_expense(NewExpense {
///         amount: 400,
///         date: chrono::NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
///         description: "Groceries".into(),
///         account_id: account.id,
///     })
///     .await?;
///
/// let (account, expenses) = ledger.account(account.id).await?;
/// assert_eq!(account.balance, 600);
/// assert_eq!(expenses, vec![expense]);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Ledger<S> {
    store: S,
}

impl<S: LedgerStore> Ledger<S> {
    /// Creates a ledger service over a store adapter
    pub fn new(store: S) -> Self {
        Self { store }
    }

    // ------------------------------------------------------------------
    // Accounts
    // ------------------------------------------------------------------

    /// Creates an account with a starting balance
    pub async fn create_account(&self, fields: NewAccount) -> Result<Account, LedgerError> {
        fields.validate()?;
        let account = Account::new(fields);
        self.store
            .insert_account(&account)
            .await
            .map_err(map_store_error)?;
        info!(account = %account.id, balance = account.balance, "account created");
        Ok(account)
    }

    /// Fetches an account together with its expenses, date descending
    pub async fn account(
        &self,
        id: AccountId,
    ) -> Result<(Account, Vec<Expense>), LedgerError> {
        let account = self
            .store
            .account(id)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| LedgerError::not_found("account", id))?;
        let expenses = self
            .store
            .account_expenses(id)
            .await
            .map_err(map_store_error)?;
        Ok((account, expenses))
    }

    /// Updates an account's identity fields
    ///
    /// The patch cannot carry a balance; balances move only through
    /// expense mutations.
    pub async fn update_account(
        &self,
        id: AccountId,
        patch: AccountPatch,
    ) -> Result<Account, LedgerError> {
        patch.validate()?;
        self.store
            .update_account(id, &patch)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| LedgerError::not_found("account", id))
    }

    /// Deletes an account, cascading to its expenses
    ///
    /// Cascaded expenses are removed without balance restoration: the
    /// account record being destroyed has no durable balance left to
    /// reconcile into.
    pub async fn delete_account(&self, id: AccountId) -> Result<(), LedgerError> {
        let existed = self
            .store
            .delete_account(id)
            .await
            .map_err(map_store_error)?;
        if !existed {
            return Err(LedgerError::not_found("account", id));
        }
        info!(account = %id, "account deleted, expenses cascaded");
        Ok(())
    }

    /// Lists all accounts, creation time descending
    pub async fn accounts(&self) -> Result<Vec<Account>, LedgerError> {
        self.store.accounts().await.map_err(map_store_error)
    }

    // ------------------------------------------------------------------
    // Expenses (reconciled)
    // ------------------------------------------------------------------

    /// Creates an expense, deducting its amount from the target account
    ///
    /// Rejected with a validation error keyed to `account` if the
    /// deduction would drive the balance below zero; in that case no
    /// row is persisted and no balance changes.
    pub async fn create_expense(&self, fields: NewExpense) -> Result<Expense, LedgerError> {
        fields.validate()?;
        let account_id = fields.account_id;
        self.require_account(account_id).await?;

        let expense = Expense::new(fields);
        let charge = BalanceCharge::deduct(account_id, expense.amount);
        self.store
            .apply_expense_change(ExpenseChange::Insert(expense.clone()), &[charge])
            .await
            .map_err(map_store_error)?;
        info!(expense = %expense.id, account = %account_id, amount = expense.amount, "expense created");
        Ok(expense)
    }

    /// Fetches a single expense
    pub async fn expense(&self, id: ExpenseId) -> Result<Expense, LedgerError> {
        self.store
            .expense(id)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| LedgerError::not_found("expense", id))
    }

    /// Lists all expenses, date descending
    pub async fn expenses(&self) -> Result<Vec<Expense>, LedgerError> {
        self.store.expenses().await.map_err(map_store_error)
    }

    /// Updates an expense, reconciling balances when the amount and/or
    /// owning account actually change
    ///
    /// - account unchanged, amount changed: the single account is
    ///   charged the amount delta (an increase deducts further, a
    ///   decrease restores)
    /// - account changed: the new amount is deducted from the new
    ///   account first; only if that succeeds is the old amount
    ///   restored onto the old account
    /// - neither changed: no balance work at all
    pub async fn update_expense(
        &self,
        id: ExpenseId,
        patch: ExpensePatch,
    ) -> Result<Expense, LedgerError> {
        patch.validate()?;
        let current = self
            .store
            .expense(id)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| LedgerError::not_found("expense", id))?;

        let mut updated = current.clone();
        if !patch.apply(&mut updated) {
            debug!(expense = %id, "no-op update, nothing persisted");
            return Ok(current);
        }

        let charges = self.reconcile_update(&current, &updated).await?;
        self.store
            .apply_expense_change(ExpenseChange::Update(updated.clone()), &charges)
            .await
            .map_err(map_store_error)?;
        info!(expense = %id, charges = charges.len(), "expense updated");
        Ok(updated)
    }

    /// Deletes an expense, restoring its amount onto the owning account
    pub async fn delete_expense(&self, id: ExpenseId) -> Result<(), LedgerError> {
        let current = self
            .store
            .expense(id)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| LedgerError::not_found("expense", id))?;

        let restore = BalanceCharge::restore(current.account_id, current.amount);
        self.store
            .apply_expense_change(ExpenseChange::Remove(id), &[restore])
            .await
            .map_err(map_store_error)?;
        info!(expense = %id, account = %current.account_id, amount = current.amount, "expense deleted, balance restored");
        Ok(())
    }

    /// Computes the balance charges an expense update requires.
    ///
    /// Charge order matters for failure reporting: the deduction on the
    /// target account is checked first, so an insufficient balance is
    /// always reported against the account that would go negative.
    async fn reconcile_update(
        &self,
        current: &Expense,
        updated: &Expense,
    ) -> Result<Vec<BalanceCharge>, LedgerError> {
        let amount_changed = updated.amount != current.amount;
        let account_changed = updated.account_id != current.account_id;

        if account_changed {
            self.require_account(updated.account_id).await?;
            Ok(vec![
                BalanceCharge::deduct(updated.account_id, updated.amount),
                BalanceCharge::restore(current.account_id, current.amount),
            ])
        } else if amount_changed {
            // Positive when the amount shrank (restore), negative when
            // it grew (further deduction).
            Ok(vec![BalanceCharge {
                account_id: current.account_id,
                delta: current.amount - updated.amount,
            }])
        } else {
            Ok(Vec::new())
        }
    }

    async fn require_account(&self, id: AccountId) -> Result<(), LedgerError> {
        self.store
            .account(id)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| LedgerError::not_found("account", id))?;
        Ok(())
    }
}

/// Maps store failures to the caller-visible error taxonomy.
///
/// An insufficient balance becomes a validation failure keyed to the
/// conceptual `account` field, phrased with the persisted (pre-failure)
/// balance; unique collisions become validation failures on the
/// colliding field.
fn map_store_error(err: StoreError) -> LedgerError {
    match err {
        StoreError::InsufficientBalance { balance, .. } => LedgerError::Validation(
            ValidationErrors::single("account", format!("balance is insufficient: ${balance}")),
        ),
        StoreError::Duplicate { field, .. } => {
            LedgerError::Validation(ValidationErrors::single(field, "has already been taken"))
        }
        StoreError::NotFound { entity, id } => LedgerError::NotFound { entity, id },
        err if err.is_transient() => LedgerError::Transient(err),
        err => LedgerError::Store(err),
    }
}
