//! In-memory store adapter
//!
//! A mutex-serialized implementation of [`LedgerStore`] used by the
//! test suite and for embedding the ledger without a database. All
//! mutation checks run against current state before anything is
//! written, so a rejected operation leaves the state byte-identical.
//!
//! The single mutex trivially satisfies the per-account serialization
//! requirement; the PostgreSQL adapter in `infra_db` narrows the scope
//! to row-level locks.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;

use core_kernel::{AccountId, ExpenseId};

use crate::account::{Account, AccountPatch};
use crate::expense::Expense;
use crate::ports::{BalanceCharge, ExpenseChange, LedgerStore, StoreError};

#[derive(Debug, Default)]
struct State {
    accounts: BTreeMap<AccountId, Account>,
    expenses: BTreeMap<ExpenseId, Expense>,
}

/// Thread-safe in-memory [`LedgerStore`]
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        // Lock poisoning only happens if a holder panicked; the state
        // is still consistent because mutations are all-or-nothing.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn duplicate_check(
    state: &State,
    name: &str,
    number: &str,
    exclude: Option<AccountId>,
) -> Result<(), StoreError> {
    for account in state.accounts.values() {
        if Some(account.id) == exclude {
            continue;
        }
        if account.name == name {
            return Err(StoreError::Duplicate {
                field: "name",
                value: name.to_string(),
            });
        }
        if account.number == number {
            return Err(StoreError::Duplicate {
                field: "number",
                value: number.to_string(),
            });
        }
    }
    Ok(())
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn insert_account(&self, account: &Account) -> Result<(), StoreError> {
        let mut state = self.lock();
        duplicate_check(&state, &account.name, &account.number, None)?;
        state.accounts.insert(account.id, account.clone());
        Ok(())
    }

    async fn account(&self, id: AccountId) -> Result<Option<Account>, StoreError> {
        Ok(self.lock().accounts.get(&id).cloned())
    }

    async fn account_expenses(&self, id: AccountId) -> Result<Vec<Expense>, StoreError> {
        let state = self.lock();
        let mut expenses: Vec<Expense> = state
            .expenses
            .values()
            .filter(|expense| expense.account_id == id)
            .cloned()
            .collect();
        expenses.sort_by(|a, b| b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at)));
        Ok(expenses)
    }

    async fn update_account(
        &self,
        id: AccountId,
        patch: &AccountPatch,
    ) -> Result<Option<Account>, StoreError> {
        let mut state = self.lock();
        let Some(current) = state.accounts.get(&id).cloned() else {
            return Ok(None);
        };

        let name = patch.name.clone().unwrap_or_else(|| current.name.clone());
        let number = patch
            .number
            .clone()
            .unwrap_or_else(|| current.number.clone());
        duplicate_check(&state, &name, &number, Some(id))?;

        let Some(account) = state.accounts.get_mut(&id) else {
            return Ok(None);
        };
        account.name = name;
        account.number = number;
        account.updated_at = Utc::now();
        Ok(Some(account.clone()))
    }

    async fn delete_account(&self, id: AccountId) -> Result<bool, StoreError> {
        let mut state = self.lock();
        if state.accounts.remove(&id).is_none() {
            return Ok(false);
        }
        // Cascade: owned expenses vanish with no balance restoration.
        state.expenses.retain(|_, expense| expense.account_id != id);
        Ok(true)
    }

    async fn accounts(&self) -> Result<Vec<Account>, StoreError> {
        let state = self.lock();
        let mut accounts: Vec<Account> = state.accounts.values().cloned().collect();
        accounts.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then(b.id.as_uuid().cmp(a.id.as_uuid()))
        });
        Ok(accounts)
    }

    async fn expense(&self, id: ExpenseId) -> Result<Option<Expense>, StoreError> {
        Ok(self.lock().expenses.get(&id).cloned())
    }

    async fn expenses(&self) -> Result<Vec<Expense>, StoreError> {
        let state = self.lock();
        let mut expenses: Vec<Expense> = state.expenses.values().cloned().collect();
        expenses.sort_by(|a, b| b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at)));
        Ok(expenses)
    }

    async fn apply_expense_change(
        &self,
        change: ExpenseChange,
        charges: &[BalanceCharge],
    ) -> Result<(), StoreError> {
        let mut state = self.lock();

        // Phase 1: check every precondition against current state.
        match &change {
            ExpenseChange::Insert(expense) | ExpenseChange::Update(expense) => {
                if !state.accounts.contains_key(&expense.account_id) {
                    return Err(StoreError::not_found("account", expense.account_id));
                }
                if matches!(change, ExpenseChange::Update(_))
                    && !state.expenses.contains_key(&expense.id)
                {
                    return Err(StoreError::not_found("expense", expense.id));
                }
            }
            ExpenseChange::Remove(id) => {
                if !state.expenses.contains_key(id) {
                    return Err(StoreError::not_found("expense", *id));
                }
            }
        }

        // Charges compose through a projection so nothing is written
        // until every one of them clears the floor.
        let mut projected: BTreeMap<AccountId, i64> = BTreeMap::new();
        for charge in charges {
            let account = state
                .accounts
                .get(&charge.account_id)
                .ok_or_else(|| StoreError::not_found("account", charge.account_id))?;
            let balance = projected
                .entry(charge.account_id)
                .or_insert(account.balance);
            if *balance + charge.delta < 0 {
                return Err(StoreError::InsufficientBalance {
                    account_id: charge.account_id,
                    balance: account.balance,
                });
            }
            *balance += charge.delta;
        }

        // Phase 2: commit.
        let now = Utc::now();
        for (account_id, balance) in projected {
            if let Some(account) = state.accounts.get_mut(&account_id) {
                account.balance = balance;
                account.updated_at = now;
            }
        }
        match change {
            ExpenseChange::Insert(expense) | ExpenseChange::Update(expense) => {
                state.expenses.insert(expense.id, expense);
            }
            ExpenseChange::Remove(id) => {
                state.expenses.remove(&id);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::NewAccount;
    use crate::expense::NewExpense;
    use chrono::NaiveDate;

    fn account(name: &str, number: &str, balance: i64) -> Account {
        Account::new(NewAccount {
            name: name.to_string(),
            number: number.to_string(),
            balance,
        })
    }

    fn expense(account_id: AccountId, amount: i64) -> Expense {
        Expense::new(NewExpense {
            amount,
            date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            description: "test".to_string(),
            account_id,
        })
    }

    #[tokio::test]
    async fn test_duplicate_name_rejected() {
        let store = MemoryStore::new();
        store
            .insert_account(&account("Checking", "111", 1000))
            .await
            .unwrap();

        let err = store
            .insert_account(&account("Checking", "222", 1000))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { field: "name", .. }));
    }

    #[tokio::test]
    async fn test_rejected_charge_leaves_state_untouched() {
        let store = MemoryStore::new();
        let acct = account("Checking", "111", 100);
        store.insert_account(&acct).await.unwrap();

        let exp = expense(acct.id, 500);
        let err = store
            .apply_expense_change(
                ExpenseChange::Insert(exp.clone()),
                &[BalanceCharge::deduct(acct.id, 500)],
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            StoreError::InsufficientBalance { balance: 100, .. }
        ));
        assert!(store.expense(exp.id).await.unwrap().is_none());
        assert_eq!(store.account(acct.id).await.unwrap().unwrap().balance, 100);
    }

    #[tokio::test]
    async fn test_cascade_removes_expenses_without_restoration() {
        let store = MemoryStore::new();
        let alpha = account("Alpha", "111", 1000);
        let beta = account("Beta", "222", 1000);
        store.insert_account(&alpha).await.unwrap();
        store.insert_account(&beta).await.unwrap();

        let exp = expense(alpha.id, 400);
        store
            .apply_expense_change(
                ExpenseChange::Insert(exp.clone()),
                &[BalanceCharge::deduct(alpha.id, 400)],
            )
            .await
            .unwrap();

        assert!(store.delete_account(alpha.id).await.unwrap());
        assert!(store.expense(exp.id).await.unwrap().is_none());
        // The surviving account is untouched by the cascade.
        assert_eq!(store.account(beta.id).await.unwrap().unwrap().balance, 1000);
    }
}
