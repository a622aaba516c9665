//! PostgreSQL ledger store adapter
//!
//! Implements the domain's `LedgerStore` port on PostgreSQL. The
//! reconciliation contract is met with plain SQL transactions: every
//! mutation that carries balance charges locks the charged account rows
//! with `SELECT ... FOR UPDATE`, checks the charges against the locked
//! balances, and only then writes. Locks are taken in sorted id order so
//! two concurrent mutations touching the same pair of accounts cannot
//! deadlock.
//!
//! Queries are built at runtime rather than through the compile-time
//! macros so the crate builds without a live database.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use tracing::{debug, instrument};
use uuid::Uuid;

use core_kernel::{AccountId, ExpenseId};
use domain_ledger::{
    Account, AccountPatch, BalanceCharge, Expense, ExpenseChange, LedgerStore, StoreError,
};

use crate::error::store_error;

/// PostgreSQL-backed implementation of the ledger store port
///
/// # Example
///
/// ```rust,ignore
/// use domain_ledger::Ledger;
/// use infra_db::{create_pool_from_url, run_migrations, PgStore};
///
/// let pool = create_pool_from_url("postgres://localhost/ledger").await?;
/// run_migrations(&pool).await?;
/// let ledger = Ledger::new(PgStore::new(pool));
/// ```
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Creates a store over an existing connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AccountRow {
    id: Uuid,
    name: String,
    number: String,
    balance: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<AccountRow> for Account {
    fn from(row: AccountRow) -> Self {
        Account {
            id: AccountId::from(row.id),
            name: row.name,
            number: row.number,
            balance: row.balance,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ExpenseRow {
    id: Uuid,
    amount: i64,
    date: NaiveDate,
    description: String,
    account_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ExpenseRow> for Expense {
    fn from(row: ExpenseRow) -> Self {
        Expense {
            id: ExpenseId::from(row.id),
            amount: row.amount,
            date: row.date,
            description: row.description,
            account_id: AccountId::from(row.account_id),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const SELECT_ACCOUNT: &str =
    "SELECT id, name, number, balance, created_at, updated_at FROM accounts";
const SELECT_EXPENSE: &str =
    "SELECT id, amount, date, description, account_id, created_at, updated_at FROM expenses";

#[async_trait]
impl LedgerStore for PgStore {
    #[instrument(skip(self, account), fields(account_id = %account.id))]
    async fn insert_account(&self, account: &Account) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO accounts (id, name, number, balance, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(Uuid::from(account.id))
        .bind(&account.name)
        .bind(&account.number)
        .bind(account.balance)
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(&self.pool)
        .await
        .map_err(store_error)?;
        Ok(())
    }

    async fn account(&self, id: AccountId) -> Result<Option<Account>, StoreError> {
        let row = sqlx::query_as::<_, AccountRow>(&format!("{SELECT_ACCOUNT} WHERE id = $1"))
            .bind(Uuid::from(id))
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error)?;
        Ok(row.map(Account::from))
    }

    async fn account_expenses(&self, id: AccountId) -> Result<Vec<Expense>, StoreError> {
        let rows = sqlx::query_as::<_, ExpenseRow>(&format!(
            "{SELECT_EXPENSE} WHERE account_id = $1 ORDER BY date DESC, created_at DESC"
        ))
        .bind(Uuid::from(id))
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;
        Ok(rows.into_iter().map(Expense::from).collect())
    }

    #[instrument(skip(self, patch), fields(account_id = %id))]
    async fn update_account(
        &self,
        id: AccountId,
        patch: &AccountPatch,
    ) -> Result<Option<Account>, StoreError> {
        let row = sqlx::query_as::<_, AccountRow>(
            "UPDATE accounts \
             SET name = COALESCE($2, name), number = COALESCE($3, number), updated_at = now() \
             WHERE id = $1 \
             RETURNING id, name, number, balance, created_at, updated_at",
        )
        .bind(Uuid::from(id))
        .bind(patch.name.as_deref())
        .bind(patch.number.as_deref())
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;
        Ok(row.map(Account::from))
    }

    #[instrument(skip(self), fields(account_id = %id))]
    async fn delete_account(&self, id: AccountId) -> Result<bool, StoreError> {
        // Owned expenses go with the row through the ON DELETE CASCADE
        // foreign key; no balance is restored anywhere.
        let result = sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(Uuid::from(id))
            .execute(&self.pool)
            .await
            .map_err(store_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn accounts(&self) -> Result<Vec<Account>, StoreError> {
        let rows = sqlx::query_as::<_, AccountRow>(&format!(
            "{SELECT_ACCOUNT} ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;
        Ok(rows.into_iter().map(Account::from).collect())
    }

    async fn expense(&self, id: ExpenseId) -> Result<Option<Expense>, StoreError> {
        let row = sqlx::query_as::<_, ExpenseRow>(&format!("{SELECT_EXPENSE} WHERE id = $1"))
            .bind(Uuid::from(id))
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error)?;
        Ok(row.map(Expense::from))
    }

    async fn expenses(&self) -> Result<Vec<Expense>, StoreError> {
        let rows = sqlx::query_as::<_, ExpenseRow>(&format!(
            "{SELECT_EXPENSE} ORDER BY date DESC, created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;
        Ok(rows.into_iter().map(Expense::from).collect())
    }

    #[instrument(skip(self, change, charges), fields(charges = charges.len()))]
    async fn apply_expense_change(
        &self,
        change: ExpenseChange,
        charges: &[BalanceCharge],
    ) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await.map_err(store_error)?;

        // Lock the charged rows in sorted id order so concurrent
        // mutations over the same account pair cannot deadlock.
        let mut ids: Vec<Uuid> = charges
            .iter()
            .map(|charge| Uuid::from(charge.account_id))
            .collect();
        ids.sort_unstable();
        ids.dedup();

        let mut persisted: BTreeMap<Uuid, i64> = BTreeMap::new();
        for id in &ids {
            let balance: Option<i64> =
                sqlx::query_scalar("SELECT balance FROM accounts WHERE id = $1 FOR UPDATE")
                    .bind(id)
                    .fetch_optional(&mut *tx)
                    .await
                    .map_err(store_error)?;
            let balance =
                balance.ok_or_else(|| StoreError::not_found("account", AccountId::from(*id)))?;
            persisted.insert(*id, balance);
        }

        // Charges compose: check them in order against a projection so
        // the first one that would go negative aborts with the account's
        // persisted balance, before anything is written.
        let mut projected = persisted.clone();
        for charge in charges {
            let id = Uuid::from(charge.account_id);
            let Some(balance) = projected.get_mut(&id) else {
                return Err(StoreError::Internal(format!(
                    "charge references unlocked account {id}"
                )));
            };
            if *balance + charge.delta < 0 {
                return Err(StoreError::InsufficientBalance {
                    account_id: charge.account_id,
                    balance: persisted.get(&id).copied().unwrap_or(0),
                });
            }
            *balance += charge.delta;
        }

        for (id, balance) in &projected {
            debug!(account = %id, balance, "writing reconciled balance");
            sqlx::query("UPDATE accounts SET balance = $2, updated_at = now() WHERE id = $1")
                .bind(id)
                .bind(balance)
                .execute(&mut *tx)
                .await
                .map_err(store_error)?;
        }

        match change {
            ExpenseChange::Insert(expense) => {
                sqlx::query(
                    "INSERT INTO expenses \
                     (id, amount, date, description, account_id, created_at, updated_at) \
                     VALUES ($1, $2, $3, $4, $5, $6, $7)",
                )
                .bind(Uuid::from(expense.id))
                .bind(expense.amount)
                .bind(expense.date)
                .bind(&expense.description)
                .bind(Uuid::from(expense.account_id))
                .bind(expense.created_at)
                .bind(expense.updated_at)
                .execute(&mut *tx)
                .await
                .map_err(store_error)?;
            }
            ExpenseChange::Update(expense) => {
                let result = sqlx::query(
                    "UPDATE expenses \
                     SET amount = $2, date = $3, description = $4, account_id = $5, \
                         updated_at = $6 \
                     WHERE id = $1",
                )
                .bind(Uuid::from(expense.id))
                .bind(expense.amount)
                .bind(expense.date)
                .bind(&expense.description)
                .bind(Uuid::from(expense.account_id))
                .bind(expense.updated_at)
                .execute(&mut *tx)
                .await
                .map_err(store_error)?;
                if result.rows_affected() == 0 {
                    return Err(StoreError::not_found("expense", expense.id));
                }
            }
            ExpenseChange::Remove(id) => {
                let result = sqlx::query("DELETE FROM expenses WHERE id = $1")
                    .bind(Uuid::from(id))
                    .execute(&mut *tx)
                    .await
                    .map_err(store_error)?;
                if result.rows_affected() == 0 {
                    return Err(StoreError::not_found("expense", id));
                }
            }
        }

        tx.commit().await.map_err(store_error)?;
        Ok(())
    }
}
