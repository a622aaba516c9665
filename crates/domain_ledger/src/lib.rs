//! Expense Ledger Domain
//!
//! This crate implements the core of the expense tracker: accounts,
//! the expenses drawn against them, and the balance reconciliation
//! engine that keeps every account's stored balance in exact agreement
//! with its expenses.
//!
//! # Key Concepts
//!
//! - **Account**: holds a non-negative integer balance plus identity
//!   fields (`name`, `number`), both globally unique
//! - **Expense**: a positive integer amount charged against exactly one
//!   account at any time
//! - **Reconciliation**: every expense create/update/delete computes
//!   the balance deltas needed to preserve
//!   `balance == initial_balance - sum(expense amounts)` and applies
//!   them with the row change as one atomic unit
//!
//! # Architecture
//!
//! The [`Ledger`] service is the only writer of account balances. It
//! talks to persistence exclusively through the [`LedgerStore`] port;
//! adapters provide atomic multi-row commits (PostgreSQL in `infra_db`,
//! [`MemoryStore`] here for tests and embedding).

pub mod account;
pub mod error;
pub mod expense;
pub mod ledger;
pub mod memory;
pub mod ports;

pub use account::{Account, AccountPatch, NewAccount};
pub use error::LedgerError;
pub use expense::{Expense, ExpensePatch, NewExpense};
pub use ledger::Ledger;
pub use memory::MemoryStore;
pub use ports::{BalanceCharge, ExpenseChange, LedgerStore, StoreError};
