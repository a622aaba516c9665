//! PostgreSQL infrastructure for the expense ledger
//!
//! This crate provides the database-backed implementation of the
//! domain's `LedgerStore` port, together with pool management, embedded
//! migrations, and environment-driven configuration.
//!
//! # Architecture
//!
//! The domain layer never sees SQLx types: [`PgStore`] translates rows
//! and errors at the boundary, and the reconciliation contract (atomic
//! row change plus balance charges, per-account row locks) is carried
//! by plain SQL transactions.
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_ledger::Ledger;
//! use infra_db::{DatabaseSettings, create_pool, run_migrations, PgStore};
//!
//! let settings = DatabaseSettings::from_env()?;
//! let pool = create_pool(settings.pool_config()).await?;
//! run_migrations(&pool).await?;
//! let ledger = Ledger::new(PgStore::new(pool));
//! ```

pub mod config;
pub mod error;
pub mod pool;
pub mod store;

pub use config::DatabaseSettings;
pub use error::DatabaseError;
pub use pool::{create_pool, create_pool_from_url, run_migrations, DatabaseConfig, DatabasePool, MIGRATOR};
pub use store::PgStore;
