//! Database error types and SQLx error translation
//!
//! Infrastructure failures (pool creation, migrations) get their own
//! [`DatabaseError`]; failures inside store operations are translated
//! straight into the domain's `StoreError` taxonomy so the ledger can
//! classify them without knowing about SQLx.

use domain_ledger::StoreError;
use thiserror::Error;

/// Errors raised while setting up database infrastructure
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Failed to establish a database connection
    #[error("failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Migration run failed
    #[error("migration failed: {0}")]
    MigrationFailed(String),

    /// Configuration could not be loaded or was invalid
    #[error("invalid database configuration: {0}")]
    InvalidConfig(String),
}

/// Maps a unique-constraint name to the colliding logical field
///
/// Constraint names are fixed by the migrations, so an unknown name
/// means a schema drift; falling back to `name` keeps the error usable.
fn field_for_constraint(constraint: &str) -> &'static str {
    match constraint {
        "accounts_number_key" => "number",
        _ => "name",
    }
}

/// Translates a SQLx error into the domain store error taxonomy
///
/// PostgreSQL error codes:
/// <https://www.postgresql.org/docs/current/errcodes-appendix.html>
///
/// - `23505` unique violation -> `Duplicate` on the constraint's field
/// - `23503` foreign key violation -> account `NotFound` (the only FK
///   in the schema points from expenses to accounts)
/// - `40001` / `40P01` serialization failure / deadlock -> `Conflict`,
///   which the domain classifies as transient
pub fn store_error(error: sqlx::Error) -> StoreError {
    match error {
        sqlx::Error::PoolTimedOut => StoreError::Timeout("connection pool exhausted".into()),
        sqlx::Error::Io(e) => StoreError::Connection(e.to_string()),
        sqlx::Error::Tls(e) => StoreError::Connection(e.to_string()),
        sqlx::Error::Database(db_err) => {
            let code = db_err.code();
            match code.as_deref() {
                Some("23505") => StoreError::Duplicate {
                    field: db_err
                        .constraint()
                        .map(field_for_constraint)
                        .unwrap_or("name"),
                    value: db_err.message().to_string(),
                },
                Some("23503") => StoreError::NotFound {
                    entity: "account",
                    id: db_err.message().to_string(),
                },
                Some("40001") | Some("40P01") => {
                    StoreError::Conflict(db_err.message().to_string())
                }
                _ => StoreError::Internal(db_err.message().to_string()),
            }
        }
        other => StoreError::Internal(other.to_string()),
    }
}
