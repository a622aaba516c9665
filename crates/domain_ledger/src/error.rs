//! Ledger domain errors
//!
//! Three caller-visible kinds, kept distinct so the request layer can
//! map them without inspecting messages:
//!
//! - [`LedgerError::Validation`]: field-keyed, nothing persisted
//! - [`LedgerError::NotFound`]: referenced id does not exist
//! - [`LedgerError::Transient`]: the atomic commit could not complete;
//!   safe to retry, the core never retries on its own
//!
//! Adapter bugs and unclassified store failures surface as
//! [`LedgerError::Store`]; they are neither retryable nor recoverable
//! locally.

use thiserror::Error;

use core_kernel::ValidationErrors;

use crate::ports::StoreError;

/// Errors returned by the [`crate::Ledger`] service
#[derive(Debug, Error)]
pub enum LedgerError {
    /// One or more fields failed validation; nothing was persisted
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    /// Referenced entity does not exist
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The underlying atomic commit could not complete; retryable
    #[error("transient store failure: {0}")]
    Transient(#[source] StoreError),

    /// Non-retryable store failure
    #[error("store failure: {0}")]
    Store(#[source] StoreError),
}

impl LedgerError {
    /// Creates a NotFound error for an entity/id pair
    pub fn not_found(entity: &'static str, id: impl std::fmt::Display) -> Self {
        LedgerError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Returns the field-keyed failures, if this is a validation error
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            LedgerError::Validation(errors) => Some(errors),
            _ => None,
        }
    }

    /// Returns true if the caller may retry the whole operation
    pub fn is_transient(&self) -> bool {
        matches!(self, LedgerError::Transient(_))
    }

    /// Returns true if this is a missing-id failure
    pub fn is_not_found(&self) -> bool {
        matches!(self, LedgerError::NotFound { .. })
    }
}

impl From<ValidationErrors> for LedgerError {
    fn from(errors: ValidationErrors) -> Self {
        LedgerError::Validation(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::AccountId;

    #[test]
    fn test_classification_helpers() {
        let validation = LedgerError::Validation(ValidationErrors::single(
            "account",
            "balance is insufficient: $300",
        ));
        assert!(validation.validation_errors().is_some());
        assert!(!validation.is_transient());

        let missing = LedgerError::not_found("expense", "EXP-123");
        assert!(missing.is_not_found());

        let transient = LedgerError::Transient(StoreError::Conflict("40001".into()));
        assert!(transient.is_transient());
        assert!(transient.validation_errors().is_none());
    }

    #[test]
    fn test_insufficient_balance_is_not_a_store_failure_kind() {
        // The engine converts InsufficientBalance into a field-keyed
        // validation error before callers ever see a StoreError.
        let err = StoreError::InsufficientBalance {
            account_id: AccountId::new_v7(),
            balance: 300,
        };
        assert!(!err.is_transient());
    }
}
