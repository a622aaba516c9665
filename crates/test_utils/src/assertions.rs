//! Assertion helpers for the ledger error taxonomy

use core_kernel::ValidationErrors;
use domain_ledger::LedgerError;

/// Unwraps a validation failure, panicking with context otherwise
pub fn expect_validation<T: std::fmt::Debug>(
    result: Result<T, LedgerError>,
) -> ValidationErrors {
    match result {
        Err(LedgerError::Validation(errors)) => errors,
        other => panic!("expected validation failure, got {other:?}"),
    }
}

/// Asserts that a result failed validation on exactly the given field
/// with the given message
pub fn assert_field_error<T: std::fmt::Debug>(
    result: Result<T, LedgerError>,
    field: &str,
    message: &str,
) {
    let errors = expect_validation(result);
    assert_eq!(
        errors.messages(field),
        [message],
        "unexpected messages for field `{field}`: {errors:?}"
    );
}

/// Asserts that a result is a not-found failure for the given entity
pub fn assert_not_found<T: std::fmt::Debug>(result: Result<T, LedgerError>, entity: &str) {
    match result {
        Err(LedgerError::NotFound { entity: found, .. }) => {
            assert_eq!(found, entity, "not-found for the wrong entity")
        }
        other => panic!("expected {entity} not-found, got {other:?}"),
    }
}
