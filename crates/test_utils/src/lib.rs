//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! expense ledger test suite.
//!
//! # Modules
//!
//! - `fixtures`: canonical balances, dates, and field values
//! - `builders`: builder patterns for input field sets
//! - `assertions`: assertion helpers for the error taxonomy
//! - `generators`: property-based test data generators
//! - `logging`: tracing initialization for tests

pub mod assertions;
pub mod builders;
pub mod fixtures;
pub mod generators;
pub mod logging;

pub use assertions::*;
pub use builders::*;
pub use fixtures::*;
pub use generators::*;
pub use logging::*;
