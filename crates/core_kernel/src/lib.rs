//! Core Kernel - Foundational types for the expense ledger
//!
//! This crate provides the building blocks shared by the domain and
//! infrastructure crates:
//! - Strongly-typed entity identifiers
//! - The field-keyed validation error container returned to callers

pub mod identifiers;
pub mod validation;

pub use identifiers::{AccountId, ExpenseId};
pub use validation::ValidationErrors;
