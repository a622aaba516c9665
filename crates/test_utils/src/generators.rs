//! Property-Based Test Generators
//!
//! Proptest strategies for ledger inputs. Ranges mirror the reference
//! fixtures: amounts from 1 to 999 always fit a standard 1000 balance,
//! 1001 to 9999 never do.

use chrono::NaiveDate;
use proptest::prelude::*;

use crate::fixtures::STANDARD_BALANCE;

/// Strategy for amounts that fit a standard-balance account
pub fn affordable_amount_strategy() -> impl Strategy<Value = i64> {
    1i64..STANDARD_BALANCE
}

/// Strategy for amounts that exceed a standard-balance account
pub fn excessive_amount_strategy() -> impl Strategy<Value = i64> {
    (STANDARD_BALANCE + 1)..10_000i64
}

/// Strategy for any valid expense amount
pub fn amount_strategy() -> impl Strategy<Value = i64> {
    1i64..1_000_000i64
}

/// Strategy for valid starting balances
pub fn balance_strategy() -> impl Strategy<Value = i64> {
    1i64..1_000_000i64
}

/// Strategy for expense dates within a plausible window
pub fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    (2020i32..2026, 1u32..=12, 1u32..=28).prop_map(|(year, month, day)| {
        NaiveDate::from_ymd_opt(year, month, day).expect("day <= 28 is always valid")
    })
}

/// Strategy for non-blank descriptions
pub fn description_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z ]{0,30}".prop_map(|s| s.trim().to_string()).prop_filter(
        "description must be non-blank",
        |s| !s.is_empty(),
    )
}
