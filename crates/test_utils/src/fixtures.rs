//! Canonical fixture values
//!
//! The numeric fixtures mirror the reference scenarios: accounts start
//! at 1000 and expenses stay inside (or deliberately outside) that
//! budget.

use chrono::NaiveDate;

/// Balance every fixture account starts with unless overridden
pub const STANDARD_BALANCE: i64 = 1000;

/// An expense amount that always fits a standard balance
pub const MODEST_AMOUNT: i64 = 400;

/// An expense amount that never fits a standard balance
pub const EXCESSIVE_AMOUNT: i64 = 1500;

/// Fixed date used when the date itself is irrelevant
pub fn fixture_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 15).expect("valid fixture date")
}

/// A date a few days after [`fixture_date`], for ordering assertions
pub fn later_fixture_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 20).expect("valid fixture date")
}
