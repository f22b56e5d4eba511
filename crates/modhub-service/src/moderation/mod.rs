//! Violation accounting and ban enforcement.

pub mod ledger;

pub use ledger::{ViolationLedger, ViolationRecord};
