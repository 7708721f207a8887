//! Reimbursement Core - rule-based reimbursement of bookings to venues.
//!
//! This crate computes how much of each booking is reimbursed to the venue
//! that sold it, from an ordered set of rate rules and the cumulative value
//! booked per venue (or offerer) and civil year. It also carries the deposit
//! policy consulted before a beneficiary may book. It is storage-agnostic:
//! callers load and sort transactions themselves.

pub mod constants;
pub mod deposits;
pub mod errors;
pub mod reimbursement;
pub mod rules;
pub mod transactions;
pub mod utils;

pub use reimbursement::{ReimbursementEngine, ResolutionOptions, ResolutionResult};
pub use rules::{RulePolicy, RuleSet};
pub use transactions::Transaction;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
