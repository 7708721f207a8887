//! Reimbursement module - the rule resolution engine and its results.

mod accumulator;
mod reimbursement_model;
mod reimbursement_service;


pub use accumulator::CumulativeAccumulator;
pub use reimbursement_model::{
    AppliedReimbursement, ElectedRule, ResolutionResult, ResolutionSummary, RuleTotals,
};
pub use reimbursement_service::{
    determine_elected_rule, find_all_booking_reimbursements, ReimbursementEngine,
    ResolutionOptions,
};
