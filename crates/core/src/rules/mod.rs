//! Rules module - reimbursement rules and versioned rule sets.

mod builtin_rules;
mod rule_set;
mod rules_model;
mod rules_traits;

#[cfg(test)]
mod rules_tests;

pub use builtin_rules::{
    CategoryReimbursement, CategoryThresholdReimbursement, ThresholdReimbursement,
};
pub use rule_set::{RuleDefinition, RulePolicy, RuleSet, RuleSetDefinition};
pub use rules_model::{OfferScope, RuleGroup, RuleId, ValidityWindow};
pub use rules_traits::ReimbursementRule;
