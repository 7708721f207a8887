use rust_decimal::Decimal;
use std::fmt::Debug;

use super::rules_model::{RuleGroup, RuleId, ValidityWindow};
use crate::transactions::Transaction;

/// A named, time-scoped, predicate-gated reimbursement rate.
///
/// Implementations must be pure: relevance depends only on the transaction and
/// the cumulative value handed in by the engine. Rule sets share rules across
/// threads, hence the `Send + Sync` bound.
pub trait ReimbursementRule: Debug + Send + Sync {
    fn id(&self) -> &RuleId;

    fn description(&self) -> &str;

    fn rate(&self) -> Decimal;

    fn validity(&self) -> &ValidityWindow;

    fn group(&self) -> RuleGroup;

    /// Whether the rule applies to this transaction given the cumulative value
    /// of its grouping key, the transaction's own value included.
    fn is_relevant(&self, transaction: &Transaction, cumulative_value: Decimal) -> bool;

    /// A relevant overriding rule is elected whatever the amounts of the other
    /// relevant rules.
    fn overrides_other_rules(&self) -> bool {
        false
    }

    fn is_active(&self, transaction: &Transaction) -> bool {
        self.validity().contains(transaction.created_at)
    }

    /// Reimbursed amount at full precision. Rounding belongs to the caller.
    fn apply(&self, transaction: &Transaction) -> Decimal {
        transaction.value * self.rate()
    }
}
