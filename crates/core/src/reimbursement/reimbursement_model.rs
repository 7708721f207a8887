//! Resolution result models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::constants::CURRENCY_DECIMAL_PRECISION;
use crate::rules::{ReimbursementRule, RuleGroup, RuleId};
use crate::transactions::{GroupingKey, Transaction};

/// A relevant rule together with the amount it would reimburse.
#[derive(Debug, Clone)]
pub struct AppliedReimbursement {
    pub rule: Arc<dyn ReimbursementRule>,
    pub amount: Decimal,
}

impl AppliedReimbursement {
    pub fn new(rule: Arc<dyn ReimbursementRule>, transaction: &Transaction) -> Self {
        let amount = rule.apply(transaction);
        Self { rule, amount }
    }
}

/// Snapshot of the rule elected for a transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElectedRule {
    pub id: RuleId,
    pub description: String,
    pub rate: Decimal,
    pub group: RuleGroup,
}

impl From<&dyn ReimbursementRule> for ElectedRule {
    fn from(rule: &dyn ReimbursementRule) -> Self {
        Self {
            id: rule.id().clone(),
            description: rule.description().to_string(),
            rate: rule.rate(),
            group: rule.group(),
        }
    }
}

/// Outcome of the resolution of one transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionResult {
    pub transaction: Transaction,
    pub grouping_key: GroupingKey,
    /// Cumulative value of the grouping key the rules were evaluated against.
    pub cumulative_value: Decimal,
    pub rule: ElectedRule,
    /// Full precision amount; see [`ResolutionResult::rounded_amount`].
    pub reimbursed_amount: Decimal,
}

impl ResolutionResult {
    pub fn transaction_id(&self) -> &str {
        &self.transaction.id
    }

    pub fn rounded_amount(&self) -> Decimal {
        self.reimbursed_amount
            .round_dp(CURRENCY_DECIMAL_PRECISION)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleTotals {
    pub count: usize,
    pub booked_value: Decimal,
    pub reimbursed_amount: Decimal,
}

/// Totals of a resolution run, overall and per elected rule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionSummary {
    pub transaction_count: usize,
    pub booked_value: Decimal,
    pub reimbursed_amount: Decimal,
    pub by_rule: BTreeMap<RuleId, RuleTotals>,
}

impl ResolutionSummary {
    pub fn from_results(results: &[ResolutionResult]) -> Self {
        // totals across venues are unbounded, so they saturate at Decimal::MAX
        let mut summary = ResolutionSummary::default();
        for result in results {
            summary.transaction_count += 1;
            summary.booked_value = summary.booked_value.saturating_add(result.transaction.value);
            summary.reimbursed_amount = summary
                .reimbursed_amount
                .saturating_add(result.reimbursed_amount);

            let totals = summary.by_rule.entry(result.rule.id.clone()).or_default();
            totals.count += 1;
            totals.booked_value = totals.booked_value.saturating_add(result.transaction.value);
            totals.reimbursed_amount = totals
                .reimbursed_amount
                .saturating_add(result.reimbursed_amount);
        }
        summary
    }
}
