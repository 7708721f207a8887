use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use log::{debug, info, warn};
use rayon::prelude::*;
use rust_decimal::Decimal;
use std::collections::HashMap;

use super::accumulator::CumulativeAccumulator;
use super::reimbursement_model::{
    AppliedReimbursement, ElectedRule, ResolutionResult, ResolutionSummary,
};
use crate::constants::CURRENCY_DECIMAL_PRECISION;
use crate::errors::{Error, ResolutionError, Result, RuleError, ValidationError};
use crate::rules::RuleSet;
use crate::transactions::{GroupingKey, GroupingStrategy, Transaction};
use crate::utils::time_utils::DEFAULT_CIVIL_TZ;

/// Knobs of a resolution run.
#[derive(Debug, Clone, Copy)]
pub struct ResolutionOptions {
    /// Overrides the grouping strategy carried by the rule set.
    pub grouping: Option<GroupingStrategy>,
    /// Reject transactions that are older than a previous one of the same
    /// grouping key instead of only logging them.
    pub enforce_ordering: bool,
    /// Timezone deciding the civil year of a transaction.
    pub timezone: Tz,
}

impl Default for ResolutionOptions {
    fn default() -> Self {
        Self {
            grouping: None,
            enforce_ordering: true,
            timezone: DEFAULT_CIVIL_TZ,
        }
    }
}

/// Per-run state: one accumulator and the last timestamp seen per key.
#[derive(Debug, Default)]
struct RunState {
    accumulator: CumulativeAccumulator,
    last_seen: HashMap<GroupingKey, DateTime<Utc>>,
}

/// Error of a run together with the position of the failing transaction in
/// the run's input.
#[derive(Debug)]
struct RunFailure {
    position: usize,
    error: Error,
}

/// Resolves one reimbursement rule per transaction.
///
/// Each run is a single sequential fold over the input with its own
/// accumulator. The rule set is shared read-only, so one engine can serve
/// several runs at once.
#[derive(Debug, Clone)]
pub struct ReimbursementEngine {
    rule_set: RuleSet,
    options: ResolutionOptions,
}

impl ReimbursementEngine {
    pub fn new(rule_set: RuleSet) -> Self {
        Self::with_options(rule_set, ResolutionOptions::default())
    }

    pub fn with_options(rule_set: RuleSet, options: ResolutionOptions) -> Self {
        Self { rule_set, options }
    }

    pub fn rule_set(&self) -> &RuleSet {
        &self.rule_set
    }

    pub fn grouping(&self) -> GroupingStrategy {
        self.options.grouping.unwrap_or(self.rule_set.grouping())
    }

    /// Resolves every transaction in input order.
    ///
    /// Transactions must already be sorted by creation date within each
    /// grouping key; the engine never reorders them. The first transaction
    /// with no relevant rule aborts the run.
    pub fn resolve_all(&self, transactions: &[Transaction]) -> Result<Vec<ResolutionResult>> {
        let results = self
            .run(transactions.iter())
            .map_err(|failure| failure.error)?;
        self.log_summary(&results);
        Ok(results)
    }

    /// Same results as [`resolve_all`](Self::resolve_all), computed on the
    /// rayon pool with one partition per venue or offerer.
    ///
    /// Each partition owns a private accumulator. Results come back in input
    /// order. When several partitions fail, the failing transaction with the
    /// smallest input index wins, which is the one `resolve_all` stops at.
    pub fn resolve_partitioned(
        &self,
        transactions: &[Transaction],
    ) -> Result<Vec<ResolutionResult>> {
        let grouping = self.grouping();

        let mut partition_index: HashMap<Option<&str>, usize> = HashMap::new();
        let mut partitions: Vec<Vec<usize>> = Vec::new();
        for (idx, transaction) in transactions.iter().enumerate() {
            let slot = *partition_index
                .entry(transaction.partition_scope(grouping))
                .or_insert_with(|| {
                    partitions.push(Vec::new());
                    partitions.len() - 1
                });
            partitions[slot].push(idx);
        }

        debug!(
            "Resolving {} transactions across {} partitions",
            transactions.len(),
            partitions.len()
        );

        let outcomes: Vec<std::result::Result<Vec<ResolutionResult>, RunFailure>> = partitions
            .par_iter()
            .map(|indices| self.run(indices.iter().map(|&idx| &transactions[idx])))
            .collect();

        let mut slots: Vec<Option<ResolutionResult>> = vec![None; transactions.len()];
        let mut first_failure: Option<(usize, Error)> = None;
        for (indices, outcome) in partitions.iter().zip(outcomes) {
            match outcome {
                Ok(partition_results) => {
                    for (&idx, result) in indices.iter().zip(partition_results) {
                        slots[idx] = Some(result);
                    }
                }
                Err(RunFailure { position, error }) => {
                    let idx = indices[position];
                    if first_failure
                        .as_ref()
                        .map_or(true, |(earliest, _)| idx < *earliest)
                    {
                        first_failure = Some((idx, error));
                    }
                }
            }
        }
        if let Some((_, error)) = first_failure {
            return Err(error);
        }

        let results: Vec<ResolutionResult> = slots.into_iter().flatten().collect();
        self.log_summary(&results);
        Ok(results)
    }

    fn run<'a, I>(&self, transactions: I) -> std::result::Result<Vec<ResolutionResult>, RunFailure>
    where
        I: IntoIterator<Item = &'a Transaction>,
    {
        let mut state = RunState::default();
        let mut results = Vec::new();

        for (position, transaction) in transactions.into_iter().enumerate() {
            let result = self
                .resolve_one(transaction, &mut state)
                .map_err(|error| RunFailure { position, error })?;
            results.push(result);
        }

        Ok(results)
    }

    fn resolve_one(
        &self,
        transaction: &Transaction,
        state: &mut RunState,
    ) -> Result<ResolutionResult> {
        if transaction.value < Decimal::ZERO {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Transaction {} has a negative value {}",
                transaction.id, transaction.value
            ))));
        }

        let key = transaction.grouping_key(self.grouping(), self.options.timezone);
        self.check_ordering(transaction, &key, &mut state.last_seen)?;

        let cumulative_value = if transaction.counts_toward_cumulative() {
            state
                .accumulator
                .add(&key, transaction.value)
                .ok_or_else(|| {
                    ValidationError::InvalidInput(format!(
                        "Transaction {} overflows the cumulative value of {}",
                        transaction.id, key
                    ))
                })?
        } else {
            state.accumulator.get(&key)
        };

        let candidates = self.find_potential_rules(transaction, cumulative_value);
        let elected = determine_elected_rule(transaction, candidates)?;

        debug!(
            "Transaction {} ({}): elected {} at rate {} for {} (cumulative {})",
            transaction.id,
            key,
            elected.rule.id(),
            elected.rule.rate(),
            elected.amount,
            cumulative_value
        );

        Ok(ResolutionResult {
            transaction: transaction.clone(),
            grouping_key: key,
            cumulative_value,
            rule: ElectedRule::from(elected.rule.as_ref()),
            reimbursed_amount: elected.amount,
        })
    }

    /// Rules of the set that are both active at the transaction date and
    /// relevant for the cumulative value, in rule set order.
    pub fn find_potential_rules(
        &self,
        transaction: &Transaction,
        cumulative_value: Decimal,
    ) -> Vec<AppliedReimbursement> {
        self.rule_set
            .rules()
            .iter()
            .filter(|rule| {
                rule.is_active(transaction) && rule.is_relevant(transaction, cumulative_value)
            })
            .map(|rule| AppliedReimbursement::new(rule.clone(), transaction))
            .collect()
    }

    fn check_ordering(
        &self,
        transaction: &Transaction,
        key: &GroupingKey,
        last_seen: &mut HashMap<GroupingKey, DateTime<Utc>>,
    ) -> Result<()> {
        if let Some(&previous) = last_seen.get(key) {
            if transaction.created_at < previous {
                let err = ResolutionError::OutOfOrder {
                    transaction_id: transaction.id.clone(),
                    key: key.to_string(),
                    previous,
                    current: transaction.created_at,
                };
                if self.options.enforce_ordering {
                    return Err(err.into());
                }
                warn!("{}", err);
                return Ok(());
            }
        }
        last_seen.insert(key.clone(), transaction.created_at);
        Ok(())
    }

    fn log_summary(&self, results: &[ResolutionResult]) {
        let summary = ResolutionSummary::from_results(results);
        info!(
            "Resolved {} transactions with the {} rule set: booked {}, reimbursed {}",
            summary.transaction_count,
            self.rule_set.policy(),
            summary.booked_value,
            summary
                .reimbursed_amount
                .round_dp(CURRENCY_DECIMAL_PRECISION)
        );
    }
}

/// Picks the winning rule among the relevant ones.
///
/// An overriding rule wins outright. Otherwise the smallest amount wins and
/// ties go to the earliest rule in set order.
pub fn determine_elected_rule(
    transaction: &Transaction,
    mut candidates: Vec<AppliedReimbursement>,
) -> Result<AppliedReimbursement> {
    if let Some(pos) = candidates
        .iter()
        .position(|candidate| candidate.rule.overrides_other_rules())
    {
        return Ok(candidates.swap_remove(pos));
    }

    candidates
        .into_iter()
        .reduce(|best, candidate| {
            if candidate.amount < best.amount {
                candidate
            } else {
                best
            }
        })
        .ok_or_else(|| {
            RuleError::NoRelevantRule {
                transaction_id: transaction.id.clone(),
            }
            .into()
        })
}

/// Resolves `transactions` against `rule_set` with default options.
pub fn find_all_booking_reimbursements(
    transactions: &[Transaction],
    rule_set: &RuleSet,
) -> Result<Vec<ResolutionResult>> {
    ReimbursementEngine::new(rule_set.clone()).resolve_all(transactions)
}
