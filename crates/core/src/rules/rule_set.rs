//! Rule sets: ordered, versioned collections of rules.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use super::builtin_rules::{
    CategoryReimbursement, CategoryThresholdReimbursement, ThresholdReimbursement,
};
use super::rules_model::{OfferScope, RuleGroup, RuleId, ValidityWindow};
use super::rules_traits::ReimbursementRule;
use crate::errors::{Error, Result, ValidationError};
use crate::transactions::{GroupingStrategy, OfferCategory};

/// Policy version a rule set implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RulePolicy {
    /// Digital/physical split with a 20 000 cap per offerer.
    Current,
    /// Digital/physical split with per-venue degressive bands and a book rate.
    New,
    /// Loaded from rule definitions.
    Custom,
}

impl RulePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            RulePolicy::Current => "current",
            RulePolicy::New => "new",
            RulePolicy::Custom => "custom",
        }
    }
}

impl fmt::Display for RulePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RulePolicy {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "current" => Ok(RulePolicy::Current),
            "new" => Ok(RulePolicy::New),
            other => Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Unknown rule policy '{}', expected 'current' or 'new'",
                other
            )))),
        }
    }
}

/// An ordered list of rules forming one policy version.
///
/// Order matters: when several relevant rules compute the same amount, the
/// first one wins. Cloning is cheap and the set is read-only, so one set can
/// serve concurrent runs.
#[derive(Debug, Clone)]
pub struct RuleSet {
    policy: RulePolicy,
    grouping: GroupingStrategy,
    rules: Vec<Arc<dyn ReimbursementRule>>,
}

impl RuleSet {
    pub fn new(
        policy: RulePolicy,
        grouping: GroupingStrategy,
        rules: Vec<Arc<dyn ReimbursementRule>>,
    ) -> Self {
        Self {
            policy,
            grouping,
            rules,
        }
    }

    /// Built-in rule set for a policy version. `Custom` yields an empty set.
    pub fn for_policy(policy: RulePolicy) -> Self {
        match policy {
            RulePolicy::Current => Self::current(),
            RulePolicy::New => Self::new_policy(),
            RulePolicy::Custom => Self::new(policy, GroupingStrategy::default(), Vec::new()),
        }
    }

    pub fn current() -> Self {
        Self::new(
            RulePolicy::Current,
            GroupingStrategy::OffererYear,
            vec![
                Arc::new(CategoryReimbursement::digital_things()),
                Arc::new(CategoryReimbursement::physical_offers()),
                Arc::new(ThresholdReimbursement::max_reimbursement_by_offerer()),
            ],
        )
    }

    pub fn new_policy() -> Self {
        Self::new(
            RulePolicy::New,
            GroupingStrategy::VenueYear,
            vec![
                Arc::new(CategoryReimbursement::digital_things()),
                Arc::new(CategoryReimbursement::physical_offers()),
                Arc::new(ThresholdReimbursement::between_20000_and_40000()),
                Arc::new(ThresholdReimbursement::between_40000_and_100000()),
                Arc::new(ThresholdReimbursement::above_100000()),
                Arc::new(CategoryThresholdReimbursement::book_above_20000()),
            ],
        )
    }

    pub fn from_definitions(
        grouping: GroupingStrategy,
        definitions: Vec<RuleDefinition>,
    ) -> Result<Self> {
        let rules = definitions
            .into_iter()
            .map(RuleDefinition::build)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(RulePolicy::Custom, grouping, rules))
    }

    /// Parses a [`RuleSetDefinition`] document.
    pub fn from_json(json: &str) -> Result<Self> {
        let definition: RuleSetDefinition = serde_json::from_str(json)?;
        Self::from_definitions(definition.grouping, definition.rules)
    }

    pub fn policy(&self) -> RulePolicy {
        self.policy
    }

    pub fn grouping(&self) -> GroupingStrategy {
        self.grouping
    }

    pub fn rules(&self) -> &[Arc<dyn ReimbursementRule>] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn get(&self, id: &RuleId) -> Option<&Arc<dyn ReimbursementRule>> {
        self.rules.iter().find(|rule| rule.id() == id)
    }
}

/// Serialized rule set: a grouping strategy and ordered rule definitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleSetDefinition {
    #[serde(default)]
    pub grouping: GroupingStrategy,
    pub rules: Vec<RuleDefinition>,
}

/// Serialized form of a single rule, tagged by family.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleDefinition {
    #[serde(rename_all = "camelCase")]
    Category {
        id: RuleId,
        description: String,
        scope: OfferScope,
        rate: Decimal,
        #[serde(default)]
        group: Option<RuleGroup>,
        #[serde(default)]
        valid_from: Option<DateTime<Utc>>,
        #[serde(default)]
        valid_until: Option<DateTime<Utc>>,
    },
    #[serde(rename_all = "camelCase")]
    Threshold {
        id: RuleId,
        description: String,
        above: Decimal,
        #[serde(default)]
        up_to: Option<Decimal>,
        rate: Decimal,
        #[serde(default)]
        group: Option<RuleGroup>,
        #[serde(default)]
        valid_from: Option<DateTime<Utc>>,
        #[serde(default)]
        valid_until: Option<DateTime<Utc>>,
    },
    #[serde(rename_all = "camelCase")]
    CategoryThreshold {
        id: RuleId,
        description: String,
        category: OfferCategory,
        above: Decimal,
        rate: Decimal,
        #[serde(default)]
        group: Option<RuleGroup>,
        #[serde(default)]
        valid_from: Option<DateTime<Utc>>,
        #[serde(default)]
        valid_until: Option<DateTime<Utc>>,
    },
}

impl RuleDefinition {
    /// Validates the definition and turns it into a shareable rule.
    pub fn build(self) -> Result<Arc<dyn ReimbursementRule>> {
        let rule: Arc<dyn ReimbursementRule> = match self {
            RuleDefinition::Category {
                id,
                description,
                scope,
                rate,
                group,
                valid_from,
                valid_until,
            } => {
                let validity = ValidityWindow::new(id.as_str(), valid_from, valid_until)?;
                Arc::new(CategoryReimbursement::new(
                    id,
                    description,
                    scope,
                    rate,
                    group.unwrap_or(RuleGroup::Custom),
                    validity,
                )?)
            }
            RuleDefinition::Threshold {
                id,
                description,
                above,
                up_to,
                rate,
                group,
                valid_from,
                valid_until,
            } => {
                let validity = ValidityWindow::new(id.as_str(), valid_from, valid_until)?;
                Arc::new(ThresholdReimbursement::new(
                    id,
                    description,
                    above,
                    up_to,
                    rate,
                    group.unwrap_or(RuleGroup::Custom),
                    validity,
                )?)
            }
            RuleDefinition::CategoryThreshold {
                id,
                description,
                category,
                above,
                rate,
                group,
                valid_from,
                valid_until,
            } => {
                let validity = ValidityWindow::new(id.as_str(), valid_from, valid_until)?;
                Arc::new(CategoryThresholdReimbursement::new(
                    id,
                    description,
                    category,
                    above,
                    rate,
                    group.unwrap_or(RuleGroup::Custom),
                    validity,
                )?)
            }
        };
        Ok(rule)
    }
}
