//! Concrete rule families: category rules, threshold bands and the
//! category-threshold override.

use rust_decimal::Decimal;

use super::rules_model::{validate_rate, OfferScope, RuleGroup, RuleId, ValidityWindow};
use super::rules_traits::ReimbursementRule;
use crate::constants::*;
use crate::errors::{Result, RuleError};
use crate::transactions::{OfferCategory, Transaction};

/// Fixed rate for every offer in a scope, whatever the cumulative value.
#[derive(Debug, Clone)]
pub struct CategoryReimbursement {
    id: RuleId,
    description: String,
    scope: OfferScope,
    rate: Decimal,
    group: RuleGroup,
    validity: ValidityWindow,
}

impl CategoryReimbursement {
    pub fn new(
        id: RuleId,
        description: impl Into<String>,
        scope: OfferScope,
        rate: Decimal,
        group: RuleGroup,
        validity: ValidityWindow,
    ) -> Result<Self> {
        let rate = validate_rate(id.as_str(), rate)?;
        Ok(Self {
            id,
            description: description.into(),
            scope,
            rate,
            group,
            validity,
        })
    }

    pub fn digital_things() -> Self {
        Self {
            id: RuleId::DigitalThings,
            description: "Pas de remboursement pour les offres digitales".to_string(),
            scope: OfferScope::DigitalNonExempt,
            rate: RATE_NONE,
            group: RuleGroup::NotReimbursed,
            validity: ValidityWindow::ALWAYS,
        }
    }

    pub fn physical_offers() -> Self {
        Self {
            id: RuleId::PhysicalOffers,
            description: "Remboursement total pour les offres physiques".to_string(),
            scope: OfferScope::PhysicalOrExempt,
            rate: RATE_FULL,
            group: RuleGroup::Standard,
            validity: ValidityWindow::ALWAYS,
        }
    }

    pub fn scope(&self) -> OfferScope {
        self.scope
    }
}

impl ReimbursementRule for CategoryReimbursement {
    fn id(&self) -> &RuleId {
        &self.id
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn rate(&self) -> Decimal {
        self.rate
    }

    fn validity(&self) -> &ValidityWindow {
        &self.validity
    }

    fn group(&self) -> RuleGroup {
        self.group
    }

    fn is_relevant(&self, transaction: &Transaction, _cumulative_value: Decimal) -> bool {
        self.scope.matches(transaction)
    }
}

/// Rate for physical offers once the cumulative value lies in `(above, up_to]`.
#[derive(Debug, Clone)]
pub struct ThresholdReimbursement {
    id: RuleId,
    description: String,
    above: Decimal,
    up_to: Option<Decimal>,
    rate: Decimal,
    group: RuleGroup,
    validity: ValidityWindow,
}

impl ThresholdReimbursement {
    pub fn new(
        id: RuleId,
        description: impl Into<String>,
        above: Decimal,
        up_to: Option<Decimal>,
        rate: Decimal,
        group: RuleGroup,
        validity: ValidityWindow,
    ) -> Result<Self> {
        let rate = validate_rate(id.as_str(), rate)?;
        if let Some(up_to) = up_to {
            if up_to <= above {
                return Err(RuleError::InvalidDefinition(format!(
                    "rule '{}' has an empty band ({}, {}]",
                    id, above, up_to
                ))
                .into());
            }
        }
        Ok(Self {
            id,
            description: description.into(),
            above,
            up_to,
            rate,
            group,
            validity,
        })
    }

    fn builtin(
        id: RuleId,
        description: &str,
        above: Decimal,
        up_to: Option<Decimal>,
        rate: Decimal,
        group: RuleGroup,
    ) -> Self {
        Self {
            id,
            description: description.to_string(),
            above,
            up_to,
            rate,
            group,
            validity: ValidityWindow::ALWAYS,
        }
    }

    /// Legacy organization-wide cap: nothing is reimbursed above 20 000.
    pub fn max_reimbursement_by_offerer() -> Self {
        Self::builtin(
            RuleId::MaxReimbursementByOfferer,
            "Pas de remboursement au dessus du plafond de 20 000 € par acteur culturel",
            FIRST_THRESHOLD,
            None,
            RATE_NONE,
            RuleGroup::NotReimbursed,
        )
    }

    pub fn between_20000_and_40000() -> Self {
        Self::builtin(
            RuleId::Between20000And40000,
            "Remboursement à 95% entre 20 000 € et 40 000 € par lieu",
            FIRST_THRESHOLD,
            Some(SECOND_THRESHOLD),
            RATE_BETWEEN_20000_AND_40000,
            RuleGroup::Standard,
        )
    }

    pub fn between_40000_and_100000() -> Self {
        Self::builtin(
            RuleId::Between40000And100000,
            "Remboursement à 85% entre 40 000 € et 100 000 € par lieu",
            SECOND_THRESHOLD,
            Some(THIRD_THRESHOLD),
            RATE_BETWEEN_40000_AND_100000,
            RuleGroup::Standard,
        )
    }

    pub fn above_100000() -> Self {
        Self::builtin(
            RuleId::Above100000,
            "Remboursement à 65% au dessus de 100 000 € par lieu",
            THIRD_THRESHOLD,
            None,
            RATE_ABOVE_100000,
            RuleGroup::Standard,
        )
    }

    pub fn band(&self) -> (Decimal, Option<Decimal>) {
        (self.above, self.up_to)
    }
}

impl ReimbursementRule for ThresholdReimbursement {
    fn id(&self) -> &RuleId {
        &self.id
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn rate(&self) -> Decimal {
        self.rate
    }

    fn validity(&self) -> &ValidityWindow {
        &self.validity
    }

    fn group(&self) -> RuleGroup {
        self.group
    }

    fn is_relevant(&self, transaction: &Transaction, cumulative_value: Decimal) -> bool {
        if transaction.is_digital {
            return false;
        }
        cumulative_value > self.above && self.up_to.map_or(true, |up_to| cumulative_value <= up_to)
    }
}

/// Rate for one offer category above a cumulative value. When relevant it
/// beats every other relevant rule, even cheaper ones.
#[derive(Debug, Clone)]
pub struct CategoryThresholdReimbursement {
    id: RuleId,
    description: String,
    category: OfferCategory,
    above: Decimal,
    rate: Decimal,
    group: RuleGroup,
    validity: ValidityWindow,
}

impl CategoryThresholdReimbursement {
    pub fn new(
        id: RuleId,
        description: impl Into<String>,
        category: OfferCategory,
        above: Decimal,
        rate: Decimal,
        group: RuleGroup,
        validity: ValidityWindow,
    ) -> Result<Self> {
        let rate = validate_rate(id.as_str(), rate)?;
        Ok(Self {
            id,
            description: description.into(),
            category,
            above,
            rate,
            group,
            validity,
        })
    }

    pub fn book_above_20000() -> Self {
        Self {
            id: RuleId::BookAbove20000,
            description: "Remboursement à 95% au dessus de 20 000 € pour les livres".to_string(),
            category: OfferCategory::Book,
            above: FIRST_THRESHOLD,
            rate: RATE_BOOK_ABOVE_20000,
            group: RuleGroup::Book,
            validity: ValidityWindow::ALWAYS,
        }
    }

    pub fn category(&self) -> OfferCategory {
        self.category
    }
}

impl ReimbursementRule for CategoryThresholdReimbursement {
    fn id(&self) -> &RuleId {
        &self.id
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn rate(&self) -> Decimal {
        self.rate
    }

    fn validity(&self) -> &ValidityWindow {
        &self.validity
    }

    fn group(&self) -> RuleGroup {
        self.group
    }

    fn is_relevant(&self, transaction: &Transaction, cumulative_value: Decimal) -> bool {
        transaction.category == self.category && cumulative_value > self.above
    }

    fn overrides_other_rules(&self) -> bool {
        true
    }
}
