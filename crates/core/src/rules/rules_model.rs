//! Reimbursement rule domain models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::{Result, RuleError};
use crate::transactions::Transaction;

/// Stable identifier of a rule, carried into resolution results and exports.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RuleId {
    DigitalThings,
    PhysicalOffers,
    MaxReimbursementByOfferer,
    Between20000And40000,
    Between40000And100000,
    Above100000,
    BookAbove20000,
    Custom(String),
}

impl RuleId {
    pub fn as_str(&self) -> &str {
        match self {
            RuleId::DigitalThings => "DIGITAL_THINGS",
            RuleId::PhysicalOffers => "PHYSICAL_OFFERS",
            RuleId::MaxReimbursementByOfferer => "MAX_REIMBURSEMENT",
            RuleId::Between20000And40000 => "BETWEEN_20000_AND_40000_EUROS",
            RuleId::Between40000And100000 => "BETWEEN_40000_AND_100000_EUROS",
            RuleId::Above100000 => "ABOVE_100000_EUROS",
            RuleId::BookAbove20000 => "BOOK_REIMBURSEMENT",
            RuleId::Custom(name) => name,
        }
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleId {
    type Err = RuleError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(RuleError::InvalidDefinition(
                "rule id must not be empty".to_string(),
            ));
        }
        Ok(match trimmed {
            "DIGITAL_THINGS" => RuleId::DigitalThings,
            "PHYSICAL_OFFERS" => RuleId::PhysicalOffers,
            "MAX_REIMBURSEMENT" => RuleId::MaxReimbursementByOfferer,
            "BETWEEN_20000_AND_40000_EUROS" => RuleId::Between20000And40000,
            "BETWEEN_40000_AND_100000_EUROS" => RuleId::Between40000And100000,
            "ABOVE_100000_EUROS" => RuleId::Above100000,
            "BOOK_REIMBURSEMENT" => RuleId::BookAbove20000,
            other => RuleId::Custom(other.to_string()),
        })
    }
}

impl Serialize for RuleId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RuleId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        RuleId::from_str(&raw).map_err(serde::de::Error::custom)
    }
}

/// Reporting group of a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleGroup {
    #[default]
    Standard,
    Book,
    NotReimbursed,
    Custom,
    Deprecated,
}

impl RuleGroup {
    pub fn label(&self) -> &'static str {
        match self {
            RuleGroup::Standard => "Barème général",
            RuleGroup::Book => "Barème livres",
            RuleGroup::NotReimbursed => "Barème non remboursé",
            RuleGroup::Custom => "Barème dérogatoire",
            RuleGroup::Deprecated => "Barème désuet",
        }
    }

    /// Display order in reports.
    pub fn position(&self) -> u8 {
        match self {
            RuleGroup::Standard => 1,
            RuleGroup::Book => 2,
            RuleGroup::NotReimbursed => 3,
            RuleGroup::Custom => 4,
            RuleGroup::Deprecated => 5,
        }
    }
}

/// Half-open validity window `[from, until)`; missing bounds are unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidityWindow {
    #[serde(default)]
    pub from: Option<DateTime<Utc>>,
    #[serde(default)]
    pub until: Option<DateTime<Utc>>,
}

impl ValidityWindow {
    pub const ALWAYS: ValidityWindow = ValidityWindow {
        from: None,
        until: None,
    };

    pub fn new(
        rule: &str,
        from: Option<DateTime<Utc>>,
        until: Option<DateTime<Utc>>,
    ) -> Result<Self> {
        if let (Some(from), Some(until)) = (from, until) {
            if until <= from {
                return Err(RuleError::InvalidWindow {
                    rule: rule.to_string(),
                }
                .into());
            }
        }
        Ok(Self { from, until })
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.from.map_or(true, |from| from <= instant)
            && self.until.map_or(true, |until| instant < until)
    }
}

/// Which offers a category rule applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OfferScope {
    /// Digital offers outside the exempt categories.
    DigitalNonExempt,
    /// Physical offers, plus exempt categories whatever their medium.
    PhysicalOrExempt,
}

impl OfferScope {
    pub fn matches(&self, transaction: &Transaction) -> bool {
        match self {
            OfferScope::DigitalNonExempt => {
                transaction.is_digital && !transaction.is_exempt_category()
            }
            OfferScope::PhysicalOrExempt => transaction.counts_toward_cumulative(),
        }
    }
}

/// Rates are multipliers on the booking value and must stay within [0, 1].
pub(crate) fn validate_rate(rule: &str, rate: Decimal) -> Result<Decimal> {
    if rate < Decimal::ZERO || rate > Decimal::ONE {
        return Err(RuleError::InvalidRate {
            rule: rule.to_string(),
            rate,
        }
        .into());
    }
    Ok(rate)
}
