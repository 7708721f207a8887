//! Transaction domain models.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::{Error, ValidationError};
use crate::utils::time_utils::civil_year_from_utc;

/// Offer category as far as reimbursement is concerned.
///
/// Books and cinema cards are exempt from the digital/physical split: a digital
/// book is reimbursed like a physical offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OfferCategory {
    Book,
    CinemaCard,
    #[default]
    Standard,
}

impl OfferCategory {
    pub fn is_exempt(&self) -> bool {
        matches!(self, OfferCategory::Book | OfferCategory::CinemaCard)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OfferCategory::Book => "BOOK",
            OfferCategory::CinemaCard => "CINEMA_CARD",
            OfferCategory::Standard => "STANDARD",
        }
    }
}

impl FromStr for OfferCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BOOK" => Ok(OfferCategory::Book),
            "CINEMA_CARD" => Ok(OfferCategory::CinemaCard),
            "STANDARD" => Ok(OfferCategory::Standard),
            other => Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Unknown offer category '{}'",
                other
            )))),
        }
    }
}

/// One reimbursable booking.
///
/// The engine only ever borrows transactions, so value and category cannot
/// change while a run is in progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub value: Decimal,
    #[serde(default)]
    pub is_digital: bool,
    #[serde(default)]
    pub category: OfferCategory,
    pub venue_id: String,
    pub offerer_id: String,
}

impl Transaction {
    pub fn is_exempt_category(&self) -> bool {
        self.category.is_exempt()
    }

    pub fn is_book(&self) -> bool {
        self.category == OfferCategory::Book
    }

    /// Physical offers and exempt categories count toward cumulative totals.
    pub fn counts_toward_cumulative(&self) -> bool {
        !self.is_digital || self.is_exempt_category()
    }

    pub fn grouping_key(&self, strategy: GroupingStrategy, tz: Tz) -> GroupingKey {
        let year = civil_year_from_utc(self.created_at, tz);
        let scope = match strategy {
            GroupingStrategy::Year => None,
            GroupingStrategy::VenueYear => Some(self.venue_id.clone()),
            GroupingStrategy::OffererYear => Some(self.offerer_id.clone()),
        };
        GroupingKey { scope, year }
    }

    /// Identifier of the independent stream this transaction belongs to.
    /// Transactions with different partition scopes never share an accumulator.
    pub fn partition_scope(&self, strategy: GroupingStrategy) -> Option<&str> {
        match strategy {
            GroupingStrategy::Year => None,
            GroupingStrategy::VenueYear => Some(self.venue_id.as_str()),
            GroupingStrategy::OffererYear => Some(self.offerer_id.as_str()),
        }
    }
}

/// Dimension over which cumulative values are tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GroupingStrategy {
    /// Civil year only; the caller has already narrowed the batch to one payee.
    Year,
    #[default]
    VenueYear,
    OffererYear,
}

impl FromStr for GroupingStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "year" => Ok(GroupingStrategy::Year),
            "venue-year" | "venue" => Ok(GroupingStrategy::VenueYear),
            "offerer-year" | "offerer" => Ok(GroupingStrategy::OffererYear),
            other => Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Unknown grouping strategy '{}'",
                other
            )))),
        }
    }
}

/// Accumulator key: an optional venue/offerer scope and a civil year.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupingKey {
    pub scope: Option<String>,
    pub year: i32,
}

impl fmt::Display for GroupingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.scope {
            Some(scope) => write!(f, "{}/{}", scope, self.year),
            None => write!(f, "{}", self.year),
        }
    }
}
