//! Deposit domain models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::deposits_constants::*;
use crate::constants::CURRENCY_DECIMAL_PRECISION;
use crate::errors::{Error, FundError, Result, ValidationError};

/// Policy epoch a deposit was granted under.
///
/// Stamped once when the deposit is created; a deposit never changes version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum DepositVersion {
    V1,
    V2,
}

impl DepositVersion {
    pub fn as_u8(&self) -> u8 {
        match self {
            DepositVersion::V1 => 1,
            DepositVersion::V2 => 2,
        }
    }
}

impl TryFrom<u8> for DepositVersion {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            1 => Ok(DepositVersion::V1),
            2 => Ok(DepositVersion::V2),
            other => Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Unknown deposit version {}",
                other
            )))),
        }
    }
}

impl From<DepositVersion> for u8 {
    fn from(version: DepositVersion) -> Self {
        version.as_u8()
    }
}

impl fmt::Display for DepositVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

/// A beneficiary's spendable credit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deposit {
    pub id: String,
    pub beneficiary_id: String,
    /// Nominal amount.
    pub amount: Decimal,
    /// A non-final deposit only exposes part of its amount.
    #[serde(default = "default_is_final")]
    pub is_final: bool,
    pub version: DepositVersion,
    #[serde(default)]
    pub expiration_date: Option<DateTime<Utc>>,
}

fn default_is_final() -> bool {
    true
}

impl Deposit {
    /// Spendable amount: the nominal amount once final, otherwise the
    /// temporary share rounded to cents.
    pub fn get_amount(&self) -> Decimal {
        if self.is_final {
            self.amount
        } else {
            (self.amount * TEMPORARY_FUND_AVAILABLE_RATIO).round_dp(CURRENCY_DECIMAL_PRECISION)
        }
    }

    /// Checks the total spent after a booking against the deposit.
    ///
    /// The nominal amount is checked first, then the temporary allowance of a
    /// non-final deposit.
    pub fn check_has_enough_fund(&self, total_amount_after_booking: Decimal) -> Result<()> {
        if total_amount_after_booking > self.amount {
            return Err(FundError::InsufficientFund {
                requested: total_amount_after_booking,
                available: self.amount,
            }
            .into());
        }

        if !self.is_final && total_amount_after_booking > self.get_amount() {
            return Err(FundError::InsufficientTemporaryFund {
                requested: total_amount_after_booking,
                available: self.get_amount(),
            }
            .into());
        }

        Ok(())
    }

    pub fn is_expired(&self, at: DateTime<Utc>) -> bool {
        self.expiration_date.is_some_and(|expiration| expiration <= at)
    }

    pub fn specific_caps(&self) -> SpecificCaps {
        SpecificCaps::for_version(self.version)
    }
}

/// Offer flags consulted by the spending caps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CappedOffer {
    pub is_digital: bool,
    /// The offer's subcategory counts against the digital cap.
    #[serde(default)]
    pub is_digital_deposit: bool,
    /// The offer's subcategory counts against the physical cap.
    #[serde(default)]
    pub is_physical_deposit: bool,
}

impl CappedOffer {
    pub fn digital_cap_applies(&self) -> bool {
        self.is_digital && self.is_digital_deposit
    }

    pub fn physical_cap_applies(&self) -> bool {
        !self.is_digital && self.is_physical_deposit
    }
}

/// Digital and physical caps of a deposit generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecificCaps {
    pub digital_cap: Option<Decimal>,
    pub physical_cap: Option<Decimal>,
}

impl SpecificCaps {
    pub fn new(digital_cap: Option<Decimal>, physical_cap: Option<Decimal>) -> Self {
        Self {
            digital_cap,
            physical_cap,
        }
    }

    pub fn for_version(version: DepositVersion) -> Self {
        match version {
            DepositVersion::V1 => {
                Self::new(Some(GRANT_18_DIGITAL_CAP_V1), Some(GRANT_18_PHYSICAL_CAP_V1))
            }
            DepositVersion::V2 => {
                Self::new(Some(GRANT_18_DIGITAL_CAP_V2), GRANT_18_PHYSICAL_CAP_V2)
            }
        }
    }

    /// A zero cap counts as no cap.
    pub fn digital_cap_applies(&self, offer: &CappedOffer) -> bool {
        offer.digital_cap_applies() && self.digital_cap.is_some_and(|cap| !cap.is_zero())
    }

    pub fn physical_cap_applies(&self, offer: &CappedOffer) -> bool {
        offer.physical_cap_applies() && self.physical_cap.is_some_and(|cap| !cap.is_zero())
    }
}

/// What a beneficiary already spent on the deposit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeneficiarySpending {
    pub total: Decimal,
    #[serde(default)]
    pub digital: Decimal,
    #[serde(default)]
    pub physical: Decimal,
}

/// Top-up granted on a birthday to an underage beneficiary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecreditType {
    Recredit16,
    Recredit17,
}

impl RecreditType {
    pub fn for_age(age: u8) -> Option<Self> {
        match age {
            16 => Some(RecreditType::Recredit16),
            17 => Some(RecreditType::Recredit17),
            _ => None,
        }
    }

    pub fn amount(&self) -> Decimal {
        match self {
            RecreditType::Recredit16 => GRANTED_DEPOSIT_AMOUNT_16,
            RecreditType::Recredit17 => GRANTED_DEPOSIT_AMOUNT_17,
        }
    }
}
