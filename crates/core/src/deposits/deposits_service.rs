use chrono::{DateTime, NaiveTime, Utc};
use log::debug;
use rust_decimal::Decimal;

use super::deposits_constants::*;
use super::deposits_model::{BeneficiarySpending, CappedOffer, Deposit, DepositVersion};
use crate::errors::{FundError, Result};
use crate::utils::time_utils::add_years;

/// Fails when `requested_total` exceeds what the deposit allows.
///
/// `InsufficientFund` when the nominal amount is exceeded,
/// `InsufficientTemporaryFund` when only the temporary allowance of a
/// non-final deposit is.
pub fn has_enough_fund(deposit: &Deposit, requested_total: Decimal) -> Result<()> {
    deposit.check_has_enough_fund(requested_total)
}

/// Booking-time check of a beneficiary's spending.
///
/// Runs the overall fund check on the total after booking, then the digital
/// or physical cap of the deposit generation when the offer is subject to it.
pub fn check_expenses_limits(
    deposit: &Deposit,
    spent: &BeneficiarySpending,
    offer: &CappedOffer,
    requested: Decimal,
) -> Result<()> {
    has_enough_fund(deposit, spent.total + requested)?;

    let caps = deposit.specific_caps();
    if caps.digital_cap_applies(offer) {
        if let Some(cap) = caps.digital_cap {
            let after = spent.digital + requested;
            if after > cap {
                debug!(
                    "Deposit {} digital cap {} exceeded ({} after booking)",
                    deposit.id, cap, after
                );
                return Err(FundError::DigitalCapExceeded {
                    requested: after,
                    cap,
                }
                .into());
            }
        }
    }

    if caps.physical_cap_applies(offer) {
        if let Some(cap) = caps.physical_cap {
            let after = spent.physical + requested;
            if after > cap {
                debug!(
                    "Deposit {} physical cap {} exceeded ({} after booking)",
                    deposit.id, cap, after
                );
                return Err(FundError::PhysicalCapExceeded {
                    requested: after,
                    cap,
                }
                .into());
            }
        }
    }

    Ok(())
}

/// Granted amounts by beneficiary age and deposit generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepositPolicy {
    pub current_version: DepositVersion,
}

impl Default for DepositPolicy {
    fn default() -> Self {
        Self {
            current_version: DepositVersion::V2,
        }
    }
}

impl DepositPolicy {
    pub fn new(current_version: DepositVersion) -> Self {
        Self { current_version }
    }

    /// Amount granted at `age` under `version`; `None` outside 15-18.
    pub fn granted_amount(age: u8, version: DepositVersion) -> Option<Decimal> {
        match age {
            15 => Some(GRANTED_DEPOSIT_AMOUNT_15),
            16 => Some(GRANTED_DEPOSIT_AMOUNT_16),
            17 => Some(GRANTED_DEPOSIT_AMOUNT_17),
            18 => Some(match version {
                DepositVersion::V1 => GRANTED_DEPOSIT_AMOUNT_18_V1,
                DepositVersion::V2 => GRANTED_DEPOSIT_AMOUNT_18_V2,
            }),
            _ => None,
        }
    }

    /// Creates the deposit of an 18 years old beneficiary under the current
    /// generation, expiring at midnight UTC after the validity period.
    pub fn grant_18(
        &self,
        id: impl Into<String>,
        beneficiary_id: impl Into<String>,
        granted_at: DateTime<Utc>,
        is_final: bool,
    ) -> Deposit {
        let amount = match self.current_version {
            DepositVersion::V1 => GRANTED_DEPOSIT_AMOUNT_18_V1,
            DepositVersion::V2 => GRANTED_DEPOSIT_AMOUNT_18_V2,
        };
        let expiration = add_years(granted_at.date_naive(), GRANT_18_VALIDITY_IN_YEARS)
            .and_time(NaiveTime::MIN)
            .and_utc();
        Deposit {
            id: id.into(),
            beneficiary_id: beneficiary_id.into(),
            amount,
            is_final,
            version: self.current_version,
            expiration_date: Some(expiration),
        }
    }
}
