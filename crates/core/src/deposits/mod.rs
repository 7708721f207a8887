//! Deposits module - beneficiary credit, temporary allowance and spending caps.

mod deposits_constants;
mod deposits_model;
mod deposits_service;


pub use deposits_constants::*;
pub use deposits_model::{
    BeneficiarySpending, CappedOffer, Deposit, DepositVersion, RecreditType, SpecificCaps,
};
pub use deposits_service::{check_expenses_limits, has_enough_fund, DepositPolicy};
