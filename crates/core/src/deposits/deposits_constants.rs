use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Share of a non-final deposit that can be spent before it is finalized.
pub const TEMPORARY_FUND_AVAILABLE_RATIO: Decimal = dec!(0.8);

/// Years during which the 18 years old grant can be spent.
pub const GRANT_18_VALIDITY_IN_YEARS: i32 = 2;

pub const GRANTED_DEPOSIT_AMOUNT_15: Decimal = dec!(20);
pub const GRANTED_DEPOSIT_AMOUNT_16: Decimal = dec!(30);
pub const GRANTED_DEPOSIT_AMOUNT_17: Decimal = dec!(30);
/// No longer granted, still found on historical deposits.
pub const GRANTED_DEPOSIT_AMOUNT_18_V1: Decimal = dec!(500);
pub const GRANTED_DEPOSIT_AMOUNT_18_V2: Decimal = dec!(300);

pub const GRANT_18_DIGITAL_CAP_V1: Decimal = dec!(200);
pub const GRANT_18_DIGITAL_CAP_V2: Decimal = dec!(100);
pub const GRANT_18_PHYSICAL_CAP_V1: Decimal = dec!(200);
pub const GRANT_18_PHYSICAL_CAP_V2: Option<Decimal> = None;
