use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Decimal places kept when an amount leaves the engine (exports, fund checks)
pub const CURRENCY_DECIMAL_PRECISION: u32 = 2;

/// Cumulative value above which the legacy per-offerer cap and the book rate kick in
pub const FIRST_THRESHOLD: Decimal = dec!(20000);

/// Upper bound of the 95% band
pub const SECOND_THRESHOLD: Decimal = dec!(40000);

/// Upper bound of the 85% band
pub const THIRD_THRESHOLD: Decimal = dec!(100000);

pub const RATE_FULL: Decimal = dec!(1);
pub const RATE_NONE: Decimal = dec!(0);
pub const RATE_BETWEEN_20000_AND_40000: Decimal = dec!(0.95);
pub const RATE_BETWEEN_40000_AND_100000: Decimal = dec!(0.85);
pub const RATE_ABOVE_100000: Decimal = dec!(0.65);
pub const RATE_BOOK_ABOVE_20000: Decimal = dec!(0.95);
