//! Core error types for the reimbursement engine.
//!
//! Configuration and ordering errors abort a whole resolution run. Fund errors
//! are per-request business outcomes and never abort a batch.

use chrono::{DateTime, ParseError as ChronoParseError, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the reimbursement engine.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Rule configuration error: {0}")]
    Rule(#[from] RuleError),

    #[error("Resolution failed: {0}")]
    Resolution(#[from] ResolutionError),

    #[error("Fund check failed: {0}")]
    Fund(#[from] FundError),

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),
}

impl Error {
    /// Whether the caller may retry or carry on with the rest of a batch.
    ///
    /// Only fund errors qualify: they are scoped to one request, and a
    /// temporary-fund refusal may succeed once the deposit is final.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::Fund(_))
    }
}

/// Errors raised while building or evaluating a rule set.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuleError {
    /// No active rule in the rule set is relevant for this transaction.
    /// The engine has no default rate, so the whole run is aborted.
    #[error("No relevant reimbursement rule found for transaction {transaction_id}")]
    NoRelevantRule { transaction_id: String },

    #[error("Rule '{rule}' has rate {rate}, expected a value between 0 and 1")]
    InvalidRate { rule: String, rate: Decimal },

    #[error("Rule '{rule}' has a validity window that ends before it starts")]
    InvalidWindow { rule: String },

    #[error("Invalid rule definition: {0}")]
    InvalidDefinition(String),
}

/// Errors detected by the resolution engine on its input.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolutionError {
    #[error(
        "Transaction {transaction_id} dated {current} precedes {previous} in group {key}; input must be sorted by creation date"
    )]
    OutOfOrder {
        transaction_id: String,
        key: String,
        previous: DateTime<Utc>,
        current: DateTime<Utc>,
    },
}

/// Business outcomes of a deposit check.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FundError {
    /// The nominal deposit amount is exceeded.
    #[error("Insufficient fund: requested {requested}, available {available}")]
    InsufficientFund {
        requested: Decimal,
        available: Decimal,
    },

    /// The temporary allowance of a non-final deposit is exceeded.
    #[error("Insufficient temporary fund: requested {requested}, available until the deposit is final {available}")]
    InsufficientTemporaryFund {
        requested: Decimal,
        available: Decimal,
    },

    #[error("Digital cap of {cap} exceeded: {requested} requested")]
    DigitalCapExceeded { requested: Decimal, cap: Decimal },

    #[error("Physical cap of {cap} exceeded: {requested} requested")]
    PhysicalCapExceeded { requested: Decimal, cap: Decimal },
}

/// Validation errors for user input and data parsing.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Required field '{0}' is missing")]
    MissingField(String),

    #[error("Failed to parse decimal number: {0}")]
    DecimalParse(#[from] rust_decimal::Error),

    #[error("Failed to parse date/time: {0}")]
    DateTimeParse(#[from] ChronoParseError),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
}

// === From implementations for common error types ===

impl From<rust_decimal::Error> for Error {
    fn from(err: rust_decimal::Error) -> Self {
        Error::Validation(ValidationError::DecimalParse(err))
    }
}

impl From<ChronoParseError> for Error {
    fn from(err: ChronoParseError) -> Self {
        Error::Validation(ValidationError::DateTimeParse(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Validation(ValidationError::Json(err))
    }
}

impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.to_string()
    }
}
