//! Transactions module - reimbursable bookings as seen by the rule engine.

mod transactions_model;


pub use transactions_model::{GroupingKey, GroupingStrategy, OfferCategory, Transaction};
