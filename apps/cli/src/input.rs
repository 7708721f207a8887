//! Loading transaction batches from JSON or CSV files.

use std::path::Path;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use csv::{ReaderBuilder, Trim};
use reimbursement_core::transactions::OfferCategory;
use reimbursement_core::Transaction;
use rust_decimal::Decimal;
use serde::Deserialize;

/// One row of a transactions CSV. Values stay textual so decimals are parsed
/// exactly.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransactionRow {
    id: String,
    created_at: String,
    value: String,
    #[serde(default)]
    is_digital: Option<String>,
    #[serde(default)]
    category: Option<String>,
    venue_id: String,
    offerer_id: String,
}

impl TransactionRow {
    fn into_transaction(self, line: usize) -> Result<Transaction> {
        let created_at = DateTime::parse_from_rfc3339(self.created_at.trim())
            .with_context(|| format!("line {}: invalid createdAt '{}'", line, self.created_at))?
            .with_timezone(&Utc);
        let value = Decimal::from_str(self.value.trim())
            .with_context(|| format!("line {}: invalid value '{}'", line, self.value))?;
        let is_digital = match self.is_digital.as_deref().map(str::trim) {
            None | Some("") => false,
            Some(raw) => parse_bool(raw)
                .with_context(|| format!("line {}: invalid isDigital '{}'", line, raw))?,
        };
        let category = match self.category.as_deref().map(str::trim) {
            None | Some("") => OfferCategory::default(),
            Some(raw) => OfferCategory::from_str(raw)
                .with_context(|| format!("line {}: invalid category", line))?,
        };

        Ok(Transaction {
            id: self.id,
            created_at,
            value,
            is_digital,
            category,
            venue_id: self.venue_id,
            offerer_id: self.offerer_id,
        })
    }
}

fn parse_bool(raw: &str) -> Result<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        other => bail!("expected a boolean, got '{}'", other),
    }
}

pub fn parse_csv(content: &str, delimiter: u8) -> Result<Vec<Transaction>> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(Trim::Headers)
        .from_reader(content.as_bytes());

    let mut transactions = Vec::new();
    for (idx, row) in reader.deserialize::<TransactionRow>().enumerate() {
        // header is line 1
        let line = idx + 2;
        let row = row.with_context(|| format!("line {}: malformed row", line))?;
        transactions.push(row.into_transaction(line)?);
    }
    Ok(transactions)
}

pub fn parse_json(content: &str) -> Result<Vec<Transaction>> {
    serde_json::from_str(content).context("invalid transactions JSON")
}

/// Reads a batch, picking the parser from the file extension.
pub fn load_transactions(path: &Path, delimiter: u8) -> Result<Vec<Transaction>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));

    if is_csv {
        parse_csv(&content, delimiter)
    } else {
        parse_json(&content)
    }
}
