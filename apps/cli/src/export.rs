//! Writing resolution results as CSV or JSON.

use std::io::Write;

use anyhow::{Context, Result};
use csv::WriterBuilder;
use reimbursement_core::reimbursement::ResolutionSummary;
use reimbursement_core::ResolutionResult;
use serde::Serialize;

use crate::config::OutputFormat;

const CSV_HEADER: [&str; 10] = [
    "transactionId",
    "createdAt",
    "venueId",
    "offererId",
    "value",
    "ruleId",
    "ruleGroup",
    "ruleDescription",
    "rate",
    "reimbursedAmount",
];

pub fn write_csv<W: Write>(writer: W, results: &[ResolutionResult], delimiter: u8) -> Result<()> {
    let mut csv_writer = WriterBuilder::new().delimiter(delimiter).from_writer(writer);
    csv_writer.write_record(CSV_HEADER)?;

    for result in results {
        let tx = &result.transaction;
        csv_writer
            .write_record([
                tx.id.clone(),
                tx.created_at.to_rfc3339(),
                tx.venue_id.clone(),
                tx.offerer_id.clone(),
                tx.value.to_string(),
                result.rule.id.to_string(),
                result.rule.group.label().to_string(),
                result.rule.description.clone(),
                result.rule.rate.to_string(),
                result.rounded_amount().to_string(),
            ])
            .with_context(|| format!("failed to write result of {}", tx.id))?;
    }

    csv_writer.flush()?;
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonReport<'a> {
    results: &'a [ResolutionResult],
    summary: ResolutionSummary,
}

pub fn write_json<W: Write>(writer: W, results: &[ResolutionResult]) -> Result<()> {
    let report = JsonReport {
        results,
        summary: ResolutionSummary::from_results(results),
    };
    serde_json::to_writer_pretty(writer, &report)?;
    Ok(())
}

pub fn write_results<W: Write>(
    writer: W,
    results: &[ResolutionResult],
    format: OutputFormat,
    delimiter: u8,
) -> Result<()> {
    match format {
        OutputFormat::Csv => write_csv(writer, results, delimiter),
        OutputFormat::Json => write_json(writer, results),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use reimbursement_core::transactions::OfferCategory;
    use reimbursement_core::{ReimbursementEngine, RulePolicy, RuleSet, Transaction};
    use rust_decimal_macros::dec;

    fn results() -> Vec<ResolutionResult> {
        let bookings = vec![
            Transaction {
                id: "b1".to_string(),
                created_at: Utc.with_ymd_and_hms(2019, 3, 1, 9, 0, 0).unwrap(),
                value: dec!(30000),
                is_digital: false,
                category: OfferCategory::Standard,
                venue_id: "v1".to_string(),
                offerer_id: "o1".to_string(),
            },
            Transaction {
                id: "b2".to_string(),
                created_at: Utc.with_ymd_and_hms(2019, 3, 2, 9, 0, 0).unwrap(),
                value: dec!(10.01),
                is_digital: false,
                category: OfferCategory::Standard,
                venue_id: "v1".to_string(),
                offerer_id: "o1".to_string(),
            },
        ];
        ReimbursementEngine::new(RuleSet::for_policy(RulePolicy::New))
            .resolve_all(&bookings)
            .unwrap()
    }

    #[test]
    fn test_write_csv() {
        let mut out = Vec::new();
        write_csv(&mut out, &results(), b';').unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("transactionId;createdAt;venueId"));
        assert!(lines[2].starts_with("b2;2019-03-02T09:00:00+00:00;v1;o1;10.01;BETWEEN_20000_AND_40000_EUROS;"));
        assert!(lines[2].ends_with(";0.95;9.51"));
    }

    #[test]
    fn test_write_json_includes_summary() {
        let mut out = Vec::new();
        write_results(&mut out, &results(), OutputFormat::Json, b';').unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();

        assert_eq!(value["results"].as_array().unwrap().len(), 2);
        assert_eq!(value["summary"]["transactionCount"], 2);
        assert_eq!(value["results"][1]["rule"]["id"], "BETWEEN_20000_AND_40000_EUROS");
    }
}
