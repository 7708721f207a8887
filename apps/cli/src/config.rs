use std::str::FromStr;

use reimbursement_core::RulePolicy;

/// Output format of the `resolve` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Csv,
    Json,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            other => Err(anyhow::anyhow!("Unknown output format '{}'", other)),
        }
    }
}

/// Defaults read from the environment; command line flags take precedence.
#[derive(Debug, Clone)]
pub struct Config {
    pub policy: RulePolicy,
    pub output_format: OutputFormat,
    pub csv_delimiter: u8,
    pub strict_ordering: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            policy: RulePolicy::New,
            output_format: OutputFormat::Csv,
            csv_delimiter: b';',
            strict_ordering: true,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let policy = match std::env::var("REIMBURSEMENT_POLICY") {
            Ok(raw) => RulePolicy::from_str(&raw)?,
            Err(_) => defaults.policy,
        };
        let output_format = match std::env::var("REIMBURSEMENT_OUTPUT_FORMAT") {
            Ok(raw) => OutputFormat::from_str(&raw)?,
            Err(_) => defaults.output_format,
        };
        let csv_delimiter = match std::env::var("REIMBURSEMENT_CSV_DELIMITER") {
            Ok(raw) => parse_delimiter(&raw)?,
            Err(_) => defaults.csv_delimiter,
        };
        let strict_ordering = match std::env::var("REIMBURSEMENT_STRICT_ORDERING") {
            Ok(raw) => parse_flag("REIMBURSEMENT_STRICT_ORDERING", &raw)?,
            Err(_) => defaults.strict_ordering,
        };

        Ok(Self {
            policy,
            output_format,
            csv_delimiter,
            strict_ordering,
        })
    }
}

/// Parses `true` or `false`, case insensitive.
pub fn parse_flag(name: &str, raw: &str) -> anyhow::Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(anyhow::anyhow!(
            "{} must be 'true' or 'false', got '{}'",
            name,
            raw
        )),
    }
}

/// Accepts a single ASCII character, or `\t` for tabs.
pub fn parse_delimiter(raw: &str) -> anyhow::Result<u8> {
    if raw == "\\t" || raw == "\t" {
        return Ok(b'\t');
    }
    match raw.as_bytes() {
        [byte] if byte.is_ascii() => Ok(*byte),
        _ => Err(anyhow::anyhow!(
            "CSV delimiter must be a single ASCII character, got '{}'",
            raw
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_delimiter() {
        assert_eq!(parse_delimiter(";").unwrap(), b';');
        assert_eq!(parse_delimiter("\\t").unwrap(), b'\t');
        assert!(parse_delimiter(";;").is_err());
        assert!(parse_delimiter("").is_err());
    }

    #[test]
    fn test_parse_flag_rejects_unknown_values() {
        assert!(parse_flag("REIMBURSEMENT_STRICT_ORDERING", "TRUE").unwrap());
        assert!(!parse_flag("REIMBURSEMENT_STRICT_ORDERING", " false ").unwrap());
        for raw in ["no", "0", ""] {
            let err = parse_flag("REIMBURSEMENT_STRICT_ORDERING", raw).unwrap_err();
            assert!(err.to_string().contains("REIMBURSEMENT_STRICT_ORDERING"));
        }
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!(OutputFormat::from_str("JSON").unwrap(), OutputFormat::Json);
        assert!(OutputFormat::from_str("xml").is_err());
    }
}
