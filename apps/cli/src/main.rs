mod config;
mod export;
mod input;

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use config::{parse_delimiter, Config, OutputFormat};
use reimbursement_core::deposits::{
    check_expenses_limits, has_enough_fund, BeneficiarySpending, CappedOffer, Deposit,
    DepositVersion,
};
use reimbursement_core::transactions::GroupingStrategy;
use reimbursement_core::{ReimbursementEngine, ResolutionOptions, RulePolicy, RuleSet};
use rust_decimal::Decimal;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "reimbursement")]
#[command(about = "Computes venue reimbursements and checks beneficiary deposits")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Elect a reimbursement rule for every transaction of a batch
    Resolve {
        /// Transactions file (.json or .csv), sorted by creation date
        #[arg(long)]
        input: PathBuf,
        /// Built-in rule set: current or new
        #[arg(long)]
        policy: Option<String>,
        /// Rule set definition (JSON) used instead of a built-in policy
        #[arg(long, conflicts_with = "policy")]
        rules: Option<PathBuf>,
        /// Override the grouping of cumulative values: year, venue-year, offerer-year
        #[arg(long)]
        grouping: Option<String>,
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
        /// CSV delimiter for both input and output
        #[arg(long)]
        delimiter: Option<String>,
        /// Write to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
        /// Resolve venues (or offerers) in parallel
        #[arg(long)]
        parallel: bool,
        /// Only log transactions that are out of chronological order
        #[arg(long)]
        lenient_ordering: bool,
    },

    /// Check a booking request against a beneficiary deposit
    CheckFund {
        /// Nominal deposit amount
        #[arg(long)]
        amount: Decimal,
        /// Deposit is not final yet
        #[arg(long)]
        temporary: bool,
        /// Deposit generation (1 or 2)
        #[arg(long, default_value_t = 2)]
        version: u8,
        /// Amount already spent
        #[arg(long, default_value_t = Decimal::ZERO)]
        spent: Decimal,
        /// Amount already spent on digital offers
        #[arg(long, default_value_t = Decimal::ZERO)]
        spent_digital: Decimal,
        /// Amount already spent on physical offers
        #[arg(long, default_value_t = Decimal::ZERO)]
        spent_physical: Decimal,
        /// Price of the requested booking
        #[arg(long)]
        requested: Decimal,
        /// The offer is digital and subject to the digital cap
        #[arg(long, conflicts_with = "physical_capped")]
        digital_capped: bool,
        /// The offer is physical and subject to the physical cap
        #[arg(long)]
        physical_capped: bool,
    },
}

fn init_tracing() {
    let log_format =
        std::env::var("REIMBURSEMENT_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    // logs go to stderr so stdout stays a clean export
    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false).with_writer(io::stderr))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_line_number(true)
                    .with_writer(io::stderr),
            )
            .init();
    }
}

fn main() -> Result<()> {
    let config = Config::from_env()?;
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Resolve {
            input,
            policy,
            rules,
            grouping,
            format,
            delimiter,
            output,
            parallel,
            lenient_ordering,
        } => {
            let rule_set = match (rules, policy) {
                (Some(path), _) => {
                    let json = std::fs::read_to_string(&path)
                        .with_context(|| format!("failed to read {}", path.display()))?;
                    RuleSet::from_json(&json).context("invalid rule set definition")?
                }
                (None, Some(policy)) => RuleSet::for_policy(policy.parse::<RulePolicy>()?),
                (None, None) => RuleSet::for_policy(config.policy),
            };
            let delimiter = match delimiter {
                Some(raw) => parse_delimiter(&raw)?,
                None => config.csv_delimiter,
            };
            let options = ResolutionOptions {
                grouping: grouping
                    .map(|raw| raw.parse::<GroupingStrategy>())
                    .transpose()?,
                enforce_ordering: config.strict_ordering && !lenient_ordering,
                ..Default::default()
            };

            let transactions = input::load_transactions(&input, delimiter)?;
            tracing::info!(
                "Loaded {} transactions from {}",
                transactions.len(),
                input.display()
            );

            let engine = ReimbursementEngine::with_options(rule_set, options);
            let results = if parallel {
                engine.resolve_partitioned(&transactions)?
            } else {
                engine.resolve_all(&transactions)?
            };

            let format = format.unwrap_or(config.output_format);
            match output {
                Some(path) => {
                    let file = File::create(&path)
                        .with_context(|| format!("failed to create {}", path.display()))?;
                    let mut writer = BufWriter::new(file);
                    export::write_results(&mut writer, &results, format, delimiter)?;
                    writer.flush()?;
                    tracing::info!("Wrote {} results to {}", results.len(), path.display());
                }
                None => {
                    let stdout = io::stdout();
                    export::write_results(stdout.lock(), &results, format, delimiter)?;
                }
            }
        }

        Command::CheckFund {
            amount,
            temporary,
            version,
            spent,
            spent_digital,
            spent_physical,
            requested,
            digital_capped,
            physical_capped,
        } => {
            let deposit = Deposit {
                id: "cli".to_string(),
                beneficiary_id: "cli".to_string(),
                amount,
                is_final: !temporary,
                version: DepositVersion::try_from(version)?,
                expiration_date: None,
            };

            let outcome = if digital_capped || physical_capped {
                let offer = CappedOffer {
                    is_digital: digital_capped,
                    is_digital_deposit: digital_capped,
                    is_physical_deposit: physical_capped,
                };
                let spending = BeneficiarySpending {
                    total: spent,
                    digital: spent_digital,
                    physical: spent_physical,
                };
                check_expenses_limits(&deposit, &spending, &offer, requested)
            } else {
                has_enough_fund(&deposit, spent + requested)
            };

            match outcome {
                Ok(()) => println!(
                    "OK: {} available, {} after booking",
                    deposit.get_amount(),
                    spent + requested
                ),
                Err(err) if err.is_recoverable() => {
                    println!("REFUSED: {}", err);
                    std::process::exit(2);
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    Ok(())
}
