use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::sync::Arc;

use cashflow_credit::config::AppConfig;
use cashflow_credit::eligibility::{
    aggregate, catalog, quote_against, EligibilityResult, EligibilityService, LedgerDataProvider,
    LedgerExport, LoanQuote, StaticSnapshotProvider, SubjectId, CATALOG_VERSION,
    DEFAULT_APR_PCT,
};
use cashflow_credit::error::AppError;
use chrono::NaiveDate;
use clap::Args;
use serde::Serialize;
use tracing::info;

use crate::infra::{audit_sink, load_snapshot, print_json};

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Financial snapshot JSON file
    #[arg(long)]
    pub(crate) snapshot: PathBuf,
    /// Identifier recorded alongside the result
    #[arg(long, default_value = "cli-subject")]
    pub(crate) subject: String,
    /// Use this monthly income instead of the one derived from credits
    #[arg(long)]
    pub(crate) income_override: Option<f64>,
}

#[derive(Args, Debug)]
pub(crate) struct AssessArgs {
    /// Ledger export JSON (accounts, transactions, budgets, fraud signals)
    #[arg(long)]
    pub(crate) ledger: Option<PathBuf>,
    /// Additional transactions as CSV (date,amount,account_id,overdraft)
    #[arg(long)]
    pub(crate) transactions: Option<PathBuf>,
    /// Identifier recorded alongside the result
    #[arg(long, default_value = "cli-subject")]
    pub(crate) subject: String,
    /// Summarise the ledger as of this date (YYYY-MM-DD, defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) as_of: Option<NaiveDate>,
    /// Use this monthly income instead of the one derived from credits
    #[arg(long)]
    pub(crate) income_override: Option<f64>,
}

#[derive(Args, Debug)]
pub(crate) struct FeaturesArgs {
    /// Financial snapshot JSON file
    #[arg(long)]
    pub(crate) snapshot: PathBuf,
    /// Use this monthly income instead of the one derived from credits
    #[arg(long)]
    pub(crate) income_override: Option<f64>,
}

#[derive(Args, Debug)]
pub(crate) struct QuoteArgs {
    /// Financial snapshot JSON file
    #[arg(long)]
    pub(crate) snapshot: PathBuf,
    /// Requested principal
    #[arg(long)]
    pub(crate) amount: f64,
    /// Repayment term in months
    #[arg(long)]
    pub(crate) term: u32,
    /// Annual percentage rate
    #[arg(long, default_value_t = DEFAULT_APR_PCT)]
    pub(crate) apr: f64,
    /// Identifier recorded alongside the result
    #[arg(long, default_value = "cli-subject")]
    pub(crate) subject: String,
    /// Use this monthly income instead of the one derived from credits
    #[arg(long)]
    pub(crate) income_override: Option<f64>,
}

pub(crate) fn run_score(config: &AppConfig, args: ScoreArgs) -> Result<(), AppError> {
    let ScoreArgs {
        snapshot,
        subject,
        income_override,
    } = args;

    let result = score_snapshot_file(config, snapshot, SubjectId(subject), income_override)?;
    print_json(&result)
}

pub(crate) fn run_assess(config: &AppConfig, args: AssessArgs) -> Result<(), AppError> {
    let AssessArgs {
        ledger,
        transactions,
        subject,
        as_of,
        income_override,
    } = args;

    let mut export = match ledger {
        Some(path) => LedgerExport::from_json_reader(BufReader::new(File::open(path)?))?,
        None => LedgerExport::default(),
    };
    if let Some(path) = transactions {
        let added = export.extend_from_csv(BufReader::new(File::open(path)?))?;
        info!(added, "imported ledger transactions from csv");
    }

    let subject = SubjectId(subject);
    let provider = Arc::new(LedgerDataProvider::default());
    provider.insert(subject.clone(), export);

    let service = EligibilityService::new(
        provider,
        audit_sink(&config.eligibility),
        config.eligibility.scoring_config(),
    )
    .with_persistence(config.eligibility.persist_results);

    let result = service.assess(&subject, as_of, income_override)?;
    print_json(&result)
}

pub(crate) fn run_features(args: FeaturesArgs) -> Result<(), AppError> {
    let snapshot = load_snapshot(&args.snapshot)?;
    print_json(&aggregate(&snapshot, args.income_override))
}

#[derive(Serialize)]
struct QuoteReport {
    eligibility: EligibilityResult,
    quote: LoanQuote,
}

pub(crate) fn run_quote(config: &AppConfig, args: QuoteArgs) -> Result<(), AppError> {
    let QuoteArgs {
        snapshot,
        amount,
        term,
        apr,
        subject,
        income_override,
    } = args;

    let eligibility = score_snapshot_file(config, snapshot, SubjectId(subject), income_override)?;
    let quote = quote_against(&eligibility, amount, term, apr)?;
    print_json(&QuoteReport { eligibility, quote })
}

#[derive(Serialize)]
struct CatalogListing {
    version: &'static str,
    entries: &'static [cashflow_credit::eligibility::CatalogEntry],
}

pub(crate) fn run_catalog() -> Result<(), AppError> {
    print_json(&CatalogListing {
        version: CATALOG_VERSION,
        entries: catalog(),
    })
}

fn score_snapshot_file(
    config: &AppConfig,
    path: PathBuf,
    subject: SubjectId,
    income_override: Option<f64>,
) -> Result<EligibilityResult, AppError> {
    let snapshot = load_snapshot(&path)?;
    let provider = Arc::new(StaticSnapshotProvider::with_snapshot(
        subject.clone(),
        snapshot,
    ));

    let service = EligibilityService::new(
        provider,
        audit_sink(&config.eligibility),
        config.eligibility.scoring_config(),
    )
    .with_persistence(config.eligibility.persist_results);

    Ok(service.assess(&subject, None, income_override)?)
}
