use crate::commands::{
    run_assess, run_catalog, run_features, run_quote, run_score, AssessArgs, FeaturesArgs,
    QuoteArgs, ScoreArgs,
};
use cashflow_credit::config::AppConfig;
use cashflow_credit::error::AppError;
use cashflow_credit::telemetry;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "cashflow-scorer",
    about = "Score small-loan eligibility from cash-flow history",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Score a prepared financial snapshot (JSON)
    Score(ScoreArgs),
    /// Summarise a raw ledger export and score it
    Assess(AssessArgs),
    /// Print the derived feature set for a snapshot without scoring it
    Features(FeaturesArgs),
    /// Quote installments for a requested amount against a snapshot's eligibility
    Quote(QuoteArgs),
    /// List the reason code catalog
    Catalog,
}

pub(crate) fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    match cli.command {
        Command::Score(args) => run_score(&config, args),
        Command::Assess(args) => run_assess(&config, args),
        Command::Features(args) => run_features(args),
        Command::Quote(args) => run_quote(&config, args),
        Command::Catalog => run_catalog(),
    }
}
