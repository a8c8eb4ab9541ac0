mod cli;
mod commands;
mod infra;

use cashflow_credit::error::AppError;

pub fn run() -> Result<(), AppError> {
    cli::run()
}
