use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

use cashflow_credit::config::EligibilityConfig;
use cashflow_credit::eligibility::{
    FinancialSnapshot, InMemoryResultSink, JsonLinesResultSink, ResultSink,
};
use cashflow_credit::error::AppError;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn load_snapshot(path: &Path) -> Result<FinancialSnapshot, AppError> {
    let file = File::open(path)?;
    let snapshot = serde_json::from_reader(BufReader::new(file))?;
    Ok(snapshot)
}

/// Audit sink for the configured environment. Without an audit log the results are kept in
/// memory for the lifetime of the command only.
pub(crate) fn audit_sink(config: &EligibilityConfig) -> Arc<dyn ResultSink> {
    match &config.audit_log {
        Some(path) => {
            let sink = JsonLinesResultSink::new(path.clone());
            debug!(path = %sink.path().display(), "writing eligibility results to audit log");
            Arc::new(sink)
        }
        None => Arc::new(InMemoryResultSink::default()),
    }
}

pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_iso_dates_and_reports_bad_input() {
        assert_eq!(
            parse_date(" 2025-10-14 "),
            Ok(NaiveDate::from_ymd_opt(2025, 10, 14).expect("valid date"))
        );
        let err = parse_date("14/10/2025").expect_err("rejects non-iso dates");
        assert!(err.contains("YYYY-MM-DD"));
    }
}
