use serde::{Deserialize, Serialize};

use super::domain::EligibilityResult;

pub const DEFAULT_APR_PCT: f64 = 12.99;
pub const MIN_AMOUNT: f64 = 100.0;
pub const MAX_AMOUNT: f64 = 50_000.0;
pub const MAX_TERM_MONTHS: u32 = 60;

/// Installment terms for a requested amount, checked against an eligibility result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanQuote {
    pub amount: f64,
    pub term_months: u32,
    pub apr_pct: f64,
    pub monthly_payment: f64,
    pub total_repayment: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended_limit: Option<u32>,
    pub within_limit: bool,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QuoteError {
    #[error("loan amount {0} must be between 100 and 50000")]
    AmountOutOfRange(f64),
    #[error("term of {0} months must be between 1 and 60")]
    TermOutOfRange(u32),
    #[error("annual rate {0}% must be a non-negative number")]
    InvalidRate(f64),
}

/// Level monthly payment, rounded to cents. A zero rate repays principal evenly.
pub fn monthly_payment(principal: f64, apr_pct: f64, term_months: u32) -> f64 {
    let months = f64::from(term_months.max(1));
    let payment = if apr_pct == 0.0 {
        principal / months
    } else {
        let rate = apr_pct / 100.0 / 12.0;
        let growth = (1.0 + rate).powf(months);
        principal * rate * growth / (growth - 1.0)
    };
    round_cents(payment)
}

/// Quote `amount` over `term_months`. Rejected results never fit a limit.
pub fn quote_against(
    result: &EligibilityResult,
    amount: f64,
    term_months: u32,
    apr_pct: f64,
) -> Result<LoanQuote, QuoteError> {
    if !(MIN_AMOUNT..=MAX_AMOUNT).contains(&amount) {
        return Err(QuoteError::AmountOutOfRange(amount));
    }
    if term_months == 0 || term_months > MAX_TERM_MONTHS {
        return Err(QuoteError::TermOutOfRange(term_months));
    }
    if !apr_pct.is_finite() || apr_pct < 0.0 {
        return Err(QuoteError::InvalidRate(apr_pct));
    }

    let monthly_payment = monthly_payment(amount, apr_pct, term_months);
    let within_limit = result
        .recommended_limit
        .map_or(false, |limit| amount <= f64::from(limit));

    Ok(LoanQuote {
        amount,
        term_months,
        apr_pct,
        monthly_payment,
        total_repayment: round_cents(monthly_payment * f64::from(term_months)),
        recommended_limit: result.recommended_limit,
        within_limit,
    })
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
