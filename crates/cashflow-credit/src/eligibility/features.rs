use serde::{Deserialize, Serialize};

use super::domain::{CashflowStability, EligibilityInput, FraudFlag, SpendingBehavior};

/// Months covered by the trailing observation window.
pub const OBSERVATION_MONTHS: usize = 3;

/// Financial picture of a subject over the trailing 90 days.
///
/// `monthly_credits` and `monthly_debits` run oldest to newest. A subject with no accounts is
/// represented by [`FinancialSnapshot::default`], not by an error.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FinancialSnapshot {
    pub total_balance: f64,
    pub transaction_count_90d: u32,
    pub total_spend_90d: f64,
    pub total_credits_90d: f64,
    pub monthly_credits: [f64; OBSERVATION_MONTHS],
    pub monthly_debits: [f64; OBSERVATION_MONTHS],
    pub overdraft_count: u32,
    pub negative_balance_days: u32,
    pub budget_count: u32,
    pub budget_adherence_pct: f64,
    #[serde(default)]
    pub fraud_flags: Vec<FraudFlag>,
}

/// Derive the normalised feature set from a snapshot.
///
/// An income override only wins when it is positive; otherwise income is the most recent
/// month's credits, falling back to the three-month average.
pub fn aggregate(snapshot: &FinancialSnapshot, income_override: Option<f64>) -> EligibilityInput {
    let months = OBSERVATION_MONTHS as f64;
    let avg_monthly_spend = non_negative(snapshot.total_spend_90d) / months;
    let avg_monthly_credits = non_negative(snapshot.total_credits_90d) / months;

    let monthly_income_estimate = match income_override.map(non_negative) {
        Some(income) if income > 0.0 => income,
        _ => derive_monthly_income(&snapshot.monthly_credits, avg_monthly_credits),
    };

    let (savings_rate_pct, discretionary_spend_pct) = if avg_monthly_credits > 0.0 {
        (
            ((avg_monthly_credits - avg_monthly_spend) / avg_monthly_credits * 100.0).max(0.0),
            (avg_monthly_spend / avg_monthly_credits * 100.0).min(100.0),
        )
    } else {
        (0.0, 100.0)
    };

    let budget_adherence_pct =
        (snapshot.budget_count > 0).then(|| non_negative(snapshot.budget_adherence_pct));

    EligibilityInput {
        monthly_income_estimate,
        spending_behavior: SpendingBehavior {
            avg_monthly_spend,
            discretionary_spend_pct,
            savings_rate_pct,
            overdraft_count: Some(snapshot.overdraft_count),
            budget_adherence_pct,
        },
        cashflow_stability: CashflowStability {
            income_variance_pct: income_variance_pct(&snapshot.monthly_credits),
            consecutive_positive_months: consecutive_positive_months(
                &snapshot.monthly_credits,
                &snapshot.monthly_debits,
            ),
            negative_balance_days: Some(snapshot.negative_balance_days),
            transaction_volume_90d: snapshot.transaction_count_90d,
        },
        fraud_flags: snapshot.fraud_flags.clone(),
    }
}

fn derive_monthly_income(monthly_credits: &[f64], avg_monthly_credits: f64) -> f64 {
    match monthly_credits.last().copied().map(non_negative) {
        Some(latest) if latest > 0.0 => latest,
        _ => avg_monthly_credits,
    }
}

/// Coefficient of variation of monthly credits as a percentage, capped at 100.
///
/// Fewer than two months carries no variance signal and yields 0. A non-positive mean means
/// there is no reliable income at all, which reads as maximally unstable.
pub fn income_variance_pct(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }

    let count = values.len() as f64;
    let mean = values.iter().sum::<f64>() / count;
    if mean.is_nan() || mean <= 0.0 {
        return 100.0;
    }

    let variance = values
        .iter()
        .map(|value| (value - mean).powi(2))
        .sum::<f64>()
        / count;

    (variance.sqrt() / mean * 100.0).min(100.0)
}

/// Trailing streak of months with non-negative net flow, walking back from the newest month.
/// The first negative month ends the streak. Missing debits count as zero.
pub fn consecutive_positive_months(credits: &[f64], debits: &[f64]) -> u32 {
    let mut streak = 0;
    for (index, credit) in credits.iter().enumerate().rev() {
        let debit = debits.get(index).copied().unwrap_or(0.0);
        if credit - debit >= 0.0 {
            streak += 1;
        } else {
            break;
        }
    }
    streak
}

pub(crate) fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}
