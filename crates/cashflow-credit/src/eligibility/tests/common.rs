use std::sync::Mutex;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::eligibility::domain::{
    CashflowStability, EligibilityInput, EligibilityResult, FraudFlag, FraudSeverity,
    SpendingBehavior, SubjectId,
};
use crate::eligibility::features::FinancialSnapshot;
use crate::eligibility::ledger::{
    AccountBalance, BudgetRecord, FraudSignal, LedgerExport, LedgerTransaction,
};
use crate::eligibility::repository::{ResultSink, SinkError};

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn subject(id: &str) -> SubjectId {
    SubjectId(id.to_string())
}

/// Healthy salaried profile: approves comfortably with no fraud flags.
pub(super) fn healthy_input() -> EligibilityInput {
    EligibilityInput {
        monthly_income_estimate: 2000.0,
        spending_behavior: SpendingBehavior {
            avg_monthly_spend: 500.0,
            discretionary_spend_pct: 25.0,
            savings_rate_pct: 10.0,
            overdraft_count: Some(0),
            budget_adherence_pct: None,
        },
        cashflow_stability: CashflowStability {
            income_variance_pct: 5.0,
            consecutive_positive_months: 3,
            negative_balance_days: Some(0),
            transaction_volume_90d: 20,
        },
        fraud_flags: Vec::new(),
    }
}

pub(super) fn with_flags(mut input: EligibilityInput, flags: Vec<FraudFlag>) -> EligibilityInput {
    input.fraud_flags = flags;
    input
}

pub(super) fn steady_snapshot() -> FinancialSnapshot {
    FinancialSnapshot {
        total_balance: 4200.0,
        transaction_count_90d: 45,
        total_spend_90d: 5400.0,
        total_credits_90d: 10_500.0,
        monthly_credits: [3500.0, 3500.0, 3500.0],
        monthly_debits: [1900.0, 1700.0, 1800.0],
        overdraft_count: 0,
        negative_balance_days: 0,
        budget_count: 2,
        budget_adherence_pct: 100.0,
        fraud_flags: Vec::new(),
    }
}

fn tx(date: NaiveDate, amount: f64) -> LedgerTransaction {
    LedgerTransaction {
        account_id: "chk-1".to_string(),
        date,
        amount,
        overdraft: false,
    }
}

/// Ledger summarised as of 2025-06-15: April through June buckets, one pre-April credit,
/// one future-dated credit and one stale credit outside the window.
pub(super) fn sample_ledger() -> LedgerExport {
    let mut overdraft = tx(date(2025, 5, 20), -300.0);
    overdraft.overdraft = true;

    LedgerExport {
        accounts: vec![
            AccountBalance {
                account_id: "chk-1".to_string(),
                current_balance: 2500.0,
                is_active: true,
            },
            AccountBalance {
                account_id: "old-card".to_string(),
                current_balance: -5000.0,
                is_active: false,
            },
        ],
        transactions: vec![
            tx(date(2025, 3, 10), 9999.0),
            tx(date(2025, 3, 20), 500.0),
            tx(date(2025, 4, 1), 3000.0),
            tx(date(2025, 4, 15), -1200.0),
            tx(date(2025, 5, 1), 3000.0),
            tx(date(2025, 5, 10), -1400.0),
            overdraft,
            tx(date(2025, 6, 1), 3200.0),
            tx(date(2025, 6, 5), -900.0),
            tx(date(2025, 6, 20), 1000.0),
        ],
        budgets: vec![
            BudgetRecord {
                category: "groceries".to_string(),
                amount: 600.0,
                start_date: date(2025, 1, 1),
                end_date: None,
            },
            BudgetRecord {
                category: "dining".to_string(),
                amount: 200.0,
                start_date: date(2025, 1, 1),
                end_date: Some(date(2025, 5, 31)),
            },
            BudgetRecord {
                category: "transport".to_string(),
                amount: 250.0,
                start_date: date(2025, 6, 1),
                end_date: None,
            },
        ],
        fraud_signals: Vec::new(),
    }
}

pub(super) fn signal(kind: &str, severity: FraudSeverity, day: u32) -> FraudSignal {
    FraudSignal {
        signal_type: kind.to_string(),
        severity,
        description: None,
        created_at: Utc
            .with_ymd_and_hms(2025, 6, day, 8, 0, 0)
            .single()
            .expect("valid timestamp"),
    }
}

#[derive(Default)]
pub(super) struct FailingSink {
    pub(super) attempts: Mutex<u32>,
}

impl ResultSink for FailingSink {
    fn record(&self, _subject: &SubjectId, _result: &EligibilityResult) -> Result<(), SinkError> {
        *self.attempts.lock().expect("attempts mutex poisoned") += 1;
        Err(SinkError::Unavailable("audit database offline".to_string()))
    }
}
