//! Summarise raw ledger records into a [`FinancialSnapshot`].

use std::io::Read;

use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::domain::{FraudFlag, FraudSeverity};
use super::features::{FinancialSnapshot, OBSERVATION_MONTHS};

pub const WINDOW_DAYS: i64 = 90;
/// Only the most recent fraud signals are considered.
pub const MAX_FRAUD_SIGNALS: usize = 20;
/// Days assumed negative when the combined balance is below zero.
pub const NEGATIVE_BALANCE_ASSUMED_DAYS: u32 = 30;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountBalance {
    pub account_id: String,
    pub current_balance: f64,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// Signed ledger entry: credits are positive, debits negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerTransaction {
    #[serde(default)]
    pub account_id: String,
    pub date: NaiveDate,
    pub amount: f64,
    #[serde(default)]
    pub overdraft: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetRecord {
    pub category: String,
    pub amount: f64,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

impl BudgetRecord {
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        self.start_date <= date && self.end_date.map_or(true, |end| end >= date)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FraudSignal {
    pub signal_type: String,
    pub severity: FraudSeverity,
    #[serde(default)]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&FraudSignal> for FraudFlag {
    fn from(signal: &FraudSignal) -> Self {
        FraudFlag {
            code: signal.signal_type.clone(),
            severity: signal.severity,
            description: signal.description.clone(),
        }
    }
}

/// Everything known about one subject's accounts.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LedgerExport {
    #[serde(default)]
    pub accounts: Vec<AccountBalance>,
    #[serde(default)]
    pub transactions: Vec<LedgerTransaction>,
    #[serde(default)]
    pub budgets: Vec<BudgetRecord>,
    #[serde(default)]
    pub fraud_signals: Vec<FraudSignal>,
}

impl LedgerExport {
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self, LedgerImportError> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Append transactions parsed from a CSV export.
    pub fn extend_from_csv<R: Read>(&mut self, reader: R) -> Result<usize, LedgerImportError> {
        let parsed = parse_transactions(reader)?;
        let count = parsed.len();
        self.transactions.extend(parsed);
        Ok(count)
    }

    /// Build the snapshot covering the 90 days up to and including `as_of`.
    ///
    /// Monthly buckets are the three calendar months ending with the month of `as_of`,
    /// restricted to the same 90-day window. Transactions dated after `as_of` are ignored.
    pub fn summarize(&self, as_of: NaiveDate) -> FinancialSnapshot {
        let window_start = as_of - Duration::days(WINDOW_DAYS);
        let windowed: Vec<&LedgerTransaction> = self
            .transactions
            .iter()
            .filter(|tx| tx.date >= window_start && tx.date <= as_of)
            .collect();

        let total_balance = self
            .accounts
            .iter()
            .filter(|account| account.is_active)
            .map(|account| account.current_balance)
            .sum::<f64>();

        let total_spend_90d = debit_total(windowed.iter().copied());
        let total_credits_90d = credit_total(windowed.iter().copied());

        let mut monthly_credits = [0.0; OBSERVATION_MONTHS];
        let mut monthly_debits = [0.0; OBSERVATION_MONTHS];
        let current_month = month_start(as_of);
        for slot in 0..OBSERVATION_MONTHS {
            let months_back = (OBSERVATION_MONTHS - 1 - slot) as u32;
            let Some(start) = current_month.checked_sub_months(Months::new(months_back)) else {
                continue;
            };
            let Some(end) = start.checked_add_months(Months::new(1)) else {
                continue;
            };
            let in_month = || {
                windowed
                    .iter()
                    .copied()
                    .filter(move |tx| tx.date >= start && tx.date < end)
            };
            monthly_credits[slot] = credit_total(in_month());
            monthly_debits[slot] = debit_total(in_month());
        }

        let overdraft_count = windowed.iter().filter(|tx| tx.overdraft).count() as u32;
        let negative_balance_days = if total_balance < 0.0 {
            NEGATIVE_BALANCE_ASSUMED_DAYS
        } else {
            0
        };

        let active_budgets: Vec<&BudgetRecord> = self
            .budgets
            .iter()
            .filter(|budget| budget.is_active_on(as_of))
            .collect();
        let budget_adherence_pct = budget_adherence(
            &active_budgets,
            debit_total(
                windowed
                    .iter()
                    .copied()
                    .filter(|tx| tx.date >= current_month),
            ),
        );

        let mut signals: Vec<&FraudSignal> = self.fraud_signals.iter().collect();
        signals.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let fraud_flags = signals
            .into_iter()
            .take(MAX_FRAUD_SIGNALS)
            .map(FraudFlag::from)
            .collect();

        FinancialSnapshot {
            total_balance,
            transaction_count_90d: windowed.len() as u32,
            total_spend_90d,
            total_credits_90d,
            monthly_credits,
            monthly_debits,
            overdraft_count,
            negative_balance_days,
            budget_count: active_budgets.len() as u32,
            budget_adherence_pct,
            fraud_flags,
        }
    }
}

fn month_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.day0()))
}

fn credit_total<'a>(transactions: impl Iterator<Item = &'a LedgerTransaction>) -> f64 {
    transactions
        .filter(|tx| tx.amount > 0.0)
        .map(|tx| tx.amount)
        .sum()
}

fn debit_total<'a>(transactions: impl Iterator<Item = &'a LedgerTransaction>) -> f64 {
    transactions
        .filter(|tx| tx.amount < 0.0)
        .map(|tx| tx.amount.abs())
        .sum()
}

/// Current-month spend is split evenly across budgets; a budget is kept when its share fits.
fn budget_adherence(budgets: &[&BudgetRecord], month_spend: f64) -> f64 {
    if budgets.is_empty() {
        return 0.0;
    }

    let share = month_spend / budgets.len() as f64;
    let kept = budgets.iter().filter(|budget| share <= budget.amount).count();
    (kept as f64 / budgets.len() as f64 * 100.0).round()
}

/// Parse a `date,amount,account_id,overdraft` CSV export. Only `date` and `amount` are required.
pub fn parse_transactions<R: Read>(reader: R) -> Result<Vec<LedgerTransaction>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut transactions = Vec::new();

    for record in csv_reader.deserialize::<TransactionRow>() {
        let row = record?;
        transactions.push(LedgerTransaction {
            account_id: row.account_id.unwrap_or_default(),
            date: row.date,
            amount: row.amount,
            overdraft: row.overdraft.as_deref().map_or(false, truthy),
        });
    }

    Ok(transactions)
}

#[derive(Debug, Deserialize)]
struct TransactionRow {
    date: NaiveDate,
    amount: f64,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    account_id: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    overdraft: Option<String>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "y"
    )
}

#[derive(Debug, thiserror::Error)]
pub enum LedgerImportError {
    #[error("failed to read ledger export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid ledger CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid ledger JSON data: {0}")]
    Json(#[from] serde_json::Error),
}
