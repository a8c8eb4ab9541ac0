use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::reason_codes::ReasonCodeKey;

/// Identifier wrapper for the person being assessed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubjectId(pub String);

impl SubjectId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Severity attached by the upstream fraud-signal source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FraudSeverity {
    Low,
    Medium,
    High,
    Critical,
    /// Any label the scoring model does not recognise.
    #[serde(other)]
    Unknown,
}

/// Fraud indicator read from the fraud-signal source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FraudFlag {
    pub code: String,
    pub severity: FraudSeverity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl FraudFlag {
    pub fn new(code: impl Into<String>, severity: FraudSeverity) -> Self {
        Self {
            code: code.into(),
            severity,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SpendingBehavior {
    pub avg_monthly_spend: f64,
    pub discretionary_spend_pct: f64,
    pub savings_rate_pct: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overdraft_count: Option<u32>,
    /// Absent when the subject has no budgets, which is distinct from 0% adherence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_adherence_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CashflowStability {
    pub income_variance_pct: f64,
    pub consecutive_positive_months: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub negative_balance_days: Option<u32>,
    pub transaction_volume_90d: u32,
}

/// Behavioral feature set consumed by the scoring engine.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EligibilityInput {
    pub monthly_income_estimate: f64,
    pub spending_behavior: SpendingBehavior,
    pub cashflow_stability: CashflowStability,
    #[serde(default)]
    pub fraud_flags: Vec<FraudFlag>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    Positive,
    Negative,
    Neutral,
}

/// Explanation attached to a result. `code` and `impact` always come from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReasonCode {
    pub code: String,
    pub description: String,
    pub impact: Impact,
}

impl ReasonCode {
    pub fn is(&self, key: ReasonCodeKey) -> bool {
        self.code == key.code()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub income: f64,
    pub spending: f64,
    pub cashflow: f64,
}

impl Default for ScoreWeights {
    // Sums to 0.90; the fraud penalty is added unweighted on top.
    fn default() -> Self {
        Self {
            income: 0.30,
            spending: 0.35,
            cashflow: 0.25,
        }
    }
}

/// Full decomposition of a risk score, returned for audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreFactors {
    pub income_score: f64,
    pub spending_score: f64,
    pub cashflow_score: f64,
    pub fraud_penalty: f64,
    pub weights: ScoreWeights,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanDecision {
    Approve,
    Reject,
}

impl LoanDecision {
    pub fn label(self) -> &'static str {
        match self {
            LoanDecision::Approve => "approve",
            LoanDecision::Reject => "reject",
        }
    }
}

impl fmt::Display for LoanDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of one scoring pass. Never mutated after it is returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilityResult {
    pub risk_score: u8,
    pub decision: LoanDecision,
    pub reason_codes: Vec<ReasonCode>,
    pub factors: ScoreFactors,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended_limit: Option<u32>,
    pub model_version: String,
    pub timestamp: DateTime<Utc>,
}

impl EligibilityResult {
    pub fn is_approved(&self) -> bool {
        self.decision == LoanDecision::Approve
    }

    pub fn has_reason(&self, key: ReasonCodeKey) -> bool {
        self.reason_codes.iter().any(|reason| reason.is(key))
    }

    /// Catalog keys of the attached reasons, in the order they were produced.
    pub fn reason_keys(&self) -> Vec<ReasonCodeKey> {
        self.reason_codes
            .iter()
            .filter_map(|reason| ReasonCodeKey::from_code(&reason.code))
            .collect()
    }
}
