use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{EligibilityResult, LoanDecision, SubjectId};
use super::features::FinancialSnapshot;

/// Audit row written for every scored result. Reason codes and factors are stored as JSON
/// text exactly as returned to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilityRecord {
    pub subject_id: SubjectId,
    pub risk_score: u8,
    pub decision: LoanDecision,
    pub reason_codes: String,
    pub factors: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended_limit: Option<u32>,
    pub model_version: String,
    pub scored_at: DateTime<Utc>,
}

impl EligibilityRecord {
    pub fn from_result(
        subject_id: &SubjectId,
        result: &EligibilityResult,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            subject_id: subject_id.clone(),
            risk_score: result.risk_score,
            decision: result.decision,
            reason_codes: serde_json::to_string(&result.reason_codes)?,
            factors: serde_json::to_string(&result.factors)?,
            recommended_limit: result.recommended_limit,
            model_version: result.model_version.clone(),
            scored_at: result.timestamp,
        })
    }
}

/// Source of the financial picture for a subject. An existing subject without accounts
/// yields a zeroed snapshot rather than an error.
pub trait FinancialDataProvider: Send + Sync {
    fn fetch(
        &self,
        subject: &SubjectId,
        as_of: Option<NaiveDate>,
    ) -> Result<FinancialSnapshot, ProviderError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("no financial data for subject {0}")]
    NotFound(SubjectId),
    #[error("financial data unavailable: {0}")]
    Unavailable(String),
}

/// Durable destination for scored results. Writes are best-effort.
pub trait ResultSink: Send + Sync {
    fn record(&self, subject: &SubjectId, result: &EligibilityResult) -> Result<(), SinkError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("result store unavailable: {0}")]
    Unavailable(String),
    #[error("failed to serialise result: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("failed to write result: {0}")]
    Io(#[from] std::io::Error),
}
