use serde::{Deserialize, Serialize};

use super::super::domain::ScoreWeights;

/// Immutable model parameters. `Default` is model version 1.0.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub model_version: String,
    /// Risk scores at or below this value are approved.
    pub approve_threshold: u8,
    pub min_income: f64,
    pub max_dti_pct: f64,
    pub weights: ScoreWeights,
    pub fraud: FraudPenaltyPoints,
    pub limit: LimitPolicy,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            model_version: "1.0.0".to_string(),
            approve_threshold: 60,
            min_income: 1500.0,
            max_dti_pct: 45.0,
            weights: ScoreWeights::default(),
            fraud: FraudPenaltyPoints::default(),
            limit: LimitPolicy::default(),
        }
    }
}

/// Risk points contributed per fraud flag severity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FraudPenaltyPoints {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
    pub unknown: f64,
    /// Ceiling for accumulated points. Kept below `veto` so only a critical flag can reach it.
    pub cap: f64,
    pub veto: f64,
}

impl Default for FraudPenaltyPoints {
    fn default() -> Self {
        Self {
            low: 10.0,
            medium: 25.0,
            high: 40.0,
            unknown: 15.0,
            cap: 99.0,
            veto: 100.0,
        }
    }
}

/// Bounds for the recommended credit line on approval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LimitPolicy {
    /// Share of monthly income that may be extended.
    pub income_share: f64,
    pub floor: f64,
    pub ceiling: f64,
    /// Amount shaved off the ceiling at a risk score of 100.
    pub risk_span: f64,
}

impl Default for LimitPolicy {
    fn default() -> Self {
        Self {
            income_share: 0.25,
            floor: 500.0,
            ceiling: 5000.0,
            risk_span: 3000.0,
        }
    }
}
