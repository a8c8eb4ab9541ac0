mod config;
mod policy;
mod rules;

pub use config::{FraudPenaltyPoints, LimitPolicy, ScoringConfig};

use chrono::{DateTime, Utc};

use super::domain::{EligibilityInput, EligibilityResult, LoanDecision, ScoreFactors};
use super::features::{aggregate, FinancialSnapshot};
use super::reason_codes::ReasonCodeKey;
use rules::{FraudAssessment, SubScore};

/// Stateless evaluator that applies a scoring configuration to a feature set.
#[derive(Debug, Clone, Default)]
pub struct ScoringEngine {
    config: ScoringConfig,
}

impl ScoringEngine {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn score(&self, input: &EligibilityInput) -> EligibilityResult {
        self.score_at(input, Utc::now())
    }

    /// Aggregate a snapshot into features and score them.
    pub fn score_snapshot(
        &self,
        snapshot: &FinancialSnapshot,
        income_override: Option<f64>,
    ) -> EligibilityResult {
        self.score(&aggregate(snapshot, income_override))
    }

    /// Deterministic variant of [`ScoringEngine::score`] with a caller-supplied timestamp.
    pub fn score_at(
        &self,
        input: &EligibilityInput,
        timestamp: DateTime<Utc>,
    ) -> EligibilityResult {
        let config = &self.config;

        let assessment = rules::assess_fraud(&input.fraud_flags, &config.fraud);
        let (fraud_penalty, fraud_reasons) = match assessment {
            FraudAssessment::Vetoed(reason) => {
                return EligibilityResult {
                    risk_score: 100,
                    decision: LoanDecision::Reject,
                    reason_codes: vec![reason],
                    factors: ScoreFactors {
                        income_score: 0.0,
                        spending_score: 0.0,
                        cashflow_score: 0.0,
                        fraud_penalty: config.fraud.veto,
                        weights: config.weights,
                    },
                    recommended_limit: None,
                    model_version: config.model_version.clone(),
                    timestamp,
                };
            }
            FraudAssessment::Penalty { points, reasons } => (points, reasons),
        };

        let income = rules::income_score(input.monthly_income_estimate, config);
        let spending = rules::spending_score(
            &input.spending_behavior,
            input.monthly_income_estimate,
            config,
        );
        let cashflow = rules::cashflow_score(&input.cashflow_stability);

        let risk_score = policy::composite_risk(
            income.score,
            spending.score,
            cashflow.score,
            fraud_penalty,
            &config.weights,
        );
        let decision = policy::decide(risk_score, config);
        let recommended_limit = match decision {
            LoanDecision::Approve => Some(policy::recommended_limit(
                risk_score,
                input.monthly_income_estimate,
                &config.limit,
            )),
            LoanDecision::Reject => None,
        };

        let factors = ScoreFactors {
            income_score: income.score,
            spending_score: spending.score,
            cashflow_score: cashflow.score,
            fraud_penalty,
            weights: config.weights,
        };

        let mut reason_codes = fraud_reasons;
        for SubScore { reasons, .. } in [income, spending, cashflow] {
            reason_codes.extend(reasons);
        }
        if reason_codes.is_empty() {
            reason_codes.push(ReasonCodeKey::Default.reason());
        }

        EligibilityResult {
            risk_score,
            decision,
            reason_codes,
            factors,
            recommended_limit,
            model_version: config.model_version.clone(),
            timestamp,
        }
    }
}

/// Score a feature set with the default model.
pub fn score(input: &EligibilityInput) -> EligibilityResult {
    ScoringEngine::default().score(input)
}

/// Aggregate a snapshot and score it with the given model configuration.
pub fn score_eligibility(
    snapshot: &FinancialSnapshot,
    income_override: Option<f64>,
    config: &ScoringConfig,
) -> EligibilityResult {
    ScoringEngine::new(config.clone()).score_snapshot(snapshot, income_override)
}
