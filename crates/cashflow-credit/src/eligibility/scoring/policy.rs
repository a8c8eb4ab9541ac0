use super::super::domain::{LoanDecision, ScoreWeights};
use super::super::features::non_negative;
use super::config::{LimitPolicy, ScoringConfig};
use super::rules::clamp_score;

/// Sub-scores measure health, so each is inverted before weighting. The fraud penalty is
/// added after weighting.
pub(crate) fn composite_risk(
    income_score: f64,
    spending_score: f64,
    cashflow_score: f64,
    fraud_penalty: f64,
    weights: &ScoreWeights,
) -> u8 {
    let raw = (100.0 - income_score) * weights.income
        + (100.0 - spending_score) * weights.spending
        + (100.0 - cashflow_score) * weights.cashflow
        + fraud_penalty;

    clamp_score(raw).round() as u8
}

pub(crate) fn decide(risk_score: u8, config: &ScoringConfig) -> LoanDecision {
    if risk_score <= config.approve_threshold {
        LoanDecision::Approve
    } else {
        LoanDecision::Reject
    }
}

/// Smaller of the income-based and risk-based caps, held inside the policy bounds.
/// Non-finite income counts as none, matching the income sub-score.
pub(crate) fn recommended_limit(risk_score: u8, monthly_income: f64, policy: &LimitPolicy) -> u32 {
    let max_by_income = non_negative(monthly_income) * policy.income_share;
    let max_by_risk = policy.ceiling - f64::from(risk_score) / 100.0 * policy.risk_span;
    let limit = max_by_income.min(max_by_risk);

    let bounded = if limit.is_nan() {
        policy.floor
    } else {
        limit.clamp(policy.floor, policy.ceiling)
    };

    bounded.round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_apply_to_inverted_sub_scores() {
        let weights = ScoreWeights::default();
        assert_eq!(composite_risk(100.0, 100.0, 100.0, 0.0, &weights), 0);
        assert_eq!(composite_risk(0.0, 0.0, 0.0, 0.0, &weights), 90);
        assert_eq!(composite_risk(0.0, 0.0, 0.0, 40.0, &weights), 100);
        // 13.5 + 5.25 + 3.75 = 22.5 rounds up
        assert_eq!(composite_risk(55.0, 85.0, 85.0, 0.0, &weights), 23);
    }

    #[test]
    fn threshold_is_inclusive() {
        let config = ScoringConfig::default();
        assert_eq!(decide(60, &config), LoanDecision::Approve);
        assert_eq!(decide(61, &config), LoanDecision::Reject);
    }

    #[test]
    fn limit_respects_income_risk_and_bounds() {
        let policy = LimitPolicy::default();
        assert_eq!(recommended_limit(23, 2000.0, &policy), 500);
        assert_eq!(recommended_limit(20, 1000.0, &policy), 500);
        assert_eq!(recommended_limit(10, 12_000.0, &policy), 3000);
        assert_eq!(recommended_limit(40, 40_000.0, &policy), 3800);
        assert_eq!(recommended_limit(0, 100_000.0, &policy), 5000);
    }

    #[test]
    fn unusable_income_falls_to_the_floor() {
        let policy = LimitPolicy::default();
        assert_eq!(recommended_limit(46, f64::NAN, &policy), 500);
        assert_eq!(recommended_limit(46, f64::INFINITY, &policy), 500);
        assert_eq!(recommended_limit(46, -2000.0, &policy), 500);
    }
}
