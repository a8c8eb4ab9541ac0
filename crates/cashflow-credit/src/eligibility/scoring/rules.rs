use super::super::domain::{
    CashflowStability, FraudFlag, FraudSeverity, ReasonCode, SpendingBehavior,
};
use super::super::features::non_negative;
use super::super::reason_codes::ReasonCodeKey;
use super::config::{FraudPenaltyPoints, ScoringConfig};

const SPENDING_BASE: f64 = 70.0;
const SAVINGS_BONUS_MIN_PCT: f64 = 5.0;
const SAVINGS_BONUS: f64 = 15.0;
const BUDGET_BONUS_MIN_PCT: f64 = 70.0;
const BUDGET_BONUS: f64 = 10.0;
const HIGH_DTI_PENALTY: f64 = 30.0;
const OVERDRAFT_PENALTY: f64 = 20.0;
const OVERDRAFT_MAX_COUNTED: u32 = 3;
const OVERSPEND_PENALTY: f64 = 25.0;

const CASHFLOW_BASE: f64 = 60.0;
const MIN_HISTORY_TRANSACTIONS: u32 = 10;
const LIMITED_HISTORY_PENALTY: f64 = 30.0;
const STABLE_MIN_MONTHS: u32 = 2;
const STABLE_BONUS: f64 = 25.0;
const UNSTABLE_VARIANCE_PCT: f64 = 30.0;
const UNSTABLE_PENALTY: f64 = 20.0;
const NEGATIVE_BALANCE_PENALTY: f64 = 15.0;
const NEGATIVE_BALANCE_MAX_DAYS: u32 = 5;

/// A 0-100 sub-score together with the reasons that explain it.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SubScore {
    pub score: f64,
    pub reasons: Vec<ReasonCode>,
}

impl SubScore {
    fn new(score: f64, reasons: Vec<ReasonCode>) -> Self {
        Self {
            score: clamp_score(score),
            reasons,
        }
    }
}

/// Outcome of the fraud step. A veto ends the pipeline before any sub-score is computed.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum FraudAssessment {
    Vetoed(ReasonCode),
    Penalty {
        points: f64,
        reasons: Vec<ReasonCode>,
    },
}

pub(crate) fn assess_fraud(flags: &[FraudFlag], points: &FraudPenaltyPoints) -> FraudAssessment {
    if flags.is_empty() {
        return FraudAssessment::Penalty {
            points: 0.0,
            reasons: vec![ReasonCodeKey::NoFraudFlags.reason()],
        };
    }

    if let Some(flag) = flags
        .iter()
        .find(|flag| flag.severity == FraudSeverity::Critical)
    {
        return FraudAssessment::Vetoed(
            ReasonCodeKey::FraudFlagCritical.reason_with(flag.description.as_deref()),
        );
    }

    let mut total = 0.0;
    let mut reasons = Vec::new();
    for flag in flags {
        let (weight, key) = match flag.severity {
            FraudSeverity::High => (points.high, Some(ReasonCodeKey::FraudFlagHigh)),
            FraudSeverity::Medium => (points.medium, Some(ReasonCodeKey::FraudFlagMedium)),
            FraudSeverity::Low => (points.low, Some(ReasonCodeKey::FraudFlagLow)),
            FraudSeverity::Unknown => (points.unknown, None),
            FraudSeverity::Critical => continue,
        };
        total += weight;
        if let Some(key) = key {
            reasons.push(key.reason_with(flag.description.as_deref()));
        }
    }

    FraudAssessment::Penalty {
        points: total.min(points.cap),
        reasons,
    }
}

pub(crate) fn income_score(monthly_income: f64, config: &ScoringConfig) -> SubScore {
    let income = non_negative(monthly_income);
    if income >= config.min_income {
        SubScore::new(
            (50.0 + (income - config.min_income) / 100.0).min(100.0),
            vec![ReasonCodeKey::IncomeSufficient.reason()],
        )
    } else {
        SubScore::new(
            (income / config.min_income * 50.0).max(0.0),
            vec![ReasonCodeKey::IncomeInsufficient.reason()],
        )
    }
}

/// Spend as a percentage of income; no income reads as spending all of it.
pub(crate) fn spend_rate_pct(avg_monthly_spend: f64, monthly_income: f64) -> f64 {
    let income = non_negative(monthly_income);
    if income > 0.0 {
        non_negative(avg_monthly_spend) / income * 100.0
    } else {
        100.0
    }
}

pub(crate) fn spending_score(
    spending: &SpendingBehavior,
    monthly_income: f64,
    config: &ScoringConfig,
) -> SubScore {
    let mut score = SPENDING_BASE;
    let mut reasons = Vec::new();

    let spend_rate = spend_rate_pct(spending.avg_monthly_spend, monthly_income);
    if spend_rate <= config.max_dti_pct {
        reasons.push(ReasonCodeKey::LowDti.reason());
    } else {
        reasons.push(ReasonCodeKey::HighDti.reason());
        score -= HIGH_DTI_PENALTY;
    }

    if non_negative(spending.savings_rate_pct) >= SAVINGS_BONUS_MIN_PCT {
        reasons.push(ReasonCodeKey::PositiveSavings.reason());
        score = (score + SAVINGS_BONUS).min(100.0);
    }

    if let Some(adherence) = spending.budget_adherence_pct {
        if non_negative(adherence) >= BUDGET_BONUS_MIN_PCT {
            reasons.push(ReasonCodeKey::BudgetDiscipline.reason());
            score = (score + BUDGET_BONUS).min(100.0);
        }
    }

    let overdrafts = spending.overdraft_count.unwrap_or(0);
    if overdrafts > 0 {
        reasons.push(ReasonCodeKey::OverdraftHistory.reason());
        score -= OVERDRAFT_PENALTY * f64::from(overdrafts.min(OVERDRAFT_MAX_COUNTED));
    }

    // Stacks with the DTI penalty.
    if spend_rate > 100.0 {
        reasons.push(ReasonCodeKey::HighSpendRate.reason());
        score -= OVERSPEND_PENALTY;
    }

    SubScore::new(score, reasons)
}

/// The history / stability / variance checks are first-match-wins in that order. Only the
/// negative balance check applies independently.
pub(crate) fn cashflow_score(stability: &CashflowStability) -> SubScore {
    let mut score = CASHFLOW_BASE;
    let mut reasons = Vec::new();

    if stability.transaction_volume_90d < MIN_HISTORY_TRANSACTIONS {
        reasons.push(ReasonCodeKey::LimitedHistory.reason());
        score -= LIMITED_HISTORY_PENALTY;
    } else if stability.consecutive_positive_months >= STABLE_MIN_MONTHS {
        reasons.push(ReasonCodeKey::StableCashflow.reason());
        score += STABLE_BONUS;
    } else if non_negative(stability.income_variance_pct) > UNSTABLE_VARIANCE_PCT {
        reasons.push(ReasonCodeKey::UnstableCashflow.reason());
        score -= UNSTABLE_PENALTY;
    }

    let negative_days = stability.negative_balance_days.unwrap_or(0);
    if negative_days > 0 {
        reasons.push(ReasonCodeKey::NegativeBalance.reason());
        let counted = negative_days.min(NEGATIVE_BALANCE_MAX_DAYS);
        score -= NEGATIVE_BALANCE_PENALTY * f64::from(counted);
    }

    SubScore::new(score, reasons)
}

pub(crate) fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(reasons: &[ReasonCode]) -> Vec<&str> {
        reasons.iter().map(|reason| reason.code.as_str()).collect()
    }

    #[test]
    fn unknown_severity_adds_points_without_reason() {
        let flags = vec![
            FraudFlag::new("velocity", FraudSeverity::Unknown),
            FraudFlag::new("geo", FraudSeverity::Low),
        ];

        match assess_fraud(&flags, &FraudPenaltyPoints::default()) {
            FraudAssessment::Penalty { points, reasons } => {
                assert_eq!(points, 25.0);
                assert_eq!(keys(&reasons), vec!["F101"]);
            }
            other => panic!("expected penalty, got {other:?}"),
        }
    }

    #[test]
    fn accumulated_penalty_caps_below_veto() {
        let flags = vec![
            FraudFlag::new("a", FraudSeverity::High),
            FraudFlag::new("b", FraudSeverity::High),
            FraudFlag::new("c", FraudSeverity::High),
        ];

        match assess_fraud(&flags, &FraudPenaltyPoints::default()) {
            FraudAssessment::Penalty { points, reasons } => {
                assert_eq!(points, 99.0);
                assert_eq!(reasons.len(), 3);
            }
            other => panic!("expected penalty, got {other:?}"),
        }
    }

    #[test]
    fn critical_flag_vetoes_with_its_own_description() {
        let flags = vec![
            FraudFlag::new("geo", FraudSeverity::Medium),
            FraudFlag::new("synthetic_id", FraudSeverity::Critical)
                .with_description("Identity matched a synthetic profile"),
        ];

        match assess_fraud(&flags, &FraudPenaltyPoints::default()) {
            FraudAssessment::Vetoed(reason) => {
                assert_eq!(reason.code, "F104");
                assert_eq!(reason.description, "Identity matched a synthetic profile");
            }
            other => panic!("expected veto, got {other:?}"),
        }
    }

    #[test]
    fn income_score_scales_on_both_sides_of_minimum() {
        let config = ScoringConfig::default();
        assert_eq!(income_score(1500.0, &config).score, 50.0);
        assert_eq!(income_score(3500.0, &config).score, 70.0);
        assert_eq!(income_score(20_000.0, &config).score, 100.0);
        assert_eq!(income_score(750.0, &config).score, 25.0);
        assert_eq!(income_score(-40.0, &config).score, 0.0);
        assert_eq!(keys(&income_score(750.0, &config).reasons), vec!["I101"]);
    }

    #[test]
    fn spending_penalties_stack_and_clamp() {
        let config = ScoringConfig::default();
        let spending = SpendingBehavior {
            avg_monthly_spend: 3000.0,
            overdraft_count: Some(7),
            ..SpendingBehavior::default()
        };

        let sub = spending_score(&spending, 1000.0, &config);
        // 70 - 30 (dti) - 60 (3 overdrafts counted) - 25 (overspend) clamps to 0
        assert_eq!(sub.score, 0.0);
        assert_eq!(keys(&sub.reasons), vec!["I102", "S102", "S101"]);
    }

    #[test]
    fn spending_bonuses_cap_at_one_hundred() {
        let config = ScoringConfig::default();
        let spending = SpendingBehavior {
            avg_monthly_spend: 400.0,
            savings_rate_pct: 30.0,
            budget_adherence_pct: Some(90.0),
            ..SpendingBehavior::default()
        };

        let sub = spending_score(&spending, 4000.0, &config);
        assert_eq!(sub.score, 95.0);
        assert_eq!(keys(&sub.reasons), vec!["I002", "S001", "S002"]);
    }

    #[test]
    fn zero_income_reads_as_full_spend_rate() {
        assert_eq!(spend_rate_pct(250.0, 0.0), 100.0);
        assert_eq!(spend_rate_pct(250.0, 1000.0), 25.0);
    }

    #[test]
    fn cashflow_branches_are_first_match_wins() {
        let limited = CashflowStability {
            income_variance_pct: 80.0,
            consecutive_positive_months: 3,
            negative_balance_days: None,
            transaction_volume_90d: 5,
        };
        let sub = cashflow_score(&limited);
        assert_eq!(sub.score, 30.0);
        assert_eq!(keys(&sub.reasons), vec!["C103"]);

        let unstable = CashflowStability {
            consecutive_positive_months: 1,
            transaction_volume_90d: 40,
            ..limited.clone()
        };
        let sub = cashflow_score(&unstable);
        assert_eq!(sub.score, 40.0);
        assert_eq!(keys(&sub.reasons), vec!["C101"]);
    }

    #[test]
    fn negative_balance_days_apply_independently() {
        let stability = CashflowStability {
            income_variance_pct: 0.0,
            consecutive_positive_months: 3,
            negative_balance_days: Some(30),
            transaction_volume_90d: 40,
        };

        let sub = cashflow_score(&stability);
        // 60 + 25 - 15 * 5
        assert_eq!(sub.score, 10.0);
        assert_eq!(keys(&sub.reasons), vec!["C001", "C102"]);
    }
}
