use serde::{Deserialize, Serialize};

use super::domain::{Impact, ReasonCode};

/// Version of the reason code table. Codes are never renumbered within a version.
pub const CATALOG_VERSION: &str = "1.0.0";

/// Catalog keys. Prefixes group codes by domain: `I` income, `S` spending, `C` cashflow,
/// `F` fraud, `D` fallback. The `0xx` range is favourable, `1xx` adverse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReasonCodeKey {
    IncomeSufficient,
    LowDti,
    StableCashflow,
    PositiveSavings,
    BudgetDiscipline,
    NoFraudFlags,
    IncomeInsufficient,
    HighDti,
    UnstableCashflow,
    HighSpendRate,
    OverdraftHistory,
    NegativeBalance,
    FraudFlagLow,
    FraudFlagMedium,
    FraudFlagHigh,
    FraudFlagCritical,
    LimitedHistory,
    Default,
}

/// One row of the reason code table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub key: ReasonCodeKey,
    pub code: &'static str,
    pub description: &'static str,
    pub impact: Impact,
}

const fn entry(
    key: ReasonCodeKey,
    code: &'static str,
    description: &'static str,
    impact: Impact,
) -> CatalogEntry {
    CatalogEntry {
        key,
        code,
        description,
        impact,
    }
}

// Ordered exactly like `ReasonCodeKey` so a key's discriminant indexes its row.
static CATALOG: [CatalogEntry; 18] = [
    entry(
        ReasonCodeKey::IncomeSufficient,
        "I001",
        "Monthly income meets minimum threshold",
        Impact::Positive,
    ),
    entry(
        ReasonCodeKey::LowDti,
        "I002",
        "Debt-to-income ratio within acceptable range",
        Impact::Positive,
    ),
    entry(
        ReasonCodeKey::StableCashflow,
        "C001",
        "Consistent positive cashflow over observation period",
        Impact::Positive,
    ),
    entry(
        ReasonCodeKey::PositiveSavings,
        "S001",
        "Demonstrates savings behavior",
        Impact::Positive,
    ),
    entry(
        ReasonCodeKey::BudgetDiscipline,
        "S002",
        "Budget adherence observed",
        Impact::Positive,
    ),
    entry(
        ReasonCodeKey::NoFraudFlags,
        "F001",
        "No fraud indicators present",
        Impact::Positive,
    ),
    entry(
        ReasonCodeKey::IncomeInsufficient,
        "I101",
        "Monthly income below minimum threshold",
        Impact::Negative,
    ),
    entry(
        ReasonCodeKey::HighDti,
        "I102",
        "Debt-to-income ratio exceeds limit",
        Impact::Negative,
    ),
    entry(
        ReasonCodeKey::UnstableCashflow,
        "C101",
        "High variance in monthly cashflow",
        Impact::Negative,
    ),
    entry(
        ReasonCodeKey::HighSpendRate,
        "S101",
        "Spending rate exceeds income",
        Impact::Negative,
    ),
    entry(
        ReasonCodeKey::OverdraftHistory,
        "S102",
        "Overdraft activity detected",
        Impact::Negative,
    ),
    entry(
        ReasonCodeKey::NegativeBalance,
        "C102",
        "Negative balance days in observation period",
        Impact::Negative,
    ),
    entry(
        ReasonCodeKey::FraudFlagLow,
        "F101",
        "Low-severity fraud flag present",
        Impact::Negative,
    ),
    entry(
        ReasonCodeKey::FraudFlagMedium,
        "F102",
        "Medium-severity fraud flag present",
        Impact::Negative,
    ),
    entry(
        ReasonCodeKey::FraudFlagHigh,
        "F103",
        "High-severity fraud flag present",
        Impact::Negative,
    ),
    entry(
        ReasonCodeKey::FraudFlagCritical,
        "F104",
        "Critical fraud flag - application declined",
        Impact::Negative,
    ),
    entry(
        ReasonCodeKey::LimitedHistory,
        "C103",
        "Insufficient transaction history",
        Impact::Negative,
    ),
    entry(
        ReasonCodeKey::Default,
        "D000",
        "Standard eligibility assessment",
        Impact::Neutral,
    ),
];

/// The full table, in key order.
pub fn catalog() -> &'static [CatalogEntry] {
    &CATALOG
}

impl ReasonCodeKey {
    pub const ALL: [ReasonCodeKey; 18] = [
        ReasonCodeKey::IncomeSufficient,
        ReasonCodeKey::LowDti,
        ReasonCodeKey::StableCashflow,
        ReasonCodeKey::PositiveSavings,
        ReasonCodeKey::BudgetDiscipline,
        ReasonCodeKey::NoFraudFlags,
        ReasonCodeKey::IncomeInsufficient,
        ReasonCodeKey::HighDti,
        ReasonCodeKey::UnstableCashflow,
        ReasonCodeKey::HighSpendRate,
        ReasonCodeKey::OverdraftHistory,
        ReasonCodeKey::NegativeBalance,
        ReasonCodeKey::FraudFlagLow,
        ReasonCodeKey::FraudFlagMedium,
        ReasonCodeKey::FraudFlagHigh,
        ReasonCodeKey::FraudFlagCritical,
        ReasonCodeKey::LimitedHistory,
        ReasonCodeKey::Default,
    ];

    pub fn entry(self) -> &'static CatalogEntry {
        &CATALOG[self as usize]
    }

    pub fn code(self) -> &'static str {
        self.entry().code
    }

    pub fn impact(self) -> Impact {
        self.entry().impact
    }

    /// Reverse lookup from a short code such as `"C103"`.
    pub fn from_code(code: &str) -> Option<Self> {
        CATALOG
            .iter()
            .find(|entry| entry.code == code)
            .map(|entry| entry.key)
    }

    /// Materialise the catalog entry as a result reason code.
    pub fn reason(self) -> ReasonCode {
        let entry = self.entry();
        ReasonCode {
            code: entry.code.to_string(),
            description: entry.description.to_string(),
            impact: entry.impact,
        }
    }

    /// Like [`ReasonCodeKey::reason`] but with contextual text. Blank overrides fall back to
    /// the catalog description; the code and impact always come from the catalog.
    pub fn reason_with(self, description: Option<&str>) -> ReasonCode {
        let mut reason = self.reason();
        if let Some(text) = description.map(str::trim).filter(|text| !text.is_empty()) {
            reason.description = text.to_string();
        }
        reason
    }
}
