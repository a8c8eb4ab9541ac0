//! Cash-flow based credit eligibility.
//!
//! Raw account history is summarised into a [`FinancialSnapshot`], normalised into an
//! [`EligibilityInput`] feature set, and scored by the [`ScoringEngine`] into an auditable
//! [`EligibilityResult`]. The [`EligibilityService`] wires a data provider and a best-effort
//! result sink around that pure core.

pub mod adapters;
pub mod domain;
pub mod features;
pub mod ledger;
pub mod quote;
pub mod reason_codes;
pub mod repository;
pub(crate) mod scoring;
pub mod service;

#[cfg(test)]
mod tests;

pub use adapters::{
    InMemoryResultSink, JsonLinesResultSink, LedgerDataProvider, StaticSnapshotProvider,
};
pub use domain::{
    CashflowStability, EligibilityInput, EligibilityResult, FraudFlag, FraudSeverity, Impact,
    LoanDecision, ReasonCode, ScoreFactors, ScoreWeights, SpendingBehavior, SubjectId,
};
pub use features::{aggregate, FinancialSnapshot};
pub use ledger::{
    AccountBalance, BudgetRecord, FraudSignal, LedgerExport, LedgerImportError,
    LedgerTransaction,
};
pub use quote::{quote_against, LoanQuote, QuoteError, DEFAULT_APR_PCT};
pub use reason_codes::{catalog, CatalogEntry, ReasonCodeKey, CATALOG_VERSION};
pub use repository::{
    EligibilityRecord, FinancialDataProvider, ProviderError, ResultSink, SinkError,
};
pub use scoring::{
    score, score_eligibility, FraudPenaltyPoints, LimitPolicy, ScoringConfig, ScoringEngine,
};
pub use service::{EligibilityService, EligibilityServiceError};
