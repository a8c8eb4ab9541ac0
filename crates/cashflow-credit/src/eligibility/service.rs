use std::sync::Arc;

use chrono::NaiveDate;
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

use super::domain::{EligibilityResult, SubjectId};
use super::features::aggregate;
use super::repository::{FinancialDataProvider, ProviderError, ResultSink};
use super::scoring::{ScoringConfig, ScoringEngine};

/// Service composing the data provider, scoring engine, and audit sink.
pub struct EligibilityService<P: ?Sized, S: ?Sized> {
    provider: Arc<P>,
    sink: Arc<S>,
    engine: Arc<ScoringEngine>,
    persist_results: bool,
}

impl<P, S> EligibilityService<P, S>
where
    P: FinancialDataProvider + ?Sized + 'static,
    S: ResultSink + ?Sized + 'static,
{
    pub fn new(provider: Arc<P>, sink: Arc<S>, config: ScoringConfig) -> Self {
        Self {
            provider,
            sink,
            engine: Arc::new(ScoringEngine::new(config)),
            persist_results: true,
        }
    }

    /// Toggle whether results are handed to the sink.
    pub fn with_persistence(mut self, persist_results: bool) -> Self {
        self.persist_results = persist_results;
        self
    }

    pub fn engine(&self) -> &ScoringEngine {
        &self.engine
    }

    /// Fetch the subject's snapshot, score it, and record the result.
    ///
    /// Fetch failures propagate and scoring is not attempted. Recording never fails the call:
    /// inside a tokio runtime it runs detached on the blocking pool, otherwise inline with
    /// errors logged and dropped.
    pub fn assess(
        &self,
        subject: &SubjectId,
        as_of: Option<NaiveDate>,
        income_override: Option<f64>,
    ) -> Result<EligibilityResult, EligibilityServiceError> {
        let snapshot = self.provider.fetch(subject, as_of)?;
        let input = aggregate(&snapshot, income_override);
        debug!(
            subject = %subject,
            monthly_income = input.monthly_income_estimate,
            transactions_90d = input.cashflow_stability.transaction_volume_90d,
            fraud_flags = input.fraud_flags.len(),
            "derived eligibility features"
        );

        let result = self.engine.score(&input);
        info!(
            subject = %subject,
            risk_score = result.risk_score,
            decision = %result.decision,
            recommended_limit = ?result.recommended_limit,
            model_version = %result.model_version,
            "scored eligibility"
        );

        if self.persist_results {
            self.dispatch_record(subject, &result);
        }

        Ok(result)
    }

    fn dispatch_record(&self, subject: &SubjectId, result: &EligibilityResult) {
        match Handle::try_current() {
            Ok(handle) => {
                let sink = Arc::clone(&self.sink);
                let subject = subject.clone();
                let result = result.clone();
                let _ = handle.spawn_blocking(move || {
                    record_best_effort(sink.as_ref(), &subject, &result);
                });
            }
            Err(_) => record_best_effort(self.sink.as_ref(), subject, result),
        }
    }
}

fn record_best_effort<S>(sink: &S, subject: &SubjectId, result: &EligibilityResult)
where
    S: ResultSink + ?Sized,
{
    if let Err(err) = sink.record(subject, result) {
        warn!(subject = %subject, error = %err, "failed to persist eligibility result");
    }
}

/// Error raised by the eligibility service.
#[derive(Debug, thiserror::Error)]
pub enum EligibilityServiceError {
    #[error(transparent)]
    Provider(#[from] ProviderError),
}
