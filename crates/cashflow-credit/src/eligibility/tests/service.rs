use std::sync::Arc;
use std::time::Duration;

use super::common::*;
use crate::eligibility::adapters::{InMemoryResultSink, LedgerDataProvider, StaticSnapshotProvider};
use crate::eligibility::domain::LoanDecision;
use crate::eligibility::reason_codes::ReasonCodeKey;
use crate::eligibility::repository::ProviderError;
use crate::eligibility::scoring::ScoringConfig;
use crate::eligibility::service::{EligibilityService, EligibilityServiceError};

#[test]
fn assess_scores_and_records_the_result() {
    let provider = Arc::new(StaticSnapshotProvider::with_snapshot(
        subject("user-1"),
        steady_snapshot(),
    ));
    let sink = Arc::new(InMemoryResultSink::default());
    let service = EligibilityService::new(provider, sink.clone(), ScoringConfig::default());

    let result = service
        .assess(&subject("user-1"), None, None)
        .expect("assessment succeeds");

    assert_eq!(result.model_version, service.engine().config().model_version);
    assert_eq!(result.decision, LoanDecision::Approve);
    assert_eq!(result.risk_score, 25);
    assert_eq!(result.recommended_limit, Some(875));
    assert!(result.has_reason(ReasonCodeKey::HighDti));
    assert!(result.has_reason(ReasonCodeKey::BudgetDiscipline));

    let records = sink.records();
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.subject_id, subject("user-1"));
    assert_eq!(record.risk_score, 25);
    assert_eq!(record.recommended_limit, Some(875));
    assert_eq!(record.scored_at, result.timestamp);
    let stored_reasons: serde_json::Value =
        serde_json::from_str(&record.reason_codes).expect("reason codes stored as json");
    assert_eq!(
        stored_reasons,
        serde_json::to_value(&result.reason_codes).expect("serialises")
    );
}

#[test]
fn income_override_replaces_derived_income() {
    let provider = Arc::new(StaticSnapshotProvider::with_snapshot(
        subject("user-2"),
        steady_snapshot(),
    ));
    let sink = Arc::new(InMemoryResultSink::default());
    let service = EligibilityService::new(provider, sink, ScoringConfig::default());

    let result = service
        .assess(&subject("user-2"), None, Some(8000.0))
        .expect("assessment succeeds");

    // 50 + (8000 - 1500) / 100
    assert_eq!(result.factors.income_score, 100.0);
    assert!(result.has_reason(ReasonCodeKey::LowDti));
}

#[test]
fn fetch_failures_propagate_without_scoring() {
    let provider = Arc::new(StaticSnapshotProvider::default());
    let sink = Arc::new(InMemoryResultSink::default());
    let service = EligibilityService::new(provider, sink.clone(), ScoringConfig::default());

    match service.assess(&subject("ghost"), None, None) {
        Err(EligibilityServiceError::Provider(ProviderError::NotFound(id))) => {
            assert_eq!(id, subject("ghost"))
        }
        other => panic!("expected not found error, got {other:?}"),
    }
    assert!(sink.records().is_empty());
}

#[test]
fn sink_failures_never_fail_the_assessment() {
    let provider = Arc::new(StaticSnapshotProvider::with_snapshot(
        subject("user-3"),
        steady_snapshot(),
    ));
    let sink = Arc::new(FailingSink::default());
    let service = EligibilityService::new(provider, sink.clone(), ScoringConfig::default());

    let result = service.assess(&subject("user-3"), None, None);

    assert!(result.is_ok());
    assert_eq!(*sink.attempts.lock().expect("attempts mutex poisoned"), 1);
}

#[test]
fn persistence_can_be_disabled() {
    let provider = Arc::new(StaticSnapshotProvider::with_snapshot(
        subject("user-4"),
        steady_snapshot(),
    ));
    let sink = Arc::new(InMemoryResultSink::default());
    let service = EligibilityService::new(provider, sink.clone(), ScoringConfig::default())
        .with_persistence(false);

    service
        .assess(&subject("user-4"), None, None)
        .expect("assessment succeeds");

    assert!(sink.records().is_empty());
}

#[test]
fn ledger_provider_summarises_as_of_the_requested_date() {
    let provider = Arc::new(LedgerDataProvider::default());
    provider.insert(subject("user-5"), sample_ledger());
    let sink = Arc::new(InMemoryResultSink::default());
    let service = EligibilityService::new(provider, sink, ScoringConfig::default());

    let result = service
        .assess(&subject("user-5"), Some(date(2025, 6, 15)), None)
        .expect("assessment succeeds");

    assert_eq!(result.risk_score, 40);
    assert_eq!(result.decision, LoanDecision::Approve);
    assert_eq!(result.recommended_limit, Some(800));
    assert!(result.has_reason(ReasonCodeKey::LimitedHistory));
    assert!(result.has_reason(ReasonCodeKey::OverdraftHistory));
    assert!(!result.has_reason(ReasonCodeKey::BudgetDiscipline));
}

#[tokio::test]
async fn records_detached_inside_a_runtime() {
    let provider = Arc::new(StaticSnapshotProvider::with_snapshot(
        subject("user-6"),
        steady_snapshot(),
    ));
    let sink = Arc::new(InMemoryResultSink::default());
    let service = EligibilityService::new(provider, sink.clone(), ScoringConfig::default());

    let result = service
        .assess(&subject("user-6"), None, None)
        .expect("assessment succeeds");

    for _ in 0..100 {
        if !sink.records().is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    let records = sink.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].risk_score, result.risk_score);
}
