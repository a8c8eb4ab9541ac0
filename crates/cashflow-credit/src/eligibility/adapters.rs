use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use chrono::{NaiveDate, Utc};

use super::domain::{EligibilityResult, SubjectId};
use super::features::FinancialSnapshot;
use super::ledger::LedgerExport;
use super::repository::{
    EligibilityRecord, FinancialDataProvider, ProviderError, ResultSink, SinkError,
};

/// Serves prepared snapshots keyed by subject; `as_of` is ignored.
#[derive(Debug, Default)]
pub struct StaticSnapshotProvider {
    snapshots: Mutex<HashMap<SubjectId, FinancialSnapshot>>,
}

impl StaticSnapshotProvider {
    pub fn with_snapshot(subject: SubjectId, snapshot: FinancialSnapshot) -> Self {
        let provider = Self::default();
        provider.insert(subject, snapshot);
        provider
    }

    pub fn insert(&self, subject: SubjectId, snapshot: FinancialSnapshot) {
        self.snapshots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(subject, snapshot);
    }
}

impl FinancialDataProvider for StaticSnapshotProvider {
    fn fetch(
        &self,
        subject: &SubjectId,
        _as_of: Option<NaiveDate>,
    ) -> Result<FinancialSnapshot, ProviderError> {
        let guard = self
            .snapshots
            .lock()
            .map_err(|_| ProviderError::Unavailable("snapshot store poisoned".to_string()))?;
        guard
            .get(subject)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound(subject.clone()))
    }
}

/// Summarises registered ledgers on demand. `as_of` defaults to today (UTC).
#[derive(Debug, Default)]
pub struct LedgerDataProvider {
    ledgers: Mutex<HashMap<SubjectId, LedgerExport>>,
}

impl LedgerDataProvider {
    pub fn insert(&self, subject: SubjectId, ledger: LedgerExport) {
        self.ledgers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(subject, ledger);
    }
}

impl FinancialDataProvider for LedgerDataProvider {
    fn fetch(
        &self,
        subject: &SubjectId,
        as_of: Option<NaiveDate>,
    ) -> Result<FinancialSnapshot, ProviderError> {
        let guard = self
            .ledgers
            .lock()
            .map_err(|_| ProviderError::Unavailable("ledger store poisoned".to_string()))?;
        let ledger = guard
            .get(subject)
            .ok_or_else(|| ProviderError::NotFound(subject.clone()))?;
        Ok(ledger.summarize(as_of.unwrap_or_else(|| Utc::now().date_naive())))
    }
}

#[derive(Debug, Default)]
pub struct InMemoryResultSink {
    records: Mutex<Vec<EligibilityRecord>>,
}

impl InMemoryResultSink {
    pub fn records(&self) -> Vec<EligibilityRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ResultSink for InMemoryResultSink {
    fn record(&self, subject: &SubjectId, result: &EligibilityResult) -> Result<(), SinkError> {
        let record = EligibilityRecord::from_result(subject, result)?;
        self.records
            .lock()
            .map_err(|_| SinkError::Unavailable("sink poisoned".to_string()))?
            .push(record);
        Ok(())
    }
}

/// Appends one JSON-encoded [`EligibilityRecord`] per line.
#[derive(Debug)]
pub struct JsonLinesResultSink {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonLinesResultSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ResultSink for JsonLinesResultSink {
    fn record(&self, subject: &SubjectId, result: &EligibilityResult) -> Result<(), SinkError> {
        let mut line = serde_json::to_string(&EligibilityRecord::from_result(subject, result)?)?;
        line.push('\n');

        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| SinkError::Unavailable("audit log lock poisoned".to_string()))?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;
        Ok(())
    }
}
