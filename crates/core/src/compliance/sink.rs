//! Where finished reports go.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::PersistenceError;

use super::report::ViolationReport;

/// Persists validation reports (and any attached certificate).
#[async_trait]
pub trait ReportSink: Send + Sync {
    async fn store(&self, report: &ViolationReport) -> Result<(), PersistenceError>;

    /// Short label used in logs.
    fn name(&self) -> &str;
}

/// Keeps reports in memory. Useful for embedding and tests.
#[derive(Debug, Default)]
pub struct MemoryReportSink {
    reports: Mutex<Vec<ViolationReport>>,
}

impl MemoryReportSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies of every stored report, oldest first.
    pub fn reports(&self) -> Vec<ViolationReport> {
        self.reports
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }
}

#[async_trait]
impl ReportSink for MemoryReportSink {
    async fn store(&self, report: &ViolationReport) -> Result<(), PersistenceError> {
        let mut reports = self.reports.lock().unwrap_or_else(|p| p.into_inner());
        if reports.iter().any(|r| r.report_id == report.report_id) {
            return Err(PersistenceError::AlreadyExists(report.report_id.to_string()));
        }
        reports.push(report.clone());
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compliance::testing::schedule;
    use assert_matches::assert_matches;

    #[tokio::test]
    async fn memory_sink_rejects_duplicate_report_ids() {
        let sink = MemoryReportSink::new();
        let report = ViolationReport::from_results(&schedule("football", vec![]), Vec::new());

        sink.store(&report).await.unwrap();
        assert_matches!(
            sink.store(&report).await,
            Err(PersistenceError::AlreadyExists(id)) if id == report.report_id.to_string()
        );
        assert_eq!(sink.reports().len(), 1);
    }
}
