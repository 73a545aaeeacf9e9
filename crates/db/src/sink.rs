//! [`ReportSink`] implementations backed by Postgres and the filesystem.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use fairplay_core::compliance::{ReportFormatter, ReportSink, ViolationReport};
use fairplay_core::error::PersistenceError;
use sqlx::PgPool;
use tokio::io::AsyncWriteExt;

use crate::models::compliance_report::{NewComplianceCertificate, NewComplianceReport};
use crate::repositories::ComplianceReportRepo;

// ---------------------------------------------------------------------------
// Postgres
// ---------------------------------------------------------------------------

/// Stores reports (and certificates) in `compliance_validation_reports`.
#[derive(Clone)]
pub struct PgReportSink {
    pool: PgPool,
}

impl PgReportSink {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_db_error(report: &ViolationReport, err: sqlx::Error) -> PersistenceError {
    match err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            PersistenceError::AlreadyExists(report.report_id.to_string())
        }
        other => PersistenceError::Database(other.to_string()),
    }
}

#[async_trait]
impl ReportSink for PgReportSink {
    async fn store(&self, report: &ViolationReport) -> Result<(), PersistenceError> {
        let row = NewComplianceReport::from_report(report)?;

        let result = match &report.certificate {
            Some(cert) => {
                let cert_row = NewComplianceCertificate::from_certificate(cert)?;
                ComplianceReportRepo::create_with_certificate(&self.pool, &row, &cert_row).await
            }
            None => ComplianceReportRepo::create(&self.pool, &row).await.map(|_| ()),
        };

        result.map_err(|e| map_db_error(report, e))?;

        tracing::debug!(
            report_id = %report.report_id,
            schedule_id = %report.schedule_id,
            certified = report.certificate.is_some(),
            "Stored compliance report",
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "postgres"
    }
}

// ---------------------------------------------------------------------------
// Filesystem
// ---------------------------------------------------------------------------

/// Writes each report into a directory as
/// `<report_id>.json`, `<report_id>.summary.txt` and, when certified,
/// `<report_id>.certificate.json`.
#[derive(Debug, Clone)]
pub struct FileReportSink {
    dir: PathBuf,
}

impl FileReportSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn report_path(&self, report: &ViolationReport) -> PathBuf {
        self.dir.join(format!("{}.json", report.report_id))
    }

    pub fn certificate_path(&self, report: &ViolationReport) -> PathBuf {
        self.dir.join(format!("{}.certificate.json", report.report_id))
    }

    pub fn summary_path(&self, report: &ViolationReport) -> PathBuf {
        self.dir.join(format!("{}.summary.txt", report.report_id))
    }
}

/// Write `contents` to a file that must not already exist.
async fn write_new(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await?;
    file.write_all(contents).await?;
    file.flush().await
}

#[async_trait]
impl ReportSink for FileReportSink {
    async fn store(&self, report: &ViolationReport) -> Result<(), PersistenceError> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let body = serde_json::to_vec_pretty(report)?;
        let report_path = self.report_path(report);
        write_new(&report_path, &body).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::AlreadyExists {
                PersistenceError::AlreadyExists(report.report_id.to_string())
            } else {
                PersistenceError::Io(e)
            }
        })?;

        if let Some(cert) = &report.certificate {
            let body = serde_json::to_vec_pretty(cert)?;
            tokio::fs::write(self.certificate_path(report), body).await?;
        }

        tokio::fs::write(self.summary_path(report), ReportFormatter::summary(report)).await?;

        tracing::debug!(
            report_id = %report.report_id,
            path = %report_path.display(),
            "Wrote compliance report",
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "file"
    }
}

// ---------------------------------------------------------------------------
// Fan-out
// ---------------------------------------------------------------------------

/// Hands each report to several sinks.
///
/// Every sink is attempted even if an earlier one fails; the first error is
/// returned after all have run.
#[derive(Clone, Default)]
pub struct MultiReportSink {
    sinks: Vec<Arc<dyn ReportSink>>,
}

impl MultiReportSink {
    pub fn new(sinks: Vec<Arc<dyn ReportSink>>) -> Self {
        Self { sinks }
    }

    pub fn push(mut self, sink: Arc<dyn ReportSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

#[async_trait]
impl ReportSink for MultiReportSink {
    async fn store(&self, report: &ViolationReport) -> Result<(), PersistenceError> {
        let mut first_error = None;
        for sink in &self.sinks {
            if let Err(e) = sink.store(report).await {
                tracing::warn!(
                    sink = sink.name(),
                    report_id = %report.report_id,
                    error = %e,
                    "Report sink failed",
                );
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn name(&self) -> &str {
        "multi"
    }
}
