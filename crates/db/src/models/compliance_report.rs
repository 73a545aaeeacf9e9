//! Models for `compliance_validation_reports` and `compliance_certificates`.

use fairplay_core::compliance::{ComplianceCertificate, ViolationReport};
use fairplay_core::types::Timestamp;
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// A stored validation report. The full report is kept as JSONB.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ComplianceReportRow {
    pub report_id: Uuid,
    pub timestamp: Timestamp,
    pub team_name: String,
    pub sport: String,
    pub schedule_id: String,
    pub compliant: bool,
    pub violation_count: i32,
    pub report: serde_json::Value,
    pub created_at: Timestamp,
}

impl ComplianceReportRow {
    /// Decode the stored JSON back into a report.
    pub fn to_report(&self) -> Result<ViolationReport, serde_json::Error> {
        serde_json::from_value(self.report.clone())
    }
}

/// Insert DTO derived from a finished report.
#[derive(Debug, Clone)]
pub struct NewComplianceReport {
    pub report_id: Uuid,
    pub timestamp: Timestamp,
    pub team_name: String,
    pub sport: String,
    pub schedule_id: String,
    pub compliant: bool,
    pub violation_count: i32,
    pub report: serde_json::Value,
}

impl NewComplianceReport {
    pub fn from_report(report: &ViolationReport) -> Result<Self, serde_json::Error> {
        Ok(Self {
            report_id: report.report_id,
            timestamp: report.timestamp,
            team_name: report.team.clone(),
            sport: report.sport.clone(),
            schedule_id: report.schedule_id.clone(),
            compliant: report.compliant,
            violation_count: i32::try_from(report.violation_count).unwrap_or(i32::MAX),
            report: serde_json::to_value(report)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Certificate
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ComplianceCertificateRow {
    pub certificate_id: String,
    pub report_id: Uuid,
    pub team_name: String,
    pub sport: String,
    pub season: String,
    pub issued_at: Timestamp,
    pub issued_by: String,
    pub signature: String,
    pub certificate: serde_json::Value,
    pub created_at: Timestamp,
}

impl ComplianceCertificateRow {
    pub fn to_certificate(&self) -> Result<ComplianceCertificate, serde_json::Error> {
        serde_json::from_value(self.certificate.clone())
    }
}

#[derive(Debug, Clone)]
pub struct NewComplianceCertificate {
    pub certificate_id: String,
    pub report_id: Uuid,
    pub team_name: String,
    pub sport: String,
    pub season: String,
    pub issued_at: Timestamp,
    pub issued_by: String,
    pub signature: String,
    pub certificate: serde_json::Value,
}

impl NewComplianceCertificate {
    pub fn from_certificate(cert: &ComplianceCertificate) -> Result<Self, serde_json::Error> {
        Ok(Self {
            certificate_id: cert.id.clone(),
            report_id: cert.report_id,
            team_name: cert.team.clone(),
            sport: cert.sport.clone(),
            season: cert.season.clone(),
            issued_at: cert.issued_at,
            issued_by: cert.issued_by.clone(),
            signature: cert.signature.clone(),
            certificate: serde_json::to_value(cert)?,
        })
    }
}
