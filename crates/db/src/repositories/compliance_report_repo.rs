//! Repository for the `compliance_validation_reports` and
//! `compliance_certificates` tables.

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::compliance_report::{
    ComplianceCertificateRow, ComplianceReportRow, NewComplianceCertificate, NewComplianceReport,
};

/// Column list for `compliance_validation_reports` queries.
const REPORT_COLUMNS: &str = "report_id, timestamp, team_name, sport, schedule_id, \
    compliant, violation_count, report, created_at";

/// Column list for `compliance_certificates` queries.
const CERTIFICATE_COLUMNS: &str = "certificate_id, report_id, team_name, sport, season, \
    issued_at, issued_by, signature, certificate, created_at";

const INSERT_REPORT: &str = "INSERT INTO compliance_validation_reports
        (report_id, timestamp, team_name, sport, schedule_id,
         compliant, violation_count, report)
     VALUES ($1, $2, $3, $4, $5, $6, $7, $8)";

const INSERT_CERTIFICATE: &str = "INSERT INTO compliance_certificates
        (certificate_id, report_id, team_name, sport, season,
         issued_at, issued_by, signature, certificate)
     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)";

// ---------------------------------------------------------------------------
// ComplianceReportRepo
// ---------------------------------------------------------------------------

/// Append-only storage for validation reports.
pub struct ComplianceReportRepo;

impl ComplianceReportRepo {
    /// Insert a report, returning the stored row.
    pub async fn create(
        pool: &PgPool,
        input: &NewComplianceReport,
    ) -> Result<ComplianceReportRow, sqlx::Error> {
        let query = format!("{INSERT_REPORT} RETURNING {REPORT_COLUMNS}");
        sqlx::query_as::<_, ComplianceReportRow>(&query)
            .bind(input.report_id)
            .bind(input.timestamp)
            .bind(&input.team_name)
            .bind(&input.sport)
            .bind(&input.schedule_id)
            .bind(input.compliant)
            .bind(input.violation_count)
            .bind(&input.report)
            .fetch_one(pool)
            .await
    }

    /// Insert a report and its certificate atomically.
    pub async fn create_with_certificate(
        pool: &PgPool,
        report: &NewComplianceReport,
        certificate: &NewComplianceCertificate,
    ) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query(INSERT_REPORT)
            .bind(report.report_id)
            .bind(report.timestamp)
            .bind(&report.team_name)
            .bind(&report.sport)
            .bind(&report.schedule_id)
            .bind(report.compliant)
            .bind(report.violation_count)
            .bind(&report.report)
            .execute(&mut *tx)
            .await?;

        sqlx::query(INSERT_CERTIFICATE)
            .bind(&certificate.certificate_id)
            .bind(certificate.report_id)
            .bind(&certificate.team_name)
            .bind(&certificate.sport)
            .bind(&certificate.season)
            .bind(certificate.issued_at)
            .bind(&certificate.issued_by)
            .bind(&certificate.signature)
            .bind(&certificate.certificate)
            .execute(&mut *tx)
            .await?;

        tx.commit().await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        report_id: Uuid,
    ) -> Result<Option<ComplianceReportRow>, sqlx::Error> {
        let query = format!(
            "SELECT {REPORT_COLUMNS} FROM compliance_validation_reports WHERE report_id = $1"
        );
        sqlx::query_as::<_, ComplianceReportRow>(&query)
            .bind(report_id)
            .fetch_optional(pool)
            .await
    }

    /// Reports for one schedule, newest first.
    pub async fn list_for_schedule(
        pool: &PgPool,
        schedule_id: &str,
        limit: i64,
    ) -> Result<Vec<ComplianceReportRow>, sqlx::Error> {
        let query = format!(
            "SELECT {REPORT_COLUMNS} FROM compliance_validation_reports
             WHERE schedule_id = $1
             ORDER BY timestamp DESC
             LIMIT $2"
        );
        sqlx::query_as::<_, ComplianceReportRow>(&query)
            .bind(schedule_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}

// ---------------------------------------------------------------------------
// ComplianceCertificateRepo
// ---------------------------------------------------------------------------

pub struct ComplianceCertificateRepo;

impl ComplianceCertificateRepo {
    pub async fn find_by_id(
        pool: &PgPool,
        certificate_id: &str,
    ) -> Result<Option<ComplianceCertificateRow>, sqlx::Error> {
        let query = format!(
            "SELECT {CERTIFICATE_COLUMNS} FROM compliance_certificates WHERE certificate_id = $1"
        );
        sqlx::query_as::<_, ComplianceCertificateRow>(&query)
            .bind(certificate_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_for_report(
        pool: &PgPool,
        report_id: Uuid,
    ) -> Result<Option<ComplianceCertificateRow>, sqlx::Error> {
        let query = format!(
            "SELECT {CERTIFICATE_COLUMNS} FROM compliance_certificates WHERE report_id = $1"
        );
        sqlx::query_as::<_, ComplianceCertificateRow>(&query)
            .bind(report_id)
            .fetch_optional(pool)
            .await
    }
}
