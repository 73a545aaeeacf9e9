//! Repository layer.

pub mod compliance_report_repo;

pub use compliance_report_repo::{ComplianceCertificateRepo, ComplianceReportRepo};
