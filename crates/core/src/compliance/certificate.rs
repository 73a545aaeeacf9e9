//! Compliance certificates for fully compliant schedules.
//!
//! The signature is the SHA-256 hex digest of the certificate body
//! serialized as JSON with sorted keys. Everything except `signature` and
//! `error` is covered.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::hashing::sha256_hex;
use crate::types::Timestamp;

use super::report::ViolationReport;
use super::schedule::Schedule;

/// Issuer recorded on certificates unless configured otherwise.
pub const DEFAULT_ISSUER: &str = "Fairplay Compliance Engine";

/// Prefix of every certificate id.
pub const CERTIFICATE_ID_PREFIX: &str = "CERT-";

/// A rule the schedule was checked against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertifiedRule {
    pub tier_name: String,
    pub rule_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceCertificate {
    pub id: String,
    pub team: String,
    pub sport: String,
    pub season: String,
    pub schedule_id: String,
    pub report_id: Uuid,
    pub issued_at: Timestamp,
    pub issued_by: String,
    pub validated_rules: Vec<CertifiedRule>,
    pub signature: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Signed fields of a certificate.
#[derive(Serialize)]
struct CertificateBody<'a> {
    id: &'a str,
    team: &'a str,
    sport: &'a str,
    season: &'a str,
    schedule_id: &'a str,
    report_id: &'a Uuid,
    issued_at: &'a Timestamp,
    issued_by: &'a str,
    validated_rules: &'a [CertifiedRule],
}

impl ComplianceCertificate {
    fn body(&self) -> CertificateBody<'_> {
        CertificateBody {
            id: &self.id,
            team: &self.team,
            sport: &self.sport,
            season: &self.season,
            schedule_id: &self.schedule_id,
            report_id: &self.report_id,
            issued_at: &self.issued_at,
            issued_by: &self.issued_by,
            validated_rules: &self.validated_rules,
        }
    }

    /// Digest of the signed fields as they are now.
    pub fn compute_signature(&self) -> Result<String, serde_json::Error> {
        // Round-trip through `Value` so object keys come out sorted.
        let canonical = serde_json::to_value(self.body())?;
        Ok(sha256_hex(&serde_json::to_vec(&canonical)?))
    }

    /// Whether the stored signature still matches the signed fields.
    pub fn verify(&self) -> bool {
        self.error.is_none()
            && !self.signature.is_empty()
            && self
                .compute_signature()
                .is_ok_and(|expected| expected == self.signature)
    }
}

/// Issues certificates for compliant reports.
#[derive(Debug, Clone)]
pub struct Certifier {
    issued_by: String,
}

impl Default for Certifier {
    fn default() -> Self {
        Self::new(DEFAULT_ISSUER)
    }
}

impl Certifier {
    pub fn new(issued_by: impl Into<String>) -> Self {
        Self {
            issued_by: issued_by.into(),
        }
    }

    pub fn issued_by(&self) -> &str {
        &self.issued_by
    }

    /// Build and sign a certificate. Signing failures are recorded on the
    /// certificate instead of being returned.
    pub fn certify(&self, schedule: &Schedule, report: &ViolationReport) -> ComplianceCertificate {
        let mut certificate = ComplianceCertificate {
            id: format!("{CERTIFICATE_ID_PREFIX}{}", Uuid::new_v4()),
            team: schedule.team.name.clone(),
            sport: schedule.sport.clone(),
            season: schedule.season.clone(),
            schedule_id: schedule.id.clone(),
            report_id: report.report_id,
            issued_at: chrono::Utc::now(),
            issued_by: self.issued_by.clone(),
            validated_rules: report
                .results
                .iter()
                .map(|r| CertifiedRule {
                    tier_name: r.tier_name.clone(),
                    rule_name: r.rule_name.clone(),
                })
                .collect(),
            signature: String::new(),
            error: None,
        };

        match certificate.compute_signature() {
            Ok(signature) => certificate.signature = signature,
            Err(e) => {
                tracing::error!(
                    certificate_id = %certificate.id,
                    schedule_id = %schedule.id,
                    error = %e,
                    "Failed to sign compliance certificate",
                );
                certificate.error = Some(format!("Certificate signing failed: {e}"));
            }
        }

        certificate
    }
}
