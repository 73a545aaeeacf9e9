//! Row structs and insert DTOs.

pub mod compliance_report;
