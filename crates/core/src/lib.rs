//! Schedule compliance rule engine.
//!
//! Pure logic only: rule model, normalization, validators, resolution,
//! aggregation and certification. Loading rule sources and persisting
//! reports live in `fairplay-rules` and `fairplay-db`.

pub mod compliance;
pub mod error;
pub mod hashing;
pub mod types;
