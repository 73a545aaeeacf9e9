/// All report and certificate timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Game times are schedule-local wall clock; calendar math never crosses time zones.
pub type LocalDateTime = chrono::NaiveDateTime;
