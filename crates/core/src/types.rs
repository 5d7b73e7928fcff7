/// Job identifiers are opaque UUID v4 tokens minted at submission time.
pub type JobId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
