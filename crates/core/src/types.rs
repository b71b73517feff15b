/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// User ids are issued by the identity platform as UUIDs.
pub type UserId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Monetary amounts are stored as integer cents.
pub type Cents = i64;

/// Which signals produced an AI-assisted result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreSource {
    /// Keyword and threshold heuristics only (model absent or failed).
    Rules,
    /// Heuristics merged with a model response.
    Combined,
}
