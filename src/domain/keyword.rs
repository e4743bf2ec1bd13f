use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Keyword listings never return more than this many rows.
pub const KEYWORD_LIST_LIMIT: u32 = 50;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct KeywordId(pub i64);

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Keyword {
    pub id: KeywordId,
    pub keyword: String,
    pub created_at: DateTime<Utc>,
}
