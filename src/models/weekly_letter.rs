use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::database::LetterKind;

/// `weeklyLetters/{weekId}-{monday|friday}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyLetter {
    pub week_id: String,
    pub kind: LetterKind,
    #[serde(default)]
    pub theme: Option<String>,
    /// Planned activities on the Monday letter; the Friday recap reads them.
    #[serde(default)]
    pub activities: Vec<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub ai_generated: bool,
    pub author_id: String,
    #[serde(with = "crate::types::timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "crate::types::timestamp")]
    pub updated_at: DateTime<Utc>,
}
