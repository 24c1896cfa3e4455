use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MenuStatus {
    #[default]
    Draft,
    Published,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuDay {
    /// Romanian day name, e.g. `LUNI`
    pub day: String,
    #[serde(default)]
    pub breakfast: Option<String>,
    #[serde(default)]
    pub snack: Option<String>,
    #[serde(default)]
    pub lunch: Option<String>,
    #[serde(default)]
    pub afternoon_snack: Option<String>,
}

/// Weekly meal plan. Drafts have no week; publishing binds one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Menu {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub status: MenuStatus,
    #[serde(default)]
    pub days: Vec<MenuDay>,
    #[serde(default)]
    pub html_content: Option<String>,
    #[serde(default)]
    pub ai_generated: bool,
    #[serde(default)]
    pub week_start: Option<NaiveDate>,
    #[serde(default)]
    pub week_end: Option<NaiveDate>,
    #[serde(default)]
    pub week_number: Option<u32>,
    pub created_by: String,
    #[serde(with = "crate::types::timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "crate::types::timestamp")]
    pub updated_at: DateTime<Utc>,
    #[serde(default, with = "crate::types::timestamp::option")]
    pub published_at: Option<DateTime<Utc>>,
}

impl Menu {
    pub fn week(&self) -> Option<(NaiveDate, NaiveDate)> {
        match (self.week_start, self.week_end) {
            (Some(start), Some(end)) => Some((start, end)),
            _ => None,
        }
    }
}
