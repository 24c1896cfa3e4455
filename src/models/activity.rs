use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityStatus {
    #[default]
    Planificat,
    Completat,
    Anulat,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub date: NaiveDate,
    pub grupa_id: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub materials: Vec<String>,
    #[serde(default)]
    pub status: ActivityStatus,
    #[serde(default)]
    pub participants: Vec<String>,
    #[serde(default)]
    pub poze: Vec<String>,
    pub created_by: String,
    #[serde(with = "crate::types::timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "crate::types::timestamp")]
    pub updated_at: DateTime<Utc>,
}
