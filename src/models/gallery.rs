use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryItem {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// `None` means visible to the whole location.
    #[serde(default)]
    pub grupa_id: Option<String>,
    #[serde(default)]
    pub imagini: Vec<String>,
    pub uploaded_by: String,
    #[serde(with = "crate::types::timestamp")]
    pub created_at: DateTime<Utc>,
}
