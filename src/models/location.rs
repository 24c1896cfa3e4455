use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A cohort inside a location, embedded in `Location.grupe`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: String,
    pub nume: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub varsta: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacitate: Option<u32>,
    #[serde(default)]
    pub educatori: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sala: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub capacity: Option<u32>,
    #[serde(default)]
    pub program: Option<String>,
    #[serde(default)]
    pub grupe: Vec<Group>,
    #[serde(with = "crate::types::timestamp")]
    pub created_at: DateTime<Utc>,
}

impl Location {
    pub fn group(&self, id: &str) -> Option<&Group> {
        self.grupe.iter().find(|g| g.id == id)
    }

    pub fn group_name(&self, id: &str) -> Option<&str> {
        self.group(id).map(|g| g.nume.as_str())
    }

    /// Returns the first group id that appears more than once.
    pub fn duplicate_group_id(&self) -> Option<&str> {
        let mut seen = HashSet::new();
        self.grupe
            .iter()
            .map(|g| g.id.as_str())
            .find(|id| !seen.insert(*id))
    }
}
