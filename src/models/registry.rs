use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// `accounts/{uid}` - login credentials
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub uid: String,
    pub email: String,
    pub display_name: String,
    pub password_salt: String,
    pub password_hash: String,
    #[serde(with = "crate::types::timestamp")]
    pub created_at: DateTime<Utc>,
}

/// `educatoare/{uid}` - staff member bound to one location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffRecord {
    pub organization_id: String,
    pub location_id: String,
    #[serde(default)]
    pub grupa_id: Option<String>,
    pub name: String,
    pub email: String,
}

/// `parinti/{uid}` - guardian bound to one child
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuardianRecord {
    pub organization_id: String,
    pub location_id: String,
    pub copil_cnp: String,
    pub name: String,
    pub email: String,
}
