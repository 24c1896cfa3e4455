use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::Role;

/// One message in a staff-guardian conversation.
///
/// `thread_id` is the id of the thread's root message; the root carries its
/// own id there. `thread_count` is only maintained on the root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub thread_id: String,
    pub sender_id: String,
    pub sender_role: Role,
    #[serde(default)]
    pub sender_name: Option<String>,
    pub recipient_id: String,
    pub recipient_role: Role,
    pub subject: String,
    pub body: String,
    #[serde(default)]
    pub child_cnp: Option<String>,
    #[serde(default)]
    pub read: bool,
    #[serde(default, with = "crate::types::timestamp::option")]
    pub read_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub reply_to: Option<String>,
    #[serde(default)]
    pub thread_count: u32,
    #[serde(with = "crate::types::timestamp")]
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn is_root(&self) -> bool {
        self.thread_id == self.id
    }

    pub fn involves(&self, uid: &str) -> bool {
        self.sender_id == uid || self.recipient_id == uid
    }
}
