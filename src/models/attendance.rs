use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Medical,
    Vacation,
}

/// Status shown on the group sheet; `NotMarked` is never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SheetStatus {
    Present,
    Absent,
    Medical,
    Vacation,
    NotMarked,
}

impl From<AttendanceStatus> for SheetStatus {
    fn from(status: AttendanceStatus) -> Self {
        match status {
            AttendanceStatus::Present => SheetStatus::Present,
            AttendanceStatus::Absent => SheetStatus::Absent,
            AttendanceStatus::Medical => SheetStatus::Medical,
            AttendanceStatus::Vacation => SheetStatus::Vacation,
        }
    }
}

impl SheetStatus {
    pub fn marked(&self) -> Option<AttendanceStatus> {
        match self {
            SheetStatus::Present => Some(AttendanceStatus::Present),
            SheetStatus::Absent => Some(AttendanceStatus::Absent),
            SheetStatus::Medical => Some(AttendanceStatus::Medical),
            SheetStatus::Vacation => Some(AttendanceStatus::Vacation),
            SheetStatus::NotMarked => None,
        }
    }
}

/// `children/{cnp}/attendance/{YYYY-MM-DD}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub status: AttendanceStatus,
    #[serde(default, with = "crate::types::hhmm::option")]
    pub check_in: Option<NaiveTime>,
    #[serde(default, with = "crate::types::hhmm::option")]
    pub check_out: Option<NaiveTime>,
    #[serde(default)]
    pub notes: Option<String>,
    pub marked_by: String,
    #[serde(default)]
    pub marked_by_name: Option<String>,
    #[serde(with = "crate::types::timestamp")]
    pub timestamp: DateTime<Utc>,
}

/// Per-status day counts for one child over a period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceSummary {
    pub present: u32,
    pub absent: u32,
    pub medical: u32,
    pub vacation: u32,
}

impl AttendanceSummary {
    pub fn add(&mut self, status: AttendanceStatus) {
        match status {
            AttendanceStatus::Present => self.present += 1,
            AttendanceStatus::Absent => self.absent += 1,
            AttendanceStatus::Medical => self.medical += 1,
            AttendanceStatus::Vacation => self.vacation += 1,
        }
    }

    pub fn marked_days(&self) -> u32 {
        self.present + self.absent + self.medical + self.vacation
    }
}
