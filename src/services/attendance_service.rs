use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};

use super::location_service::load_location;
use super::{ServiceError, ServiceResult};
use crate::database::{paths, DocumentStore, Query, Repository, StoreError, TenantScope};
use crate::identity::TenantContext;
use crate::types::timestamp;
use crate::models::attendance::{AttendanceRecord, AttendanceStatus, AttendanceSummary, SheetStatus};
use crate::models::child::Child;

/// Hours pre-filled on the group sheet when a child has no record yet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttendanceDefaults {
    pub check_in: NaiveTime,
    pub check_out: NaiveTime,
}

impl Default for AttendanceDefaults {
    fn default() -> Self {
        Self {
            check_in: NaiveTime::from_hms_opt(8, 0, 0).unwrap_or_default(),
            check_out: NaiveTime::from_hms_opt(16, 0, 0).unwrap_or_default(),
        }
    }
}

/// The single place attendance paths are built: `children/{cnp}/attendance/{date}`.
pub struct AttendanceRepository {
    store: Arc<dyn DocumentStore>,
    scope: TenantScope,
}

impl AttendanceRepository {
    pub fn new(store: Arc<dyn DocumentStore>, scope: TenantScope) -> Self {
        Self { store, scope }
    }

    fn records(&self, cnp: &str) -> Result<Repository<AttendanceRecord>, StoreError> {
        Ok(Repository::new(self.scope.attendance(cnp)?, self.store.clone()))
    }

    pub async fn get(&self, cnp: &str, date: NaiveDate) -> Result<Option<AttendanceRecord>, StoreError> {
        self.records(cnp)?.find(&paths::date_key(date)).await
    }

    /// Overwrites any record already stored for that day.
    pub async fn set(&self, cnp: &str, date: NaiveDate, record: &AttendanceRecord) -> Result<(), StoreError> {
        self.records(cnp)?.upsert(&paths::date_key(date), record).await
    }

    /// Inclusive date range, oldest first.
    pub async fn history(&self, cnp: &str, from: NaiveDate, to: NaiveDate) -> Result<Vec<(NaiveDate, AttendanceRecord)>, StoreError> {
        let query = Query::new().id_range(Some(paths::date_key(from)), Some(paths::date_key(to)));
        let records = self.records(cnp)?.list_with_ids(&query).await?;
        Ok(records
            .into_iter()
            .filter_map(|(id, record)| NaiveDate::parse_from_str(&id, "%Y-%m-%d").ok().map(|d| (d, record)))
            .collect())
    }

    pub async fn summary(&self, cnp: &str, from: NaiveDate, to: NaiveDate) -> Result<AttendanceSummary, StoreError> {
        let mut summary = AttendanceSummary::default();
        for (_, record) in self.history(cnp, from, to).await? {
            summary.add(record.status);
        }
        Ok(summary)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkRequest {
    pub status: AttendanceStatus,
    #[serde(default, with = "crate::types::hhmm::option")]
    pub check_in: Option<NaiveTime>,
    #[serde(default, with = "crate::types::hhmm::option")]
    pub check_out: Option<NaiveTime>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetEntry {
    pub cnp: String,
    #[serde(default)]
    pub name: String,
    pub status: SheetStatus,
    #[serde(default, with = "crate::types::hhmm::option")]
    pub check_in: Option<NaiveTime>,
    #[serde(default, with = "crate::types::hhmm::option")]
    pub check_out: Option<NaiveTime>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupSheet {
    pub grupa_id: String,
    pub grupa_nume: String,
    pub date: NaiveDate,
    pub entries: Vec<SheetEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SaveSheetRequest {
    pub entries: Vec<SheetEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SaveSheetOutcome {
    pub written: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub record: AttendanceRecord,
}

pub struct AttendanceService {
    store: Arc<dyn DocumentStore>,
    scope: TenantScope,
    ctx: TenantContext,
    repository: AttendanceRepository,
    defaults: AttendanceDefaults,
}

impl AttendanceService {
    pub fn new(store: Arc<dyn DocumentStore>, ctx: TenantContext, defaults: AttendanceDefaults) -> ServiceResult<Self> {
        let scope = ctx.scope()?;
        let repository = AttendanceRepository::new(store.clone(), scope.clone());
        Ok(Self { store, scope, ctx, repository, defaults })
    }

    async fn require_child(&self, cnp: &str) -> ServiceResult<Child> {
        let children: Repository<Child> = Repository::new(self.scope.children()?, self.store.clone());
        children
            .find(cnp)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("Child {} not found", cnp)))
    }

    fn record(&self, status: AttendanceStatus, check_in: Option<NaiveTime>, check_out: Option<NaiveTime>, notes: Option<String>) -> AttendanceRecord {
        AttendanceRecord {
            status,
            check_in,
            check_out,
            notes: notes.filter(|n| !n.trim().is_empty()),
            marked_by: self.ctx.uid().to_string(),
            marked_by_name: self.ctx.display_name(),
            timestamp: timestamp::now(),
        }
    }

    pub async fn mark(&self, cnp: &str, date: NaiveDate, request: MarkRequest) -> ServiceResult<AttendanceRecord> {
        self.ctx.require_staff_or_owner()?;
        validate_times(request.check_in, request.check_out)?;
        self.require_child(cnp).await?;

        let record = self.record(request.status, request.check_in, request.check_out, request.notes);
        self.repository.set(cnp, date, &record).await?;
        info!("Marked {} {:?} on {}", cnp, record.status, date);
        Ok(record)
    }

    pub async fn get(&self, cnp: &str, date: NaiveDate) -> ServiceResult<AttendanceRecord> {
        self.ctx.ensure_child_visible(cnp)?;
        self.repository
            .get(cnp, date)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("No attendance for {} on {}", cnp, date)))
    }

    pub async fn history(&self, cnp: &str, from: NaiveDate, to: NaiveDate) -> ServiceResult<Vec<HistoryEntry>> {
        self.ctx.ensure_child_visible(cnp)?;
        if from > to {
            return Err(ServiceError::validation("from", "Start date is after end date"));
        }
        Ok(self
            .repository
            .history(cnp, from, to)
            .await?
            .into_iter()
            .map(|(date, record)| HistoryEntry { date, record })
            .collect())
    }

    pub async fn summary(&self, cnp: &str, from: NaiveDate, to: NaiveDate) -> ServiceResult<AttendanceSummary> {
        self.ctx.ensure_child_visible(cnp)?;
        Ok(self.repository.summary(cnp, from, to).await?)
    }

    /// Every child of the group for one day, pre-filled from stored records.
    pub async fn group_sheet(&self, grupa_id: &str, date: NaiveDate) -> ServiceResult<GroupSheet> {
        self.ctx.require_staff_or_owner()?;
        let location = load_location(&self.store, &self.scope).await?;
        let group = location
            .group(grupa_id)
            .ok_or_else(|| ServiceError::not_found(format!("Group '{}' not found", grupa_id)))?;

        let children: Repository<Child> = Repository::new(self.scope.children()?, self.store.clone());
        let mut members = children.list(&Query::new().where_eq("grupaId", grupa_id)).await?;
        members.sort_by(|a, b| a.full_name().cmp(&b.full_name()));

        let mut entries = Vec::with_capacity(members.len());
        for child in members {
            let entry = match self.repository.get(&child.cnp, date).await? {
                Some(record) => SheetEntry {
                    name: child.full_name(),
                    cnp: child.cnp,
                    status: record.status.into(),
                    check_in: record.check_in,
                    check_out: record.check_out,
                    notes: record.notes,
                },
                None => SheetEntry {
                    name: child.full_name(),
                    cnp: child.cnp,
                    status: SheetStatus::NotMarked,
                    check_in: Some(self.defaults.check_in),
                    check_out: Some(self.defaults.check_out),
                    notes: None,
                },
            };
            entries.push(entry);
        }

        Ok(GroupSheet {
            grupa_id: group.id.clone(),
            grupa_nume: group.nume.clone(),
            date,
            entries,
        })
    }

    /// One independent write per marked entry, in order. Every marked CNP must
    /// be enrolled before anything is written. The first failed write stops
    /// the loop; documents already written stay as they are.
    pub async fn save_sheet(&self, date: NaiveDate, entries: Vec<SheetEntry>) -> ServiceResult<SaveSheetOutcome> {
        self.ctx.require_staff_or_owner()?;
        for entry in &entries {
            validate_times(entry.check_in, entry.check_out)?;
        }

        let marked: Vec<(SheetEntry, AttendanceStatus)> = entries
            .iter()
            .filter_map(|e| e.status.marked().map(|status| (e.clone(), status)))
            .collect();
        let skipped = entries.len() - marked.len();
        let total = marked.len();

        let enrolled: HashSet<String> = self
            .store
            .list(&self.scope.children()?, &Query::new())
            .await?
            .iter()
            .map(|doc| doc.id().to_string())
            .collect();
        let unknown: Vec<&str> = marked
            .iter()
            .map(|(entry, _)| entry.cnp.as_str())
            .filter(|cnp| !enrolled.contains(*cnp))
            .collect();
        if !unknown.is_empty() {
            return Err(ServiceError::validation(
                "entries",
                format!("Not enrolled in this location: {}", unknown.join(", ")),
            ));
        }

        let mut written = 0;
        for (entry, status) in marked {
            let record = self.record(status, entry.check_in, entry.check_out, entry.notes);
            if let Err(source) = self.repository.set(&entry.cnp, date, &record).await {
                warn!(
                    "Attendance save for {} stopped at {} after {}/{} writes",
                    date, entry.cnp, written, total
                );
                return Err(ServiceError::PartialWrite { written, total, source });
            }
            written += 1;
        }

        info!("Saved attendance sheet for {}: {} written, {} not marked", date, written, skipped);
        Ok(SaveSheetOutcome { written, skipped })
    }
}

fn validate_times(check_in: Option<NaiveTime>, check_out: Option<NaiveTime>) -> ServiceResult<()> {
    if let (Some(start), Some(end)) = (check_in, check_out) {
        if end < start {
            return Err(ServiceError::validation("checkOut", "Check-out is before check-in"));
        }
    }
    Ok(())
}
