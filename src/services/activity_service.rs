use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use super::location_service::load_location;
use super::{apply_patch, reject_immutable, FieldErrors, ServiceError, ServiceResult};
use crate::database::{Direction, DocumentStore, Query, Repository, TenantScope};
use crate::identity::TenantContext;
use crate::models::activity::{Activity, ActivityStatus};
use crate::models::child::Child;
use crate::types::timestamp;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityInput {
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
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityFilter {
    #[serde(default)]
    pub grupa_id: Option<String>,
    #[serde(default)]
    pub status: Option<ActivityStatus>,
    #[serde(default)]
    pub from: Option<NaiveDate>,
    #[serde(default)]
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct PhotosRequest {
    pub urls: Vec<String>,
}

pub struct ActivityService {
    store: Arc<dyn DocumentStore>,
    scope: TenantScope,
    ctx: TenantContext,
    activities: Repository<Activity>,
}

impl ActivityService {
    pub fn new(store: Arc<dyn DocumentStore>, ctx: TenantContext) -> ServiceResult<Self> {
        let scope = ctx.scope()?;
        let activities = Repository::new(scope.activities()?, store.clone());
        Ok(Self { store, scope, ctx, activities })
    }

    /// Group of the guardian's child; guardians only see that group.
    async fn guardian_group(&self) -> ServiceResult<Option<String>> {
        let Some(cnp) = self.ctx.guardian_child() else {
            return Ok(None);
        };
        let children: Repository<Child> = Repository::new(self.scope.children()?, self.store.clone());
        let child = children
            .find(cnp)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("Child {} not found", cnp)))?;
        Ok(Some(child.grupa_id))
    }

    async fn check_group(&self, grupa_id: &str) -> ServiceResult<()> {
        let location = load_location(&self.store, &self.scope).await?;
        if location.group(grupa_id).is_none() {
            return Err(ServiceError::validation("grupaId", "Unknown group for this location"));
        }
        Ok(())
    }

    pub async fn create(&self, input: ActivityInput) -> ServiceResult<Activity> {
        self.ctx.require_staff_or_owner()?;
        let mut errors = FieldErrors::new();
        errors.require("title", &input.title);
        errors.require("type", &input.kind);
        errors.require("grupaId", &input.grupa_id);
        errors.finish()?;
        self.check_group(&input.grupa_id).await?;

        let now = timestamp::now();
        let activity = Activity {
            id: Uuid::new_v4().to_string(),
            title: input.title.trim().to_string(),
            kind: input.kind.trim().to_string(),
            date: input.date,
            grupa_id: input.grupa_id,
            location: input.location,
            description: input.description,
            materials: input.materials,
            status: input.status,
            participants: input.participants,
            poze: Vec::new(),
            created_by: self.ctx.uid().to_string(),
            created_at: now,
            updated_at: now,
        };
        self.activities.insert(&activity.id, &activity).await?;
        info!("Created activity {} for group {}", activity.id, activity.grupa_id);
        Ok(activity)
    }

    pub async fn get(&self, id: &str) -> ServiceResult<Activity> {
        let activity = self
            .activities
            .find(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("Activity '{}' not found", id)))?;
        if let Some(group) = self.guardian_group().await? {
            if activity.grupa_id != group {
                return Err(ServiceError::forbidden("Activity belongs to another group"));
            }
        }
        Ok(activity)
    }

    pub async fn list(&self, mut filter: ActivityFilter) -> ServiceResult<Vec<Activity>> {
        if let Some(group) = self.guardian_group().await? {
            filter.grupa_id = Some(group);
        }

        let mut query = Query::new().order_by("date", Direction::Asc);
        if let Some(grupa_id) = &filter.grupa_id {
            query = query.where_eq("grupaId", grupa_id.as_str());
        }
        if let Some(status) = filter.status {
            query = query.where_eq("status", serde_json::to_value(status).map_err(crate::database::StoreError::from)?);
        }

        // Dates are not document ids here, so the range is applied after the listing.
        Ok(self
            .activities
            .list(&query)
            .await?
            .into_iter()
            .filter(|a| filter.from.map_or(true, |from| a.date >= from))
            .filter(|a| filter.to.map_or(true, |to| a.date <= to))
            .collect())
    }

    pub async fn update(&self, id: &str, patch: Value) -> ServiceResult<Activity> {
        self.ctx.require_staff_or_owner()?;
        reject_immutable(&patch, &["id", "createdBy", "createdAt", "updatedAt", "poze"])?;
        let patch = patch.as_object().cloned().unwrap_or_default();

        let current = self
            .activities
            .find(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("Activity '{}' not found", id)))?;
        let mut activity = apply_patch(&current, &patch)?;

        let mut errors = FieldErrors::new();
        errors.require("title", &activity.title);
        errors.require("type", &activity.kind);
        errors.finish()?;
        if activity.grupa_id != current.grupa_id {
            self.check_group(&activity.grupa_id).await?;
        }

        activity.updated_at = timestamp::now();
        self.activities.upsert(id, &activity).await?;
        Ok(activity)
    }

    /// Appends photo URLs from external storage, skipping ones already attached.
    pub async fn add_photos(&self, id: &str, urls: Vec<String>) -> ServiceResult<Activity> {
        self.ctx.require_staff_or_owner()?;
        let mut activity = self.get(id).await?;
        for url in urls.into_iter().map(|u| u.trim().to_string()).filter(|u| !u.is_empty()) {
            if !activity.poze.contains(&url) {
                activity.poze.push(url);
            }
        }
        let patch = json!({ "poze": activity.poze, "updatedAt": timestamp::format(&timestamp::now()) });
        Ok(self.activities.merge(id, patch).await?)
    }

    pub async fn delete(&self, id: &str) -> ServiceResult<()> {
        self.ctx.require_staff_or_owner()?;
        if !self.activities.delete(id).await? {
            return Err(ServiceError::not_found(format!("Activity '{}' not found", id)));
        }
        info!("Deleted activity {}", id);
        Ok(())
    }
}
