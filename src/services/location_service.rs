use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use super::{apply_patch, reject_immutable, FieldErrors, ServiceError, ServiceResult};
use crate::database::{paths, DocumentStore, Query, Repository, TenantScope};
use crate::identity::TenantContext;
use crate::types::timestamp;
use crate::models::location::{Group, Location};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLocationRequest {
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub capacity: Option<u32>,
    #[serde(default)]
    pub program: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupRequest {
    #[serde(default)]
    pub nume: Option<String>,
    #[serde(default)]
    pub emoji: Option<String>,
    #[serde(default)]
    pub varsta: Option<String>,
    #[serde(default)]
    pub capacitate: Option<u32>,
    #[serde(default)]
    pub educatori: Option<Vec<String>>,
    #[serde(default)]
    pub sala: Option<String>,
}

/// Loads the location document a scope points at.
pub async fn load_location(store: &Arc<dyn DocumentStore>, scope: &TenantScope) -> ServiceResult<Location> {
    let path = scope.location()?;
    let doc = store
        .get(&path)
        .await?
        .ok_or_else(|| ServiceError::not_found(format!("Location '{}' not found", scope.location_id())))?;
    Ok(serde_json::from_value(Value::Object(doc.data)).map_err(crate::database::StoreError::from)?)
}

pub struct LocationService {
    store: Arc<dyn DocumentStore>,
    ctx: TenantContext,
}

impl LocationService {
    pub fn new(store: Arc<dyn DocumentStore>, ctx: TenantContext) -> Self {
        Self { store, ctx }
    }

    fn repository(&self) -> ServiceResult<Repository<Location>> {
        Ok(Repository::new(paths::locations(self.ctx.organization_id())?, self.store.clone()))
    }

    /// Location of the caller (any role).
    pub async fn current(&self) -> ServiceResult<Location> {
        load_location(&self.store, &self.ctx.scope()?).await
    }

    pub async fn list(&self) -> ServiceResult<Vec<Location>> {
        self.ctx.require_owner()?;
        Ok(self.repository()?.list(&Query::new()).await?)
    }

    pub async fn get(&self, location_id: &str) -> ServiceResult<Location> {
        load_location(&self.store, &self.ctx.scope_for(location_id)?).await
    }

    pub async fn create(&self, request: CreateLocationRequest) -> ServiceResult<Location> {
        self.ctx.require_owner()?;
        let mut errors = FieldErrors::new();
        errors.require("name", &request.name);
        errors.finish()?;

        let location = Location {
            id: Uuid::new_v4().to_string(),
            name: request.name.trim().to_string(),
            address: request.address,
            capacity: request.capacity,
            program: request.program,
            grupe: Vec::new(),
            created_at: timestamp::now(),
        };
        self.repository()?.insert(&location.id, &location).await?;
        info!("Created location {} for organization {}", location.id, self.ctx.organization_id());
        Ok(location)
    }

    /// Updates top-level fields; groups go through the group operations.
    pub async fn update(&self, location_id: &str, patch: Value) -> ServiceResult<Location> {
        self.ctx.require_owner()?;
        reject_immutable(&patch, &["id", "grupe", "createdAt"])?;
        let patch = patch.as_object().cloned().unwrap_or_default();

        let current = self.get(location_id).await?;
        let mut location = apply_patch(&current, &patch)?;
        let mut errors = FieldErrors::new();
        errors.require("name", &location.name);
        errors.finish()?;

        location.name = location.name.trim().to_string();
        self.repository()?.upsert(location_id, &location).await?;
        Ok(location)
    }

    pub async fn add_group(&self, location_id: &str, request: GroupRequest) -> ServiceResult<Group> {
        self.ctx.require_owner()?;
        let nume = request.nume.unwrap_or_default();
        let mut errors = FieldErrors::new();
        errors.require("nume", &nume);
        errors.finish()?;

        let mut location = self.get(location_id).await?;
        let group = Group {
            id: Uuid::new_v4().to_string(),
            nume: nume.trim().to_string(),
            emoji: request.emoji,
            varsta: request.varsta,
            capacitate: request.capacitate,
            educatori: request.educatori.unwrap_or_default(),
            sala: request.sala,
        };
        location.grupe.push(group.clone());
        self.save_groups(&location).await?;
        info!("Added group {} ({}) to location {}", group.id, group.nume, location_id);
        Ok(group)
    }

    /// Renames are safe: children reference the group by id.
    pub async fn update_group(&self, location_id: &str, group_id: &str, request: GroupRequest) -> ServiceResult<Group> {
        self.ctx.require_owner()?;
        let mut location = self.get(location_id).await?;
        let group = location
            .grupe
            .iter_mut()
            .find(|g| g.id == group_id)
            .ok_or_else(|| ServiceError::not_found(format!("Group '{}' not found", group_id)))?;

        if let Some(nume) = request.nume {
            if nume.trim().is_empty() {
                return Err(ServiceError::validation("nume", "This field is required"));
            }
            group.nume = nume.trim().to_string();
        }
        if request.emoji.is_some() {
            group.emoji = request.emoji;
        }
        if request.varsta.is_some() {
            group.varsta = request.varsta;
        }
        if request.capacitate.is_some() {
            group.capacitate = request.capacitate;
        }
        if let Some(educatori) = request.educatori {
            group.educatori = educatori;
        }
        if request.sala.is_some() {
            group.sala = request.sala;
        }
        let updated = group.clone();
        self.save_groups(&location).await?;
        Ok(updated)
    }

    pub async fn remove_group(&self, location_id: &str, group_id: &str) -> ServiceResult<()> {
        self.ctx.require_owner()?;
        let scope = self.ctx.scope_for(location_id)?;
        let mut location = load_location(&self.store, &scope).await?;
        if location.group(group_id).is_none() {
            return Err(ServiceError::not_found(format!("Group '{}' not found", group_id)));
        }

        let assigned = self
            .store
            .list(&scope.children()?, &Query::new().where_eq("grupaId", group_id).limit(1))
            .await?;
        if !assigned.is_empty() {
            return Err(ServiceError::conflict("Group still has children assigned; move them first"));
        }

        location.grupe.retain(|g| g.id != group_id);
        self.save_groups(&location).await?;
        info!("Removed group {} from location {}", group_id, location_id);
        Ok(())
    }

    async fn save_groups(&self, location: &Location) -> ServiceResult<()> {
        if let Some(duplicate) = location.duplicate_group_id() {
            return Err(ServiceError::conflict(format!("Duplicate group id '{}'", duplicate)));
        }
        self.repository()?
            .merge(&location.id, json!({ "grupe": location.grupe }))
            .await?;
        Ok(())
    }
}
