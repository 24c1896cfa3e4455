use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use super::{Principal, TenantCoordinates};
use crate::database::{paths, DocumentStore, StoreError};
use crate::models::registry::{GuardianRecord, StaffRecord};
use crate::types::Role;

/// One step of the identity chain
#[async_trait]
pub trait RoleResolver: Send + Sync {
    fn role(&self) -> Role;

    async fn try_resolve(&self, principal: &Principal, hint: Option<&str>) -> Result<Option<TenantCoordinates>, StoreError>;
}

/// `educatoare/{uid}`; coordinates are taken verbatim from the record.
pub struct StaffResolver {
    store: Arc<dyn DocumentStore>,
}

impl StaffResolver {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl RoleResolver for StaffResolver {
    fn role(&self) -> Role {
        Role::Staff
    }

    async fn try_resolve(&self, principal: &Principal, _hint: Option<&str>) -> Result<Option<TenantCoordinates>, StoreError> {
        let Some(doc) = self.store.get(&paths::staff_record(&principal.uid)?).await? else {
            return Ok(None);
        };
        let record: StaffRecord = serde_json::from_value(Value::Object(doc.data))?;
        Ok(Some(TenantCoordinates {
            role: Role::Staff,
            organization_id: record.organization_id,
            location_id: record.location_id,
            grupa_id: record.grupa_id,
            copil_cnp: None,
        }))
    }
}

/// `parinti/{uid}`; bound to exactly one child.
pub struct GuardianResolver {
    store: Arc<dyn DocumentStore>,
}

impl GuardianResolver {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl RoleResolver for GuardianResolver {
    fn role(&self) -> Role {
        Role::Guardian
    }

    async fn try_resolve(&self, principal: &Principal, _hint: Option<&str>) -> Result<Option<TenantCoordinates>, StoreError> {
        let Some(doc) = self.store.get(&paths::guardian_record(&principal.uid)?).await? else {
            return Ok(None);
        };
        let record: GuardianRecord = serde_json::from_value(Value::Object(doc.data))?;
        Ok(Some(TenantCoordinates {
            role: Role::Guardian,
            organization_id: record.organization_id,
            location_id: record.location_id,
            grupa_id: None,
            copil_cnp: Some(record.copil_cnp),
        }))
    }
}

/// Fallback: anyone not in a registry owns the organization keyed by their uid.
pub struct OwnerResolver;

#[async_trait]
impl RoleResolver for OwnerResolver {
    fn role(&self) -> Role {
        Role::Owner
    }

    async fn try_resolve(&self, principal: &Principal, hint: Option<&str>) -> Result<Option<TenantCoordinates>, StoreError> {
        Ok(Some(TenantCoordinates::owner(&principal.uid, hint)))
    }
}
