//! Resolves an authenticated principal to its tenant coordinates.
//!
//! Resolution walks an ordered chain of role resolvers (staff registry,
//! guardian registry, owner fallback) and stops at the first match. Nothing
//! is cached; every call re-reads the registries.

pub mod context;
pub mod resolvers;

use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use crate::database::{DocumentStore, StoreError, TenantScope};
use crate::middleware::AuthUser;
use crate::types::Role;

pub use context::TenantContext;
pub use resolvers::{GuardianResolver, OwnerResolver, RoleResolver, StaffResolver};

/// The authenticated account behind a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub uid: String,
    pub email: Option<String>,
}

impl Principal {
    pub fn new(uid: impl Into<String>) -> Self {
        Self { uid: uid.into(), email: None }
    }
}

impl From<&AuthUser> for Principal {
    fn from(user: &AuthUser) -> Self {
        Self {
            uid: user.uid.clone(),
            email: Some(user.email.clone()),
        }
    }
}

/// Where in the document tree a principal's data lives.
///
/// `location_id` may be empty for an owner who has not picked a location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantCoordinates {
    pub role: Role,
    pub organization_id: String,
    pub location_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grupa_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub copil_cnp: Option<String>,
}

impl TenantCoordinates {
    pub fn owner(uid: &str, location_hint: Option<&str>) -> Self {
        Self {
            role: Role::Owner,
            organization_id: uid.to_string(),
            location_id: location_hint.unwrap_or_default().to_string(),
            grupa_id: None,
            copil_cnp: None,
        }
    }

    pub fn has_location(&self) -> bool {
        !self.location_id.is_empty()
    }

    pub(crate) fn scope(&self) -> Result<Option<TenantScope>, StoreError> {
        if !self.has_location() {
            return Ok(None);
        }
        TenantScope::new(&self.organization_id, &self.location_id).map(Some)
    }
}

pub struct IdentityResolver {
    resolvers: Vec<Box<dyn RoleResolver>>,
}

impl IdentityResolver {
    pub fn new(resolvers: Vec<Box<dyn RoleResolver>>) -> Self {
        Self { resolvers }
    }

    /// Staff, then guardian, then owner fallback
    pub fn standard(store: Arc<dyn DocumentStore>) -> Self {
        Self::new(vec![
            Box::new(StaffResolver::new(store.clone())),
            Box::new(GuardianResolver::new(store)),
            Box::new(OwnerResolver),
        ])
    }

    /// `Ok(None)` when there is no principal or no resolver claims it; the
    /// caller decides how to send the user back to login.
    pub async fn resolve(&self, principal: Option<&Principal>, hint: Option<&str>) -> Result<Option<TenantCoordinates>, StoreError> {
        let Some(principal) = principal else {
            return Ok(None);
        };

        for resolver in &self.resolvers {
            if let Some(coordinates) = resolver.try_resolve(principal, hint).await? {
                debug!(
                    "Resolved {} via {} registry in {}/{}",
                    principal.uid,
                    resolver.role().as_str(),
                    coordinates.organization_id,
                    coordinates.location_id
                );
                return Ok(Some(coordinates));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{paths, MemoryDocumentStore};
    use serde_json::json;

    async fn store_with_registries() -> Arc<dyn DocumentStore> {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryDocumentStore::new());
        store
            .set(
                &paths::staff_record("staff-1").unwrap(),
                json!({"organizationId": "org-A", "locationId": "loc-1", "grupaId": "g1", "name": "Ioana", "email": "ioana@x.ro"}),
            )
            .await
            .unwrap();
        store
            .set(
                &paths::guardian_record("parent-1").unwrap(),
                json!({"organizationId": "org-A", "locationId": "loc-2", "copilCnp": "5030615123456", "name": "Mihai", "email": "m@x.ro"}),
            )
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn staff_coordinates_ignore_the_hint() {
        let resolver = IdentityResolver::standard(store_with_registries().await);
        let staff = Principal::new("staff-1");

        for hint in [None, Some(""), Some("loc-9"), Some("org-A")] {
            let coords = resolver.resolve(Some(&staff), hint).await.unwrap().unwrap();
            assert_eq!(coords.role, Role::Staff);
            assert_eq!(coords.organization_id, "org-A");
            assert_eq!(coords.location_id, "loc-1");
            assert_eq!(coords.grupa_id.as_deref(), Some("g1"));
        }
    }

    #[tokio::test]
    async fn owner_coordinates_follow_the_hint() {
        let resolver = IdentityResolver::standard(store_with_registries().await);
        let owner = Principal::new("owner-7");

        let coords = resolver.resolve(Some(&owner), None).await.unwrap().unwrap();
        assert_eq!(coords, TenantCoordinates::owner("owner-7", None));
        assert_eq!(coords.location_id, "");

        let coords = resolver.resolve(Some(&owner), Some("loc-3")).await.unwrap().unwrap();
        assert_eq!(coords.role, Role::Owner);
        assert_eq!(coords.organization_id, "owner-7");
        assert_eq!(coords.location_id, "loc-3");
    }

    #[tokio::test]
    async fn guardians_resolve_to_their_child() {
        let resolver = IdentityResolver::standard(store_with_registries().await);
        let coords = resolver
            .resolve(Some(&Principal::new("parent-1")), Some("loc-1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(coords.role, Role::Guardian);
        assert_eq!(coords.location_id, "loc-2");
        assert_eq!(coords.copil_cnp.as_deref(), Some("5030615123456"));
    }

    #[tokio::test]
    async fn unauthenticated_resolves_to_nothing() {
        let resolver = IdentityResolver::standard(store_with_registries().await);
        assert!(resolver.resolve(None, Some("loc-1")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn chain_without_fallback_can_miss() {
        let store = store_with_registries().await;
        let resolver = IdentityResolver::new(vec![Box::new(StaffResolver::new(store))]);
        assert!(resolver.resolve(Some(&Principal::new("nobody")), None).await.unwrap().is_none());
    }
}
