use super::{Principal, TenantCoordinates};
use crate::database::TenantScope;
use crate::services::ServiceError;
use crate::types::Role;

/// Resolved identity injected into every protected request
#[derive(Debug, Clone)]
pub struct TenantContext {
    pub principal: Principal,
    pub coordinates: TenantCoordinates,
}

impl TenantContext {
    pub fn new(principal: Principal, coordinates: TenantCoordinates) -> Self {
        Self { principal, coordinates }
    }

    pub fn uid(&self) -> &str {
        &self.principal.uid
    }

    pub fn role(&self) -> Role {
        self.coordinates.role
    }

    pub fn organization_id(&self) -> &str {
        &self.coordinates.organization_id
    }

    pub fn display_name(&self) -> Option<String> {
        self.principal.email.clone()
    }

    /// Location subtree of the caller; owners must have picked a location.
    pub fn scope(&self) -> Result<TenantScope, ServiceError> {
        self.coordinates
            .scope()?
            .ok_or_else(|| ServiceError::bad_request("No location selected; pass ?location=<id>"))
    }

    /// Any location of the owner's own organization.
    pub fn scope_for(&self, location_id: &str) -> Result<TenantScope, ServiceError> {
        self.require_owner()?;
        Ok(TenantScope::new(&self.coordinates.organization_id, location_id)?)
    }

    pub fn require_owner(&self) -> Result<(), ServiceError> {
        match self.role() {
            Role::Owner => Ok(()),
            _ => Err(ServiceError::forbidden("Only the organization owner may do this")),
        }
    }

    pub fn require_staff_or_owner(&self) -> Result<(), ServiceError> {
        match self.role() {
            Role::Owner | Role::Staff => Ok(()),
            Role::Guardian => Err(ServiceError::forbidden("Guardians have read-only access")),
        }
    }

    /// The child a guardian is bound to; `None` for staff and owners.
    pub fn guardian_child(&self) -> Option<&str> {
        match self.role() {
            Role::Guardian => self.coordinates.copil_cnp.as_deref(),
            _ => None,
        }
    }

    pub fn is_guardian(&self) -> bool {
        self.role() == Role::Guardian
    }

    /// Guardians may only see their own child.
    pub fn ensure_child_visible(&self, cnp: &str) -> Result<(), ServiceError> {
        match self.role() {
            Role::Guardian if self.guardian_child() != Some(cnp) => {
                Err(ServiceError::forbidden("Guardians may only access their own child"))
            }
            _ => Ok(()),
        }
    }
}
