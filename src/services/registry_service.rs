//! Accounts, owner registration and the staff/guardian registries.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use super::location_service::load_location;
use super::{FieldErrors, ServiceError, ServiceResult};
use crate::auth::{generate_jwt, generate_salt, hash_password, verify_password, Claims};
use crate::database::{paths, CollectionPath, DocumentStore, Query, Repository};
use crate::identity::{TenantContext, TenantCoordinates};
use crate::models::child::Child;
use crate::models::organization::{FacilityLabels, FacilityType, Organization};
use crate::models::registry::{Account, GuardianRecord, StaffRecord};
use crate::types::{timestamp, Role};

const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub display_name: Option<String>,
    pub organization_name: String,
    #[serde(default)]
    pub facility_type: FacilityType,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountView {
    pub uid: String,
    pub email: String,
    pub display_name: String,
}

impl From<&Account> for AccountView {
    fn from(account: &Account) -> Self {
        Self {
            uid: account.uid.clone(),
            email: account.email.clone(),
            display_name: account.display_name.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub user: AccountView,
    /// Seconds until the token expires
    pub expires_in: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub location_id: String,
    #[serde(default)]
    pub grupa_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuardianRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub location_id: String,
    pub copil_cnp: String,
}

/// A registry document together with the uid it is keyed by.
#[derive(Debug, Serialize)]
pub struct RegistryEntry<T> {
    pub uid: String,
    #[serde(flatten)]
    pub record: T,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WhoAmI {
    pub uid: String,
    pub email: Option<String>,
    pub role: Role,
    pub coordinates: TenantCoordinates,
    pub organization_name: Option<String>,
    pub facility_type: FacilityType,
    pub labels: FacilityLabels,
}

fn accounts(store: &Arc<dyn DocumentStore>) -> ServiceResult<Repository<Account>> {
    Ok(Repository::new(CollectionPath::root(paths::ACCOUNTS)?, store.clone()))
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

async fn find_account_by_email(store: &Arc<dyn DocumentStore>, email: &str) -> ServiceResult<Option<Account>> {
    let query = Query::new().where_eq("email", normalize_email(email)).limit(1);
    Ok(accounts(store)?.list(&query).await?.into_iter().next())
}

/// Validates credentials and writes a new `accounts/{uid}` document.
async fn create_account(store: &Arc<dyn DocumentStore>, email: &str, password: &str, display_name: &str) -> ServiceResult<Account> {
    let email = normalize_email(email);
    let mut errors = FieldErrors::new();
    if !email.contains('@') || email.starts_with('@') || email.ends_with('@') {
        errors.add("email", "A valid email address is required");
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        errors.add("password", format!("Password must have at least {} characters", MIN_PASSWORD_LEN));
    }
    errors.finish()?;

    if find_account_by_email(store, &email).await?.is_some() {
        return Err(ServiceError::conflict(format!("An account for {} already exists", email)));
    }

    let salt = generate_salt();
    let account = Account {
        uid: Uuid::new_v4().simple().to_string(),
        display_name: if display_name.trim().is_empty() { email.clone() } else { display_name.trim().to_string() },
        email,
        password_hash: hash_password(password, &salt),
        password_salt: salt,
        created_at: timestamp::now(),
    };
    accounts(store)?.insert(&account.uid, &account).await?;
    Ok(account)
}

/// Public registration and login.
pub struct AuthService {
    store: Arc<dyn DocumentStore>,
    jwt_secret: Arc<str>,
    expiry_hours: u64,
}

impl AuthService {
    pub fn new(store: Arc<dyn DocumentStore>, jwt_secret: Arc<str>, expiry_hours: u64) -> Self {
        Self { store, jwt_secret, expiry_hours }
    }

    fn issue(&self, account: &Account) -> ServiceResult<LoginResponse> {
        let claims = Claims::new(&account.uid, &account.email, self.expiry_hours);
        Ok(LoginResponse {
            token: generate_jwt(&claims, &self.jwt_secret)?,
            user: account.into(),
            expires_in: self.expiry_hours * 3600,
        })
    }

    /// Creates an owner account and its organization. The owner's uid is the
    /// organization id.
    pub async fn register_owner(&self, request: RegisterRequest) -> ServiceResult<LoginResponse> {
        let mut errors = FieldErrors::new();
        errors.require("organizationName", &request.organization_name);
        errors.finish()?;

        let display_name = request.display_name.as_deref().unwrap_or_default();
        let account = create_account(&self.store, &request.email, &request.password, display_name).await?;

        let organization = Organization {
            name: request.organization_name.trim().to_string(),
            facility_type: request.facility_type,
            owner_email: account.email.clone(),
            created_at: account.created_at,
        };
        let path = paths::organization(&account.uid)?;
        let body = serde_json::to_value(&organization).map_err(crate::database::StoreError::from)?;
        if let Err(e) = self.store.create(&path, body).await {
            warn!("Account {} created but organization write failed: {}", account.uid, e);
            return Err(e.into());
        }

        info!("Registered owner {} ({:?})", account.uid, organization.facility_type);
        self.issue(&account)
    }

    pub async fn login(&self, request: LoginRequest) -> ServiceResult<LoginResponse> {
        let invalid = || ServiceError::unauthorized("Invalid email or password");
        let account = find_account_by_email(&self.store, &request.email).await?.ok_or_else(invalid)?;
        if !verify_password(&request.password, &account.password_salt, &account.password_hash) {
            return Err(invalid());
        }
        info!("Login for {}", account.uid);
        self.issue(&account)
    }
}

/// Identity summary for the signed-in principal.
pub async fn whoami(store: &Arc<dyn DocumentStore>, ctx: &TenantContext) -> ServiceResult<WhoAmI> {
    let organization = store
        .get(&paths::organization(ctx.organization_id())?)
        .await?
        .map(|doc| serde_json::from_value::<Organization>(serde_json::Value::Object(doc.data)))
        .transpose()
        .map_err(crate::database::StoreError::from)?;
    let facility_type = organization.as_ref().map(|o| o.facility_type).unwrap_or_default();

    Ok(WhoAmI {
        uid: ctx.uid().to_string(),
        email: ctx.principal.email.clone(),
        role: ctx.role(),
        coordinates: ctx.coordinates.clone(),
        organization_name: organization.map(|o| o.name),
        facility_type,
        labels: facility_type.labels(),
    })
}

/// Owner administration of staff and guardian accounts.
pub struct RegistryService {
    store: Arc<dyn DocumentStore>,
    ctx: TenantContext,
    staff: Repository<StaffRecord>,
    guardians: Repository<GuardianRecord>,
}

impl RegistryService {
    pub fn new(store: Arc<dyn DocumentStore>, ctx: TenantContext) -> ServiceResult<Self> {
        ctx.require_owner()?;
        let staff = Repository::new(CollectionPath::root(paths::STAFF_REGISTRY)?, store.clone());
        let guardians = Repository::new(CollectionPath::root(paths::GUARDIAN_REGISTRY)?, store.clone());
        Ok(Self { store, ctx, staff, guardians })
    }

    pub async fn create_staff(&self, request: StaffRequest) -> ServiceResult<RegistryEntry<StaffRecord>> {
        let mut errors = FieldErrors::new();
        errors.require("name", &request.name);
        errors.require("locationId", &request.location_id);
        errors.finish()?;

        let scope = self.ctx.scope_for(&request.location_id)?;
        let location = load_location(&self.store, &scope).await?;
        let grupa_id = request.grupa_id.filter(|g| !g.trim().is_empty());
        if let Some(grupa_id) = &grupa_id {
            if location.group(grupa_id).is_none() {
                return Err(ServiceError::validation("grupaId", "Unknown group for this location"));
            }
        }

        let account = create_account(&self.store, &request.email, &request.password, &request.name).await?;
        let record = StaffRecord {
            organization_id: self.ctx.organization_id().to_string(),
            location_id: request.location_id,
            grupa_id,
            name: account.display_name.clone(),
            email: account.email.clone(),
        };
        self.staff.insert(&account.uid, &record).await?;
        info!("Registered staff {} at {}", account.uid, record.location_id);
        Ok(RegistryEntry { uid: account.uid, record })
    }

    pub async fn create_guardian(&self, request: GuardianRequest) -> ServiceResult<RegistryEntry<GuardianRecord>> {
        let mut errors = FieldErrors::new();
        errors.require("name", &request.name);
        errors.require("locationId", &request.location_id);
        errors.require("copilCnp", &request.copil_cnp);
        errors.finish()?;

        let scope = self.ctx.scope_for(&request.location_id)?;
        let children: Repository<Child> = Repository::new(scope.children()?, self.store.clone());
        if !children.exists(&request.copil_cnp).await? {
            return Err(ServiceError::not_found(format!("Child {} not found in this location", request.copil_cnp)));
        }

        let account = create_account(&self.store, &request.email, &request.password, &request.name).await?;
        let record = GuardianRecord {
            organization_id: self.ctx.organization_id().to_string(),
            location_id: request.location_id,
            copil_cnp: request.copil_cnp,
            name: account.display_name.clone(),
            email: account.email.clone(),
        };
        self.guardians.insert(&account.uid, &record).await?;
        info!("Registered guardian {} for child {}", account.uid, record.copil_cnp);
        Ok(RegistryEntry { uid: account.uid, record })
    }

    fn own_org(&self) -> Query {
        Query::new().where_eq("organizationId", self.ctx.organization_id())
    }

    pub async fn list_staff(&self) -> ServiceResult<Vec<RegistryEntry<StaffRecord>>> {
        let entries = self.staff.list_with_ids(&self.own_org()).await?;
        Ok(entries.into_iter().map(|(uid, record)| RegistryEntry { uid, record }).collect())
    }

    pub async fn list_guardians(&self) -> ServiceResult<Vec<RegistryEntry<GuardianRecord>>> {
        let entries = self.guardians.list_with_ids(&self.own_org()).await?;
        Ok(entries.into_iter().map(|(uid, record)| RegistryEntry { uid, record }).collect())
    }

    /// Removes the registry entry and the login account.
    pub async fn remove_staff(&self, uid: &str) -> ServiceResult<()> {
        match self.staff.find(uid).await? {
            Some(record) if record.organization_id == self.ctx.organization_id() => {}
            _ => return Err(ServiceError::not_found(format!("Staff member '{}' not found", uid))),
        }
        self.staff.delete(uid).await?;
        accounts(&self.store)?.delete(uid).await?;
        info!("Removed staff {}", uid);
        Ok(())
    }

    pub async fn remove_guardian(&self, uid: &str) -> ServiceResult<()> {
        match self.guardians.find(uid).await? {
            Some(record) if record.organization_id == self.ctx.organization_id() => {}
            _ => return Err(ServiceError::not_found(format!("Guardian '{}' not found", uid))),
        }
        self.guardians.delete(uid).await?;
        accounts(&self.store)?.delete(uid).await?;
        info!("Removed guardian {}", uid);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::validate_jwt;
    use crate::identity::{IdentityResolver, Principal};
    use crate::services::child_service::tests::{context, enroll_request, seeded_store, CNP};
    use crate::services::child_service::ChildService;

    const SECRET: &str = "test-secret";

    fn auth(store: &Arc<dyn DocumentStore>) -> AuthService {
        AuthService::new(store.clone(), Arc::from(SECRET), 1)
    }

    fn register(email: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.into(),
            password: "parola-sigura".into(),
            display_name: Some("Elena".into()),
            organization_name: "Grădinița Soare".into(),
            facility_type: FacilityType::Kindergarten,
        }
    }

    #[tokio::test]
    async fn register_then_login() {
        let store = seeded_store().await;
        let auth = auth(&store);
        let registered = auth.register_owner(register("Elena@Example.ro ")).await.unwrap();
        assert_eq!(registered.user.email, "elena@example.ro");
        assert_eq!(registered.expires_in, 3600);

        let claims = validate_jwt(&registered.token, SECRET).unwrap();
        assert_eq!(claims.sub, registered.user.uid);
        assert!(store.get(&paths::organization(&claims.sub).unwrap()).await.unwrap().is_some());

        let login = auth
            .login(LoginRequest { email: "elena@example.ro".into(), password: "parola-sigura".into() })
            .await
            .unwrap();
        assert_eq!(login.user.uid, registered.user.uid);

        let bad = auth.login(LoginRequest { email: "elena@example.ro".into(), password: "gresit!!".into() }).await;
        assert!(matches!(bad, Err(ServiceError::Unauthorized(_))));
        let unknown = auth.login(LoginRequest { email: "nobody@example.ro".into(), password: "parola-sigura".into() }).await;
        assert!(matches!(unknown, Err(ServiceError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn duplicate_and_weak_registrations_are_rejected() {
        let store = seeded_store().await;
        let auth = auth(&store);
        auth.register_owner(register("a@b.ro")).await.unwrap();
        assert!(matches!(auth.register_owner(register("A@B.ro")).await, Err(ServiceError::Conflict { .. })));

        let mut weak = register("c@d.ro");
        weak.password = "short".into();
        assert!(matches!(auth.register_owner(weak).await, Err(ServiceError::Validation { .. })));
    }

    #[tokio::test]
    async fn created_staff_and_guardians_resolve_to_their_tenant() {
        let store = seeded_store().await;
        ChildService::new(store.clone(), context(Role::Owner))
            .unwrap()
            .enroll(enroll_request(CNP, "g1"))
            .await
            .unwrap();
        let registry = RegistryService::new(store.clone(), context(Role::Owner)).unwrap();

        let staff = registry
            .create_staff(StaffRequest {
                email: "ioana@x.ro".into(),
                password: "educatoare1".into(),
                name: "Ioana".into(),
                location_id: "loc".into(),
                grupa_id: Some("g1".into()),
            })
            .await
            .unwrap();
        let guardian = registry
            .create_guardian(GuardianRequest {
                email: "mihai@x.ro".into(),
                password: "parinte123".into(),
                name: "Mihai".into(),
                location_id: "loc".into(),
                copil_cnp: CNP.into(),
            })
            .await
            .unwrap();

        let resolver = IdentityResolver::standard(store.clone());
        let coordinates = resolver.resolve(Some(&Principal::new(staff.uid.clone())), Some("other")).await.unwrap().unwrap();
        assert_eq!(coordinates.role, Role::Staff);
        assert_eq!(coordinates.grupa_id.as_deref(), Some("g1"));
        let coordinates = resolver.resolve(Some(&Principal::new(guardian.uid.clone())), None).await.unwrap().unwrap();
        assert_eq!(coordinates.copil_cnp.as_deref(), Some(CNP));

        assert_eq!(registry.list_staff().await.unwrap().len(), 1);
        registry.remove_guardian(&guardian.uid).await.unwrap();
        assert!(registry.list_guardians().await.unwrap().is_empty());
        assert!(matches!(registry.remove_guardian(&guardian.uid).await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn guardian_needs_an_enrolled_child() {
        let store = seeded_store().await;
        let registry = RegistryService::new(store, context(Role::Owner)).unwrap();
        let result = registry
            .create_guardian(GuardianRequest {
                email: "x@y.ro".into(),
                password: "parinte123".into(),
                name: "X".into(),
                location_id: "loc".into(),
                copil_cnp: CNP.into(),
            })
            .await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
        assert!(matches!(RegistryService::new(seeded_store().await, context(Role::Staff)), Err(ServiceError::Forbidden(_))));
    }

    #[tokio::test]
    async fn whoami_reports_facility_labels() {
        let store = seeded_store().await;
        let mut request = register("h@x.ro");
        request.facility_type = FacilityType::ElderCare;
        let registered = auth(&store).register_owner(request).await.unwrap();

        let ctx = TenantContext::new(
            Principal::new(registered.user.uid.clone()),
            TenantCoordinates::owner(&registered.user.uid, None),
        );
        let me = whoami(&store, &ctx).await.unwrap();
        assert_eq!(me.role, Role::Owner);
        assert_eq!(me.labels.residents, "rezidenți");
        assert_eq!(me.organization_name.as_deref(), Some("Grădinița Soare"));
    }
}
