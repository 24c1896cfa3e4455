use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

use super::location_service::load_location;
use super::{apply_patch, reject_immutable, FieldErrors, ServiceError, ServiceResult};
use crate::cnp::{Age, Cnp};
use crate::database::{DocumentStore, Query, Repository, TenantScope};
use crate::identity::TenantContext;
use crate::types::timestamp;
use crate::models::child::{Child, Contract, GuardianInfo};
use crate::models::location::Location;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollRequest {
    pub cnp: String,
    pub nume: String,
    pub prenume: String,
    #[serde(default)]
    pub adresa: Option<String>,
    #[serde(default)]
    pub alergii: Option<String>,
    #[serde(default)]
    pub observatii_medicale: Option<String>,
    pub parinte1: GuardianInfo,
    #[serde(default)]
    pub parinte2: Option<GuardianInfo>,
    pub contract: Contract,
    pub grupa_id: String,
}

/// A child with the fields derived for display
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildView {
    #[serde(flatten)]
    pub child: Child,
    pub age: Age,
    pub grupa_nume: Option<String>,
}

impl ChildView {
    fn new(child: Child, location: &Location, today: NaiveDate) -> Self {
        let age = crate::cnp::age_between(child.data_nasterii, today);
        let grupa_nume = location.group_name(&child.grupa_id).map(str::to_string);
        Self { child, age, grupa_nume }
    }
}

/// Upper bounds on contract values; finance totals are summed over these.
pub const MAX_MONTHLY_FEE: i64 = 100_000;
pub const MAX_MEALS_PER_DAY: u32 = 5;

fn check_contract(contract: &Contract, errors: &mut FieldErrors) {
    if contract.taxa_lunara < Decimal::ZERO {
        errors.add("contract.taxaLunara", "Monthly fee cannot be negative");
    } else if contract.taxa_lunara > Decimal::from(MAX_MONTHLY_FEE) {
        errors.add("contract.taxaLunara", format!("Monthly fee cannot exceed {}", MAX_MONTHLY_FEE));
    }
    if contract.mese_incluse > MAX_MEALS_PER_DAY {
        errors.add("contract.meseIncluse", format!("At most {} meals per day", MAX_MEALS_PER_DAY));
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildFilter {
    #[serde(default)]
    pub grupa_id: Option<String>,
}

pub struct ChildService {
    store: Arc<dyn DocumentStore>,
    scope: TenantScope,
    ctx: TenantContext,
    children: Repository<Child>,
}

impl ChildService {
    pub fn new(store: Arc<dyn DocumentStore>, ctx: TenantContext) -> ServiceResult<Self> {
        let scope = ctx.scope()?;
        let children = Repository::new(scope.children()?, store.clone());
        Ok(Self { store, scope, ctx, children })
    }

    fn today() -> NaiveDate {
        Local::now().date_naive()
    }

    /// Validates, checks the group, then does a read-then-write duplicate
    /// check. Two concurrent enrollments of the same CNP can still race; the
    /// loser gets `AlreadyExists` from the create.
    pub async fn enroll(&self, request: EnrollRequest) -> ServiceResult<ChildView> {
        self.ctx.require_staff_or_owner()?;

        let mut errors = FieldErrors::new();
        errors.require("nume", &request.nume);
        errors.require("prenume", &request.prenume);
        errors.require("parinte1.nume", &request.parinte1.nume);
        errors.require("grupaId", &request.grupa_id);
        check_contract(&request.contract, &mut errors);
        errors.finish()?;

        let cnp = Cnp::parse(&request.cnp)?;

        let location = load_location(&self.store, &self.scope).await?;
        if location.group(&request.grupa_id).is_none() {
            return Err(ServiceError::validation("grupaId", "Unknown group for this location"));
        }

        if self.children.exists(cnp.as_str()).await? {
            return Err(ServiceError::conflict(format!("A child with CNP {} is already enrolled", cnp.as_str())));
        }

        let now = timestamp::now();
        let child = Child {
            cnp: cnp.as_str().to_string(),
            nume: request.nume.trim().to_string(),
            prenume: request.prenume.trim().to_string(),
            data_nasterii: cnp.birth_date(),
            sex: cnp.sex(),
            adresa: request.adresa,
            alergii: request.alergii,
            observatii_medicale: request.observatii_medicale,
            parinte1: request.parinte1,
            parinte2: request.parinte2,
            contract: request.contract,
            grupa_id: request.grupa_id,
            created_at: now,
            updated_at: now,
        };
        self.children.insert(&child.cnp, &child).await?;
        info!("Enrolled child {} in location {}", child.cnp, self.scope.location_id());

        Ok(ChildView::new(child, &location, Self::today()))
    }

    pub async fn get(&self, cnp: &str) -> ServiceResult<ChildView> {
        self.ctx.ensure_child_visible(cnp)?;
        let child = self.find(cnp).await?;
        let location = load_location(&self.store, &self.scope).await?;
        Ok(ChildView::new(child, &location, Self::today()))
    }

    pub(crate) async fn find(&self, cnp: &str) -> ServiceResult<Child> {
        self.children
            .find(cnp)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("Child {} not found", cnp)))
    }

    pub async fn list(&self, filter: ChildFilter) -> ServiceResult<Vec<ChildView>> {
        if let Some(cnp) = self.ctx.guardian_child() {
            return Ok(vec![self.get(cnp).await?]);
        }

        let mut query = Query::new();
        if let Some(grupa_id) = filter.grupa_id.as_deref().filter(|g| !g.is_empty()) {
            query = query.where_eq("grupaId", grupa_id);
        }
        let location = load_location(&self.store, &self.scope).await?;
        let today = Self::today();
        let mut children: Vec<ChildView> = self
            .children
            .list(&query)
            .await?
            .into_iter()
            .map(|child| ChildView::new(child, &location, today))
            .collect();
        children.sort_by(|a, b| (&a.child.nume, &a.child.prenume).cmp(&(&b.child.nume, &b.child.prenume)));
        Ok(children)
    }

    /// Applies the provided fields; identity fields are fixed at enrollment.
    /// The patched child is checked like an enrollment before it is stored.
    pub async fn update(&self, cnp: &str, patch: Value) -> ServiceResult<ChildView> {
        self.ctx.require_staff_or_owner()?;
        reject_immutable(&patch, &["cnp", "dataNasterii", "sex", "createdAt", "updatedAt"])?;
        let patch = patch.as_object().cloned().unwrap_or_default();

        let current = self.find(cnp).await?;
        let mut child = apply_patch(&current, &patch)?;

        let location = load_location(&self.store, &self.scope).await?;
        let mut errors = FieldErrors::new();
        errors.require("nume", &child.nume);
        errors.require("prenume", &child.prenume);
        errors.require("parinte1.nume", &child.parinte1.nume);
        check_contract(&child.contract, &mut errors);
        if location.group(&child.grupa_id).is_none() {
            errors.add("grupaId", "Unknown group for this location");
        }
        errors.finish()?;

        child.nume = child.nume.trim().to_string();
        child.prenume = child.prenume.trim().to_string();
        child.updated_at = timestamp::now();
        self.children.upsert(cnp, &child).await?;
        Ok(ChildView::new(child, &location, Self::today()))
    }

    /// Explicit admin removal; attendance and reports go with the document.
    pub async fn delete(&self, cnp: &str) -> ServiceResult<()> {
        self.ctx.require_owner()?;
        if !self.children.delete(cnp).await? {
            return Err(ServiceError::not_found(format!("Child {} not found", cnp)));
        }
        info!("Deleted child {} from location {}", cnp, self.scope.location_id());
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::database::MemoryDocumentStore;
    use crate::identity::{Principal, TenantCoordinates};
    use crate::models::child::SubscriptionType;
    use crate::types::Role;
    use chrono::Datelike;
    use rust_decimal::Decimal;
    use serde_json::json;

    pub const CNP: &str = "5030615123456";

    pub async fn seeded_store() -> Arc<dyn DocumentStore> {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryDocumentStore::new());
        let scope = TenantScope::new("org", "loc").unwrap();
        store
            .set(
                &scope.location().unwrap(),
                json!({
                    "id": "loc",
                    "name": "Grădinița Soare",
                    "grupe": [{"id": "g1", "nume": "Fluturași"}, {"id": "g2", "nume": "Albinuțe"}],
                    "createdAt": "2025-01-01T00:00:00.000000Z"
                }),
            )
            .await
            .unwrap();
        store
    }

    pub fn context(role: Role) -> TenantContext {
        let coordinates = match role {
            Role::Owner => TenantCoordinates::owner("org", Some("loc")),
            Role::Staff => TenantCoordinates {
                role,
                organization_id: "org".into(),
                location_id: "loc".into(),
                grupa_id: Some("g1".into()),
                copil_cnp: None,
            },
            Role::Guardian => TenantCoordinates {
                role,
                organization_id: "org".into(),
                location_id: "loc".into(),
                grupa_id: None,
                copil_cnp: Some(CNP.into()),
            },
        };
        TenantContext::new(Principal::new(format!("{}-uid", role.as_str())), coordinates)
    }

    pub fn enroll_request(cnp: &str, grupa_id: &str) -> EnrollRequest {
        EnrollRequest {
            cnp: cnp.into(),
            nume: "Popescu".into(),
            prenume: "Andrei".into(),
            adresa: None,
            alergii: Some("arahide".into()),
            observatii_medicale: None,
            parinte1: GuardianInfo {
                nume: "Maria Popescu".into(),
                telefon: Some("0722000000".into()),
                email: None,
                relatie: Some("mamă".into()),
            },
            parinte2: None,
            contract: Contract {
                taxa_lunara: Decimal::new(120000, 2),
                mese_incluse: 3,
                tip_abonament: SubscriptionType::Full,
            },
            grupa_id: grupa_id.into(),
        }
    }

    #[tokio::test]
    async fn enrollment_derives_birth_date_from_cnp() {
        let service = ChildService::new(seeded_store().await, context(Role::Staff)).unwrap();
        let view = service.enroll(enroll_request(CNP, "g1")).await.unwrap();

        assert_eq!(view.child.data_nasterii.year(), 2003);
        assert_eq!(view.child.data_nasterii, NaiveDate::from_ymd_opt(2003, 6, 15).unwrap());
        assert_eq!(view.grupa_nume.as_deref(), Some("Fluturași"));
        assert!(view.age.years >= 21);

        let err = service.enroll(enroll_request(CNP, "g1")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict { .. }));
    }

    #[tokio::test]
    async fn enrollment_validates_before_writing() {
        let service = ChildService::new(seeded_store().await, context(Role::Owner)).unwrap();

        let err = service.enroll(enroll_request("5030615123457", "g1")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Cnp(_)));

        let err = service.enroll(enroll_request(CNP, "missing")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation { .. }));

        let mut request = enroll_request(CNP, "g1");
        request.prenume = " ".into();
        assert!(matches!(service.enroll(request).await, Err(ServiceError::Validation { .. })));

        assert!(service.list(ChildFilter::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_moves_group_by_id_and_keeps_identity() {
        let store = seeded_store().await;
        let service = ChildService::new(store, context(Role::Staff)).unwrap();
        service.enroll(enroll_request(CNP, "g1")).await.unwrap();

        let view = service.update(CNP, json!({"grupaId": "g2", "alergii": null})).await.unwrap();
        assert_eq!(view.grupa_nume.as_deref(), Some("Albinuțe"));
        assert_eq!(view.child.alergii, None);

        assert!(matches!(service.update(CNP, json!({"cnp": "x"})).await, Err(ServiceError::Validation { .. })));
        assert!(matches!(service.update(CNP, json!({"grupaId": "zzz"})).await, Err(ServiceError::Validation { .. })));

        let filtered = service.list(ChildFilter { grupa_id: Some("g1".into()) }).await.unwrap();
        assert!(filtered.is_empty());
    }

    #[tokio::test]
    async fn malformed_updates_leave_the_child_untouched() {
        let service = ChildService::new(seeded_store().await, context(Role::Staff)).unwrap();
        service.enroll(enroll_request(CNP, "g1")).await.unwrap();
        service.enroll(enroll_request("6050101123451", "g2")).await.unwrap();

        let err = service.update(CNP, json!({"contract": "oops"})).await.unwrap_err();
        match err {
            ServiceError::Validation { field_errors, .. } => assert!(field_errors.contains_key("contract")),
            other => panic!("expected a validation error, got {:?}", other),
        }
        let negative = json!({"contract": {"taxaLunara": "-500", "meseIncluse": 3, "tipAbonament": "full"}});
        assert!(matches!(service.update(CNP, negative).await, Err(ServiceError::Validation { .. })));
        let huge = json!({"contract": {"taxaLunara": "1000000", "meseIncluse": 3, "tipAbonament": "full"}});
        assert!(matches!(service.update(CNP, huge).await, Err(ServiceError::Validation { .. })));
        assert!(matches!(service.update(CNP, json!({"nume": "  "})).await, Err(ServiceError::Validation { .. })));

        let children = service.list(ChildFilter::default()).await.unwrap();
        assert_eq!(children.len(), 2);
        let unchanged = children.iter().find(|c| c.child.cnp == CNP).unwrap();
        assert_eq!(unchanged.child.contract.taxa_lunara, Decimal::new(120000, 2));
    }

    #[tokio::test]
    async fn enrollment_bounds_contract_values() {
        let service = ChildService::new(seeded_store().await, context(Role::Owner)).unwrap();
        let mut request = enroll_request(CNP, "g1");
        request.contract.taxa_lunara = Decimal::MAX;
        assert!(matches!(service.enroll(request).await, Err(ServiceError::Validation { .. })));

        let mut request = enroll_request(CNP, "g1");
        request.contract.mese_incluse = u32::MAX;
        assert!(matches!(service.enroll(request).await, Err(ServiceError::Validation { .. })));
    }

    #[tokio::test]
    async fn guardians_see_only_their_child_and_only_owners_delete() {
        let store = seeded_store().await;
        let staff = ChildService::new(store.clone(), context(Role::Staff)).unwrap();
        staff.enroll(enroll_request(CNP, "g1")).await.unwrap();
        staff.enroll(enroll_request("6050101123451", "g1")).await.ok();

        let guardian = ChildService::new(store.clone(), context(Role::Guardian)).unwrap();
        let visible = guardian.list(ChildFilter::default()).await.unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].child.cnp, CNP);
        assert!(matches!(guardian.get("6050101123451").await, Err(ServiceError::Forbidden(_))));

        assert!(matches!(staff.delete(CNP).await, Err(ServiceError::Forbidden(_))));
        let owner = ChildService::new(store, context(Role::Owner)).unwrap();
        owner.delete(CNP).await.unwrap();
        assert!(matches!(owner.get(CNP).await, Err(ServiceError::NotFound(_))));
    }
}
