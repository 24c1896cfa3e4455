use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use super::location_service::load_location;
use super::{FieldErrors, ServiceError, ServiceResult};
use crate::database::{Direction, DocumentStore, Query, Repository, TenantScope};
use crate::identity::TenantContext;
use crate::models::child::Child;
use crate::models::gallery::GalleryItem;
use crate::types::timestamp;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryInput {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub grupa_id: Option<String>,
    #[serde(default)]
    pub imagini: Vec<String>,
}

pub struct GalleryService {
    store: Arc<dyn DocumentStore>,
    scope: TenantScope,
    ctx: TenantContext,
    items: Repository<GalleryItem>,
}

impl GalleryService {
    pub fn new(store: Arc<dyn DocumentStore>, ctx: TenantContext) -> ServiceResult<Self> {
        let scope = ctx.scope()?;
        let items = Repository::new(scope.gallery()?, store.clone());
        Ok(Self { store, scope, ctx, items })
    }

    async fn guardian_group(&self) -> ServiceResult<Option<String>> {
        let Some(cnp) = self.ctx.guardian_child() else {
            return Ok(None);
        };
        let children: Repository<Child> = Repository::new(self.scope.children()?, self.store.clone());
        Ok(children.find(cnp).await?.map(|c| c.grupa_id))
    }

    fn visible_to(item: &GalleryItem, group: Option<&str>) -> bool {
        match (&item.grupa_id, group) {
            (None, _) => true,
            (Some(item_group), Some(group)) => item_group == group,
            (Some(_), None) => false,
        }
    }

    pub async fn create(&self, input: GalleryInput) -> ServiceResult<GalleryItem> {
        self.ctx.require_staff_or_owner()?;
        let mut errors = FieldErrors::new();
        errors.require("title", &input.title);
        let imagini: Vec<String> = input
            .imagini
            .into_iter()
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .collect();
        if imagini.is_empty() {
            errors.add("imagini", "At least one image URL is required");
        }
        errors.finish()?;

        let grupa_id = input.grupa_id.filter(|g| !g.trim().is_empty());
        if let Some(grupa_id) = &grupa_id {
            let location = load_location(&self.store, &self.scope).await?;
            if location.group(grupa_id).is_none() {
                return Err(ServiceError::validation("grupaId", "Unknown group for this location"));
            }
        }

        let item = GalleryItem {
            id: Uuid::new_v4().to_string(),
            title: input.title.trim().to_string(),
            description: input.description,
            grupa_id,
            imagini,
            uploaded_by: self.ctx.uid().to_string(),
            created_at: timestamp::now(),
        };
        self.items.insert(&item.id, &item).await?;
        info!("Added gallery item {} with {} image(s)", item.id, item.imagini.len());
        Ok(item)
    }

    /// Newest first. Guardians see location-wide items and their child's group.
    pub async fn list(&self) -> ServiceResult<Vec<GalleryItem>> {
        let items = self.items.list(&Query::new().order_by("createdAt", Direction::Desc)).await?;
        if !self.ctx.is_guardian() {
            return Ok(items);
        }
        let group = self.guardian_group().await?;
        Ok(items.into_iter().filter(|item| Self::visible_to(item, group.as_deref())).collect())
    }

    pub async fn get(&self, id: &str) -> ServiceResult<GalleryItem> {
        let item = self
            .items
            .find(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("Gallery item '{}' not found", id)))?;
        if self.ctx.is_guardian() && !Self::visible_to(&item, self.guardian_group().await?.as_deref()) {
            return Err(ServiceError::not_found(format!("Gallery item '{}' not found", id)));
        }
        Ok(item)
    }

    pub async fn delete(&self, id: &str) -> ServiceResult<()> {
        self.ctx.require_staff_or_owner()?;
        if !self.items.delete(id).await? {
            return Err(ServiceError::not_found(format!("Gallery item '{}' not found", id)));
        }
        info!("Deleted gallery item {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::child_service::tests::{context, enroll_request, seeded_store, CNP};
    use crate::services::child_service::ChildService;
    use crate::types::Role;

    fn input(title: &str, grupa_id: Option<&str>) -> GalleryInput {
        GalleryInput {
            title: title.into(),
            description: None,
            grupa_id: grupa_id.map(str::to_string),
            imagini: vec!["https://cdn.example.ro/a.jpg".into()],
        }
    }

    #[tokio::test]
    async fn guardians_see_their_group_and_location_wide_items() {
        let store = seeded_store().await;
        ChildService::new(store.clone(), context(Role::Owner))
            .unwrap()
            .enroll(enroll_request(CNP, "g1"))
            .await
            .unwrap();

        let staff = GalleryService::new(store.clone(), context(Role::Staff)).unwrap();
        let everyone = staff.create(input("Serbare", None)).await.unwrap();
        let own = staff.create(input("Fluturași la parc", Some("g1"))).await.unwrap();
        let other = staff.create(input("Albinuțe", Some("g2"))).await.unwrap();

        let guardian = GalleryService::new(store, context(Role::Guardian)).unwrap();
        let mut visible: Vec<_> = guardian.list().await.unwrap().into_iter().map(|i| i.id).collect();
        visible.sort();
        let mut expected = vec![everyone.id, own.id];
        expected.sort();
        assert_eq!(visible, expected);
        assert!(matches!(guardian.get(&other.id).await, Err(ServiceError::NotFound(_))));
        assert_eq!(staff.list().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn items_need_images_and_a_known_group() {
        let staff = GalleryService::new(seeded_store().await, context(Role::Staff)).unwrap();
        let mut empty = input("Fără poze", None);
        empty.imagini = vec!["  ".into()];
        assert!(matches!(staff.create(empty).await, Err(ServiceError::Validation { .. })));
        assert!(matches!(staff.create(input("x", Some("g9"))).await, Err(ServiceError::Validation { .. })));

        let item = staff.create(input("ok", None)).await.unwrap();
        staff.delete(&item.id).await.unwrap();
        assert!(matches!(staff.delete(&item.id).await, Err(ServiceError::NotFound(_))));
    }
}
