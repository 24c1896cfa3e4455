use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use super::menu_schedule::{iso_week_number, overlaps, substitute_placeholders, week_end};
use super::{apply_patch, reject_immutable, FieldErrors, ServiceError, ServiceResult};
use crate::ai::menu::{menu_prompt, parse_generated_menu, MenuRequest};
use crate::ai::{parse_portions, AiError, CompletionClient, ResponseFormat};
use crate::database::{Direction, DocumentStore, Query, Repository};
use crate::identity::TenantContext;
use crate::models::menu::{Menu, MenuDay, MenuStatus};
use crate::types::timestamp;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuInput {
    pub title: String,
    #[serde(default)]
    pub days: Vec<MenuDay>,
    #[serde(default)]
    pub html_content: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishRequest {
    pub week_start: NaiveDate,
    /// Publish even when other published menus cover part of the week.
    #[serde(default)]
    pub force: bool,
}

/// A published menu whose week collides with the one being scheduled.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuConflict {
    pub id: String,
    pub title: String,
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
}

pub struct MenuService {
    ctx: TenantContext,
    menus: Repository<Menu>,
}

impl MenuService {
    pub fn new(store: Arc<dyn DocumentStore>, ctx: TenantContext) -> ServiceResult<Self> {
        let scope = ctx.scope()?;
        let menus = Repository::new(scope.menus()?, store);
        Ok(Self { ctx, menus })
    }

    async fn find(&self, id: &str) -> ServiceResult<Menu> {
        self.menus
            .find(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("Menu '{}' not found", id)))
    }

    pub async fn create(&self, input: MenuInput) -> ServiceResult<Menu> {
        self.ctx.require_staff_or_owner()?;
        let mut errors = FieldErrors::new();
        errors.require("title", &input.title);
        errors.finish()?;
        self.insert_draft(input.title, input.days, input.html_content, false).await
    }

    async fn insert_draft(&self, title: String, days: Vec<MenuDay>, html: Option<String>, ai_generated: bool) -> ServiceResult<Menu> {
        let now = timestamp::now();
        let menu = Menu {
            id: Uuid::new_v4().to_string(),
            title: title.trim().to_string(),
            status: MenuStatus::Draft,
            days,
            html_content: html,
            ai_generated,
            week_start: None,
            week_end: None,
            week_number: None,
            created_by: self.ctx.uid().to_string(),
            created_at: now,
            updated_at: now,
            published_at: None,
        };
        self.menus.insert(&menu.id, &menu).await?;
        info!("Created menu draft {} (ai: {})", menu.id, ai_generated);
        Ok(menu)
    }

    /// Guardians only ever see published menus.
    pub async fn get(&self, id: &str) -> ServiceResult<Menu> {
        let menu = self.find(id).await?;
        if self.ctx.is_guardian() && menu.status != MenuStatus::Published {
            return Err(ServiceError::not_found(format!("Menu '{}' not found", id)));
        }
        Ok(menu)
    }

    pub async fn list(&self) -> ServiceResult<Vec<Menu>> {
        let mut query = Query::new().order_by("createdAt", Direction::Desc);
        if self.ctx.is_guardian() {
            query = query.where_eq("status", "published");
        }
        Ok(self.menus.list(&query).await?)
    }

    async fn published(&self) -> ServiceResult<Vec<Menu>> {
        let query = Query::new().where_eq("status", "published").order_by("weekStart", Direction::Asc);
        Ok(self.menus.list(&query).await?)
    }

    pub async fn update(&self, id: &str, patch: Value) -> ServiceResult<Menu> {
        self.ctx.require_staff_or_owner()?;
        reject_immutable(
            &patch,
            &["id", "status", "weekStart", "weekEnd", "weekNumber", "publishedAt", "createdBy", "createdAt", "updatedAt"],
        )?;
        let patch = patch.as_object().cloned().unwrap_or_default();

        let current = self.find(id).await?;
        let mut menu = apply_patch(&current, &patch)?;
        let mut errors = FieldErrors::new();
        errors.require("title", &menu.title);
        errors.finish()?;

        menu.updated_at = timestamp::now();
        self.menus.upsert(id, &menu).await?;
        Ok(menu)
    }

    pub async fn delete(&self, id: &str) -> ServiceResult<()> {
        self.ctx.require_staff_or_owner()?;
        if !self.menus.delete(id).await? {
            return Err(ServiceError::not_found(format!("Menu '{}' not found", id)));
        }
        info!("Deleted menu {}", id);
        Ok(())
    }

    /// Binds a menu to the week starting at `week_start` and publishes it.
    ///
    /// Overlapping published menus are reported as a 409 unless `force` is set.
    /// The menu document is written with a single merge.
    pub async fn publish(&self, id: &str, request: PublishRequest) -> ServiceResult<Menu> {
        self.ctx.require_staff_or_owner()?;
        let menu = self.find(id).await?;

        let start = request.week_start;
        let end = week_end(start);
        let conflicts: Vec<MenuConflict> = self
            .published()
            .await?
            .into_iter()
            .filter(|other| other.id != menu.id)
            .filter_map(|other| {
                let (other_start, other_end) = other.week()?;
                overlaps((start, end), (other_start, other_end)).then(|| MenuConflict {
                    id: other.id,
                    title: other.title,
                    week_start: other_start,
                    week_end: other_end,
                })
            })
            .collect();

        if !conflicts.is_empty() && !request.force {
            return Err(ServiceError::Conflict {
                message: format!("{} published menu(s) already cover this week", conflicts.len()),
                details: Some(json!(conflicts)),
            });
        }

        let now = timestamp::format(&timestamp::now());
        let mut patch = json!({
            "status": "published",
            "weekStart": start,
            "weekEnd": end,
            "weekNumber": iso_week_number(start),
            "publishedAt": now,
            "updatedAt": now,
        });
        if menu.ai_generated {
            if let Some(html) = &menu.html_content {
                patch["htmlContent"] = json!(substitute_placeholders(html, start));
            }
        }

        let published = self.menus.merge(id, patch).await?;
        info!(
            "Published menu {} for {}..{} ({} overlap(s) forced)",
            id,
            start,
            end,
            if request.force { conflicts.len() } else { 0 }
        );
        Ok(published)
    }

    /// The published menu whose week contains `date`.
    pub async fn for_date(&self, date: NaiveDate) -> ServiceResult<Option<Menu>> {
        Ok(self
            .published()
            .await?
            .into_iter()
            .rev()
            .find(|menu| menu.week().map_or(false, |(start, end)| start <= date && date <= end)))
    }

    /// Generates a draft from free-text ingredients through the completion client.
    pub async fn generate(&self, client: Option<&dyn CompletionClient>, request: MenuRequest) -> ServiceResult<Menu> {
        self.ctx.require_staff_or_owner()?;
        let mut errors = FieldErrors::new();
        errors.require("ingredients", &request.ingredients);
        errors.finish()?;
        let client = client.ok_or(AiError::NotConfigured)?;

        let raw = client.complete(&menu_prompt(&request), ResponseFormat::Json).await?;
        let mut generated = parse_generated_menu(&raw)?;
        if generated.portions == 0 {
            generated.portions = parse_portions(&request.ingredients);
        }

        let title = if generated.title.trim().is_empty() { "Meniu generat".to_string() } else { generated.title.clone() };
        self.insert_draft(title, generated.menu_days(), Some(generated.to_html()), true).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::ChatMessage;
    use crate::services::child_service::tests::{context, seeded_store};
    use crate::types::Role;
    use async_trait::async_trait;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn input(title: &str) -> MenuInput {
        MenuInput { title: title.into(), days: Vec::new(), html_content: Some("<h3>LUNI - [DATA]</h3>".into()) }
    }

    async fn service(role: Role) -> (Arc<dyn DocumentStore>, MenuService) {
        let store = seeded_store().await;
        let service = MenuService::new(store.clone(), context(role)).unwrap();
        (store, service)
    }

    #[tokio::test]
    async fn publish_binds_a_week() {
        let (_, menus) = service(Role::Staff).await;
        let draft = menus.create(input("Ianuarie 1")).await.unwrap();
        let published = menus
            .publish(&draft.id, PublishRequest { week_start: date(2025, 1, 6), force: false })
            .await
            .unwrap();
        assert_eq!(published.status, MenuStatus::Published);
        assert_eq!(published.week(), Some((date(2025, 1, 6), date(2025, 1, 12))));
        assert_eq!(published.week_number, Some(2));
        // Hand-written menus keep their placeholders.
        assert_eq!(published.html_content.as_deref(), Some("<h3>LUNI - [DATA]</h3>"));
    }

    #[tokio::test]
    async fn overlapping_weeks_need_confirmation() {
        let (_, menus) = service(Role::Owner).await;
        let first = menus.create(input("A")).await.unwrap();
        menus.publish(&first.id, PublishRequest { week_start: date(2025, 1, 6), force: false }).await.unwrap();

        let second = menus.create(input("B")).await.unwrap();
        let err = menus
            .publish(&second.id, PublishRequest { week_start: date(2025, 1, 12), force: false })
            .await
            .unwrap_err();
        match err {
            ServiceError::Conflict { details: Some(details), .. } => {
                assert_eq!(details[0]["id"], json!(first.id));
                assert_eq!(details[0]["weekEnd"], json!("2025-01-12"));
            }
            other => panic!("expected conflict, got {:?}", other),
        }
        assert_eq!(menus.get(&second.id).await.unwrap().status, MenuStatus::Draft);

        menus.publish(&second.id, PublishRequest { week_start: date(2025, 1, 12), force: true }).await.unwrap();
        // The day after the first week ends does not overlap.
        let third = menus.create(input("C")).await.unwrap();
        assert!(menus.publish(&third.id, PublishRequest { week_start: date(2025, 1, 19), force: false }).await.is_ok());
    }

    #[tokio::test]
    async fn republishing_the_same_menu_is_not_a_conflict() {
        let (_, menus) = service(Role::Staff).await;
        let menu = menus.create(input("A")).await.unwrap();
        menus.publish(&menu.id, PublishRequest { week_start: date(2025, 1, 6), force: false }).await.unwrap();
        assert!(menus.publish(&menu.id, PublishRequest { week_start: date(2025, 1, 8), force: false }).await.is_ok());
    }

    #[tokio::test]
    async fn missing_menu_is_not_found_without_writes() {
        let (store, menus) = service(Role::Staff).await;
        let err = menus
            .publish("nope", PublishRequest { week_start: date(2025, 1, 6), force: true })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
        let scope = context(Role::Staff).scope().unwrap();
        assert!(store.list(&scope.menus().unwrap(), &Query::new()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn draft_edits_are_decoded_before_writing() {
        let (_, menus) = service(Role::Staff).await;
        let draft = menus.create(input("Februarie")).await.unwrap();

        assert!(matches!(menus.update(&draft.id, json!({"days": "luni"})).await, Err(ServiceError::Validation { .. })));
        assert!(matches!(menus.update(&draft.id, json!({"title": ""})).await, Err(ServiceError::Validation { .. })));
        assert!(matches!(menus.update("nope", json!({"title": "x"})).await, Err(ServiceError::NotFound(_))));

        let renamed = menus.update(&draft.id, json!({"title": "Februarie 2", "days": [{"day": "LUNI", "lunch": "Supă"}]})).await.unwrap();
        assert_eq!(renamed.days[0].lunch.as_deref(), Some("Supă"));
        assert_eq!(menus.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn guardians_see_published_menus_only() {
        let store = seeded_store().await;
        let staff = MenuService::new(store.clone(), context(Role::Staff)).unwrap();
        let guardian = MenuService::new(store, context(Role::Guardian)).unwrap();

        let draft = staff.create(input("Ciornă")).await.unwrap();
        let live = staff.create(input("Publicat")).await.unwrap();
        staff.publish(&live.id, PublishRequest { week_start: date(2025, 1, 6), force: false }).await.unwrap();

        let visible: Vec<_> = guardian.list().await.unwrap().into_iter().map(|m| m.id).collect();
        assert_eq!(visible, vec![live.id.clone()]);
        assert!(matches!(guardian.get(&draft.id).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(guardian.create(input("x")).await, Err(ServiceError::Forbidden(_))));

        assert_eq!(guardian.for_date(date(2025, 1, 9)).await.unwrap().map(|m| m.id), Some(live.id));
        assert!(guardian.for_date(date(2025, 1, 13)).await.unwrap().is_none());
    }

    struct CannedClient(String);

    #[async_trait]
    impl CompletionClient for CannedClient {
        async fn complete(&self, _messages: &[ChatMessage], format: ResponseFormat) -> Result<String, AiError> {
            assert_eq!(format, ResponseFormat::Json);
            Ok(self.0.clone())
        }
    }

    const GENERATED: &str = r#"{
        "title": "Meniu de iarnă",
        "portions": 0,
        "days": [
            {"day": "Luni", "meals": [
                {"kind": "lunch", "name": "Supă de legume", "calories": 180, "protein": 5, "carbs": 20, "fat": 4,
                 "ingredients": [{"name": "morcovi", "quantity": "1 kg"}]}
            ]},
            {"day": "Marți", "meals": [
                {"kind": "breakfast", "name": "Omletă", "calories": 220, "protein": 12, "carbs": 2, "fat": 15}
            ]}
        ]
    }"#;

    #[tokio::test]
    async fn generated_menus_get_dates_on_publish() {
        let (_, menus) = service(Role::Staff).await;
        let client = CannedClient(GENERATED.to_string());
        let request = MenuRequest { ingredients: "morcovi, ouă pentru 20 porții".into(), menu_type: None };

        let draft = menus.generate(Some(&client as &dyn CompletionClient), request).await.unwrap();
        assert!(draft.ai_generated);
        assert_eq!(draft.status, MenuStatus::Draft);
        assert_eq!(draft.days[0].lunch.as_deref(), Some("Supă de legume"));
        assert!(draft.html_content.as_deref().unwrap().contains("LUNI - [DATA]"));

        let published = menus
            .publish(&draft.id, PublishRequest { week_start: date(2025, 1, 6), force: false })
            .await
            .unwrap();
        let html = published.html_content.unwrap();
        assert!(html.contains("LUNI - 06.01.2025"));
        assert!(html.contains("MARȚI - 07.01.2025"));
        assert!(!html.contains("[DATA]"));
    }

    #[tokio::test]
    async fn generation_needs_a_client_and_valid_json() {
        let (_, menus) = service(Role::Staff).await;
        let request = || MenuRequest { ingredients: "orez".into(), menu_type: None };
        assert!(matches!(menus.generate(None, request()).await, Err(ServiceError::Ai(AiError::NotConfigured))));

        let client = CannedClient("{\"title\": \"x\"}".into());
        assert!(matches!(
            menus.generate(Some(&client as &dyn CompletionClient), request()).await,
            Err(ServiceError::Ai(AiError::InvalidResponse(_)))
        ));
    }
}
