use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use super::menu_schedule::{parse_week_id, week_id};
use super::{FieldErrors, ServiceError, ServiceResult};
use crate::ai::letters::{friday_prompt, monday_prompt};
use crate::ai::{AiError, CompletionClient, ResponseFormat};
use crate::database::{DocumentStore, LetterKind, Repository, TenantScope};
use crate::identity::TenantContext;
use crate::models::weekly_letter::WeeklyLetter;
use crate::types::timestamp;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LetterInput {
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub activities: Vec<String>,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct MondayGenerateRequest {
    pub theme: String,
    #[serde(default)]
    pub activities: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FridayGenerateRequest {
    #[serde(default)]
    pub notes: Option<String>,
}

/// Both letters of one week, as shown on the letters page.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekLetters {
    pub week_id: String,
    pub monday: Option<WeeklyLetter>,
    pub friday: Option<WeeklyLetter>,
}

/// Normalizes a `YYYY-Www` id or a `YYYY-MM-DD` date to a week id.
pub fn resolve_week_id(raw: &str) -> ServiceResult<String> {
    if let Some(monday) = parse_week_id(raw) {
        return Ok(week_id(monday));
    }
    chrono::NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map(week_id)
        .map_err(|_| ServiceError::validation("weekId", "Expected YYYY-Www or YYYY-MM-DD"))
}

pub struct LetterService {
    store: Arc<dyn DocumentStore>,
    scope: TenantScope,
    ctx: TenantContext,
}

impl LetterService {
    pub fn new(store: Arc<dyn DocumentStore>, ctx: TenantContext) -> ServiceResult<Self> {
        let scope = ctx.scope()?;
        Ok(Self { store, scope, ctx })
    }

    fn letters(&self) -> ServiceResult<Repository<WeeklyLetter>> {
        Ok(Repository::new(self.scope.weekly_letters()?, self.store.clone()))
    }

    fn doc_id(week: &str, kind: LetterKind) -> String {
        format!("{}-{}", week, kind.as_str())
    }

    async fn find(&self, week: &str, kind: LetterKind) -> ServiceResult<Option<WeeklyLetter>> {
        Ok(self.letters()?.find(&Self::doc_id(week, kind)).await?)
    }

    pub async fn get(&self, week: &str, kind: LetterKind) -> ServiceResult<WeeklyLetter> {
        let week = resolve_week_id(week)?;
        self.find(&week, kind)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("No {} letter for {}", kind.as_str(), week)))
    }

    pub async fn week(&self, week: &str) -> ServiceResult<WeekLetters> {
        let week = resolve_week_id(week)?;
        Ok(WeekLetters {
            monday: self.find(&week, LetterKind::Monday).await?,
            friday: self.find(&week, LetterKind::Friday).await?,
            week_id: week,
        })
    }

    /// Upserts a letter, keeping the original creation time.
    pub async fn save(&self, week: &str, kind: LetterKind, input: LetterInput) -> ServiceResult<WeeklyLetter> {
        self.ctx.require_staff_or_owner()?;
        let week = resolve_week_id(week)?;
        self.write(&week, kind, input, false).await
    }

    async fn write(&self, week: &str, kind: LetterKind, input: LetterInput, ai_generated: bool) -> ServiceResult<WeeklyLetter> {
        let existing = self.find(week, kind).await?;
        let now = timestamp::now();
        let letter = WeeklyLetter {
            week_id: week.to_string(),
            kind,
            theme: input.theme.filter(|t| !t.trim().is_empty()),
            activities: input.activities.into_iter().filter(|a| !a.trim().is_empty()).collect(),
            content: input.content,
            ai_generated,
            author_id: self.ctx.uid().to_string(),
            created_at: existing.map_or(now, |l| l.created_at),
            updated_at: now,
        };
        self.letters()?.upsert(&Self::doc_id(week, kind), &letter).await?;
        info!("Saved {} letter for {} (ai: {})", kind.as_str(), week, ai_generated);
        Ok(letter)
    }

    pub async fn generate_monday(
        &self,
        client: Option<&dyn CompletionClient>,
        week: &str,
        request: MondayGenerateRequest,
    ) -> ServiceResult<WeeklyLetter> {
        self.ctx.require_staff_or_owner()?;
        let week = resolve_week_id(week)?;
        let mut errors = FieldErrors::new();
        errors.require("theme", &request.theme);
        errors.finish()?;
        let client = client.ok_or(AiError::NotConfigured)?;

        let prompt = monday_prompt(&week, &request.theme, &request.activities);
        let content = client.complete(&prompt, ResponseFormat::Text).await?;
        let input = LetterInput {
            theme: Some(request.theme),
            activities: request.activities,
            content: content.trim().to_string(),
        };
        self.write(&week, LetterKind::Monday, input, true).await
    }

    /// Recap letter built from the Monday letter of the same week.
    pub async fn generate_friday(
        &self,
        client: Option<&dyn CompletionClient>,
        week: &str,
        request: FridayGenerateRequest,
    ) -> ServiceResult<WeeklyLetter> {
        self.ctx.require_staff_or_owner()?;
        let week = resolve_week_id(week)?;
        let monday = self
            .find(&week, LetterKind::Monday)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("No monday letter for {}; write it first", week)))?;
        let client = client.ok_or(AiError::NotConfigured)?;

        let prompt = friday_prompt(&week, monday.theme.as_deref(), &monday.activities, request.notes.as_deref());
        let content = client.complete(&prompt, ResponseFormat::Text).await?;
        let input = LetterInput {
            theme: monday.theme,
            activities: monday.activities,
            content: content.trim().to_string(),
        };
        self.write(&week, LetterKind::Friday, input, true).await
    }
}
