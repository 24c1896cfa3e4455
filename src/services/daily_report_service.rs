use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use super::{ServiceError, ServiceResult};
use crate::database::{paths, DocumentStore, Query, Repository, TenantScope};
use crate::identity::TenantContext;
use crate::types::timestamp;
use crate::models::child::Child;
use crate::models::daily_report::{DailyReport, Meals, Mood, SleepWindow};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyReportInput {
    #[serde(default)]
    pub meals: Meals,
    #[serde(default)]
    pub sleep: Option<SleepWindow>,
    #[serde(default)]
    pub hygiene: Option<String>,
    #[serde(default)]
    pub mood: Option<Mood>,
    #[serde(default)]
    pub activities: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

pub struct DailyReportService {
    store: Arc<dyn DocumentStore>,
    scope: TenantScope,
    ctx: TenantContext,
}

impl DailyReportService {
    pub fn new(store: Arc<dyn DocumentStore>, ctx: TenantContext) -> ServiceResult<Self> {
        let scope = ctx.scope()?;
        Ok(Self { store, scope, ctx })
    }

    fn reports(&self, cnp: &str) -> ServiceResult<Repository<DailyReport>> {
        Ok(Repository::new(self.scope.daily_reports(cnp)?, self.store.clone()))
    }

    fn children(&self) -> ServiceResult<Repository<Child>> {
        Ok(Repository::new(self.scope.children()?, self.store.clone()))
    }

    /// One report per child per day; saving again replaces it.
    pub async fn save(&self, cnp: &str, date: NaiveDate, input: DailyReportInput) -> ServiceResult<DailyReport> {
        self.ctx.require_staff_or_owner()?;
        if let Some(sleep) = &input.sleep {
            if sleep.end <= sleep.start {
                return Err(ServiceError::validation("sleep", "Sleep must end after it starts"));
            }
        }
        if !self.children()?.exists(cnp).await? {
            return Err(ServiceError::not_found(format!("Child {} not found", cnp)));
        }

        let reports = self.reports(cnp)?;
        let key = paths::date_key(date);
        let now = timestamp::now();
        let created_at = reports.find(&key).await?.map(|r| r.created_at).unwrap_or(now);

        let report = DailyReport {
            date,
            child_cnp: cnp.to_string(),
            meals: input.meals,
            sleep: input.sleep,
            hygiene: input.hygiene,
            mood: input.mood,
            activities: input.activities,
            notes: input.notes,
            author_id: self.ctx.uid().to_string(),
            author_name: self.ctx.display_name(),
            created_at,
            updated_at: now,
        };
        reports.upsert(&key, &report).await?;
        info!("Saved daily report for {} on {}", cnp, date);
        Ok(report)
    }

    pub async fn get(&self, cnp: &str, date: NaiveDate) -> ServiceResult<DailyReport> {
        self.ctx.ensure_child_visible(cnp)?;
        self.reports(cnp)?
            .find(&paths::date_key(date))
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("No daily report for {} on {}", cnp, date)))
    }

    pub async fn list_for_child(&self, cnp: &str, from: NaiveDate, to: NaiveDate) -> ServiceResult<Vec<DailyReport>> {
        self.ctx.ensure_child_visible(cnp)?;
        let query = Query::new().id_range(Some(paths::date_key(from)), Some(paths::date_key(to)));
        Ok(self.reports(cnp)?.list(&query).await?)
    }

    /// Reports written for a group's children on one day.
    pub async fn list_for_group(&self, grupa_id: &str, date: NaiveDate) -> ServiceResult<Vec<DailyReport>> {
        self.ctx.require_staff_or_owner()?;
        let members = self.children()?.list(&Query::new().where_eq("grupaId", grupa_id)).await?;
        let key = paths::date_key(date);

        let mut reports = Vec::new();
        for child in members {
            if let Some(report) = self.reports(&child.cnp)?.find(&key).await? {
                reports.push(report);
            }
        }
        Ok(reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::daily_report::MealPortion;
    use crate::services::child_service::tests::{context, enroll_request, seeded_store, CNP};
    use crate::services::child_service::ChildService;
    use crate::types::{hhmm, Role};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 4).unwrap()
    }

    #[tokio::test]
    async fn resaving_keeps_creation_time() {
        let store = seeded_store().await;
        ChildService::new(store.clone(), context(Role::Staff))
            .unwrap()
            .enroll(enroll_request(CNP, "g1"))
            .await
            .unwrap();
        let service = DailyReportService::new(store.clone(), context(Role::Staff)).unwrap();

        let first = service.save(CNP, date(), DailyReportInput::default()).await.unwrap();
        let input = DailyReportInput {
            meals: Meals { pranz: MealPortion::Half, ..Default::default() },
            sleep: Some(SleepWindow { start: hhmm::parse("13:00").unwrap(), end: hhmm::parse("14:30").unwrap() }),
            mood: Some(Mood::Happy),
            ..Default::default()
        };
        let second = service.save(CNP, date(), input).await.unwrap();
        assert_eq!(second.created_at, first.created_at);

        let guardian = DailyReportService::new(store, context(Role::Guardian)).unwrap();
        let read = guardian.get(CNP, date()).await.unwrap();
        assert_eq!(read.meals.pranz, MealPortion::Half);
        assert_eq!(read.mood, Some(Mood::Happy));

        assert_eq!(service.list_for_group("g1", date()).await.unwrap().len(), 1);
        assert!(service.list_for_group("g2", date()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn rejects_unknown_child_and_inverted_sleep() {
        let service = DailyReportService::new(seeded_store().await, context(Role::Owner)).unwrap();
        assert!(matches!(
            service.save(CNP, date(), DailyReportInput::default()).await,
            Err(ServiceError::NotFound(_))
        ));

        let input = DailyReportInput {
            sleep: Some(SleepWindow { start: hhmm::parse("14:00").unwrap(), end: hhmm::parse("13:00").unwrap() }),
            ..Default::default()
        };
        assert!(matches!(service.save(CNP, date(), input).await, Err(ServiceError::Validation { .. })));
    }
}
