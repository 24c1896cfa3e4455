//! Monthly revenue and attendance report for one location.

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

use super::attendance_service::AttendanceRepository;
use super::location_service::load_location;
use super::{month_bounds, ServiceError, ServiceResult};
use crate::database::{DocumentStore, Query, Repository};
use crate::identity::TenantContext;
use crate::models::attendance::AttendanceSummary;
use crate::models::child::{Child, SubscriptionType};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildFinanceLine {
    pub cnp: String,
    pub name: String,
    pub grupa_id: String,
    pub tip_abonament: SubscriptionType,
    pub taxa_lunara: Decimal,
    pub mese_incluse: u32,
    pub attendance: AttendanceSummary,
    pub meals_served: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupTotals {
    pub grupa_nume: Option<String>,
    pub children: u32,
    pub revenue: Decimal,
    pub days_present: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinanceReport {
    pub location_id: String,
    pub month: String,
    pub children: Vec<ChildFinanceLine>,
    pub expected_revenue: Decimal,
    pub revenue_by_subscription: BTreeMap<SubscriptionType, Decimal>,
    pub by_group: BTreeMap<String, GroupTotals>,
    pub total_days_present: u32,
    pub total_meals_served: u32,
}

pub struct FinanceService {
    store: Arc<dyn DocumentStore>,
    ctx: TenantContext,
}

impl FinanceService {
    pub fn new(store: Arc<dyn DocumentStore>, ctx: TenantContext) -> ServiceResult<Self> {
        ctx.require_owner()?;
        Ok(Self { store, ctx })
    }

    pub async fn monthly_report(&self, location_id: &str, month: &str) -> ServiceResult<FinanceReport> {
        let (first, last) = month_bounds(month)?;
        let scope = self.ctx.scope_for(location_id)?;
        let location = load_location(&self.store, &scope).await?;

        let children: Repository<Child> = Repository::new(scope.children()?, self.store.clone());
        let attendance = AttendanceRepository::new(self.store.clone(), scope.clone());

        let mut report = FinanceReport {
            location_id: location_id.to_string(),
            month: first.format("%Y-%m").to_string(),
            children: Vec::new(),
            expected_revenue: Decimal::ZERO,
            revenue_by_subscription: BTreeMap::new(),
            by_group: BTreeMap::new(),
            total_days_present: 0,
            total_meals_served: 0,
        };

        let mut enrolled = children.list(&Query::new()).await?;
        enrolled.sort_by(|a, b| a.full_name().cmp(&b.full_name()));

        for child in enrolled {
            let summary = attendance.summary(&child.cnp, first, last).await?;
            let meals_served = child
                .contract
                .mese_incluse
                .checked_mul(summary.present)
                .ok_or_else(|| overflow(format!("meals served by {}", child.cnp)))?;
            let fee = child.contract.taxa_lunara;

            report.expected_revenue = add_money(report.expected_revenue, fee, "expected revenue")?;
            let by_subscription = report
                .revenue_by_subscription
                .entry(child.contract.tip_abonament)
                .or_insert(Decimal::ZERO);
            *by_subscription = add_money(*by_subscription, fee, "subscription revenue")?;

            let group = report.by_group.entry(child.grupa_id.clone()).or_insert_with(|| GroupTotals {
                grupa_nume: location.group_name(&child.grupa_id).map(str::to_string),
                ..Default::default()
            });
            group.children += 1;
            group.revenue = add_money(group.revenue, fee, "group revenue")?;
            group.days_present = add_count(group.days_present, summary.present, "group days present")?;

            report.total_days_present = add_count(report.total_days_present, summary.present, "days present")?;
            report.total_meals_served = add_count(report.total_meals_served, meals_served, "meals served")?;

            report.children.push(ChildFinanceLine {
                name: child.full_name(),
                cnp: child.cnp,
                grupa_id: child.grupa_id,
                tip_abonament: child.contract.tip_abonament,
                taxa_lunara: fee,
                mese_incluse: child.contract.mese_incluse,
                attendance: summary,
                meals_served,
            });
        }

        debug!(
            "Finance report {} {}: {} children, revenue {}",
            location_id,
            report.month,
            report.children.len(),
            report.expected_revenue
        );
        Ok(report)
    }
}

fn overflow(what: impl Into<String>) -> ServiceError {
    ServiceError::Overflow(what.into())
}

fn add_money(total: Decimal, amount: Decimal, what: &str) -> ServiceResult<Decimal> {
    total.checked_add(amount).ok_or_else(|| overflow(what))
}

fn add_count(total: u32, amount: u32, what: &str) -> ServiceResult<u32> {
    total.checked_add(amount).ok_or_else(|| overflow(what))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::attendance::AttendanceStatus;
    use crate::services::attendance_service::{AttendanceDefaults, AttendanceService, MarkRequest};
    use crate::services::child_service::tests::{context, enroll_request, seeded_store, CNP};
    use crate::services::child_service::ChildService;
    use crate::types::Role;
    use crate::database::TenantScope;
    use chrono::NaiveDate;

    const SECOND: &str = "6050101123451";

    fn mark(status: AttendanceStatus) -> MarkRequest {
        MarkRequest { status, check_in: None, check_out: None, notes: None }
    }

    #[tokio::test]
    async fn report_totals_fees_and_present_days() {
        let store = seeded_store().await;
        let children = ChildService::new(store.clone(), context(Role::Owner)).unwrap();
        children.enroll(enroll_request(CNP, "g1")).await.unwrap();
        let mut half = enroll_request(SECOND, "g2");
        half.contract.taxa_lunara = Decimal::new(60050, 2);
        half.contract.tip_abonament = SubscriptionType::Half;
        half.contract.mese_incluse = 2;
        children.enroll(half).await.unwrap();

        let attendance = AttendanceService::new(store.clone(), context(Role::Owner), AttendanceDefaults::default()).unwrap();
        let day = |d| NaiveDate::from_ymd_opt(2025, 3, d).unwrap();
        attendance.mark(CNP, day(3), mark(AttendanceStatus::Present)).await.unwrap();
        attendance.mark(CNP, day(4), mark(AttendanceStatus::Present)).await.unwrap();
        attendance.mark(CNP, day(5), mark(AttendanceStatus::Medical)).await.unwrap();
        attendance.mark(SECOND, day(3), mark(AttendanceStatus::Present)).await.unwrap();
        // Outside the month.
        attendance
            .mark(SECOND, NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(), mark(AttendanceStatus::Present))
            .await
            .unwrap();

        let finance = FinanceService::new(store, context(Role::Owner)).unwrap();
        let report = finance.monthly_report("loc", "2025-03").await.unwrap();

        assert_eq!(report.expected_revenue, Decimal::new(180050, 2));
        assert_eq!(report.revenue_by_subscription[&SubscriptionType::Full], Decimal::new(120000, 2));
        assert_eq!(report.revenue_by_subscription[&SubscriptionType::Half], Decimal::new(60050, 2));
        assert_eq!(report.total_days_present, 3);
        // 3 meals x 2 days + 2 meals x 1 day
        assert_eq!(report.total_meals_served, 8);
        assert_eq!(report.by_group["g1"].grupa_nume.as_deref(), Some("Fluturași"));
        assert_eq!(report.by_group["g2"].days_present, 1);

        let line = report.children.iter().find(|l| l.cnp == CNP).unwrap();
        assert_eq!(line.attendance.medical, 1);
    }

    #[tokio::test]
    async fn totals_that_overflow_are_errors() {
        let store = seeded_store().await;
        let scope = TenantScope::new("org", "loc").unwrap();
        // Bypasses enrollment limits, as a document written by another tool could.
        for cnp in [CNP, SECOND] {
            let child = serde_json::json!({
                "cnp": cnp,
                "nume": "Popescu",
                "prenume": cnp,
                "dataNasterii": "2005-01-01",
                "sex": "female",
                "parinte1": {"nume": "Maria Popescu"},
                "contract": {"taxaLunara": Decimal::MAX, "meseIncluse": 3, "tipAbonament": "full"},
                "grupaId": "g1",
                "createdAt": "2025-01-01T00:00:00.000000Z",
                "updatedAt": "2025-01-01T00:00:00.000000Z"
            });
            store.set(&scope.child(cnp).unwrap(), child).await.unwrap();
        }

        let finance = FinanceService::new(store, context(Role::Owner)).unwrap();
        let err = finance.monthly_report("loc", "2025-01").await.unwrap_err();
        assert!(matches!(err, ServiceError::Overflow(_)));
        assert_eq!(add_count(u32::MAX, 1, "x").unwrap_err().to_string(), "Totals out of range: x");
    }

    #[tokio::test]
    async fn only_owners_get_reports() {
        let store = seeded_store().await;
        assert!(matches!(FinanceService::new(store.clone(), context(Role::Staff)), Err(ServiceError::Forbidden(_))));
        let finance = FinanceService::new(store, context(Role::Owner)).unwrap();
        assert!(matches!(finance.monthly_report("loc", "2025-3x").await, Err(ServiceError::Validation { .. })));
        assert!(matches!(finance.monthly_report("elsewhere", "2025-03").await, Err(ServiceError::NotFound(_))));
    }
}
