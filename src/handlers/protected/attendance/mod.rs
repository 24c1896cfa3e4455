// handlers/protected/attendance/mod.rs - Attendance endpoints
//
// Records live under children/{cnp}/attendance/{YYYY-MM-DD}; the group sheet
// is a view over those per-child documents.

pub mod child; // /api/children/:cnp/attendance...
pub mod sheet; // /api/attendance/...

pub use child::{attendance_day_get, attendance_day_put, attendance_history_get, attendance_summary_get};
pub use sheet::{sheet_get, sheet_put};

use crate::identity::TenantContext;
use crate::services::attendance_service::AttendanceService;
use crate::services::ServiceResult;
use crate::state::AppState;

fn service(state: &AppState, ctx: TenantContext) -> ServiceResult<AttendanceService> {
    AttendanceService::new(state.store.clone(), ctx, state.attendance.clone())
}
