// handlers/protected/mod.rs - Protected handlers (JWT authentication required)
//
// Security Level: JWT Authentication + tenant resolution
// Route Prefix: /api/*
// Middleware: jwt_auth_middleware → resolve_tenant_middleware
//
// Every handler here receives a `TenantContext` extension. Owners select the
// location they work in with `?location=<id>`; staff and guardians are bound
// to the location in their registry entry and the hint is ignored.

pub mod activities;
pub mod attendance;
pub mod auth;
pub mod children;
pub mod gallery;
pub mod letters;
pub mod location;
pub mod menus;
pub mod messages;
pub mod reports;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::ApiError;

/// `?from=YYYY-MM-DD&to=YYYY-MM-DD`, both inclusive
#[derive(Debug, Deserialize)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub fn checked(self) -> Result<(NaiveDate, NaiveDate), ApiError> {
        if self.from > self.to {
            return Err(ApiError::bad_request("'from' must not be after 'to'"));
        }
        Ok((self.from, self.to))
    }
}

/// `?month=YYYY-MM`
#[derive(Debug, Deserialize)]
pub struct MonthQuery {
    pub month: String,
}
