//! Page-level operations over the tenant document store.
//!
//! Each service is built for one resolved `TenantContext` and performs its
//! own role checks, so handlers stay thin.

pub mod activity_service;
pub mod attendance_service;
pub mod child_service;
pub mod daily_report_service;
pub mod finance_service;
pub mod gallery_service;
pub mod letter_service;
pub mod location_service;
pub mod menu_schedule;
pub mod menu_service;
pub mod message_service;
pub mod registry_service;

use chrono::{Datelike, NaiveDate};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use thiserror::Error;

use crate::ai::AiError;
use crate::auth::JwtError;
use crate::cnp::CnpError;
use crate::database::StoreError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{message}")]
    Validation {
        message: String,
        field_errors: HashMap<String, String>,
    },

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{message}")]
    Conflict { message: String, details: Option<Value> },

    #[error("Invalid CNP: {0}")]
    Cnp(#[from] CnpError),

    #[error("Stopped after {written} of {total} writes: {source}")]
    PartialWrite {
        written: usize,
        total: usize,
        #[source]
        source: StoreError,
    },

    #[error("Totals out of range: {0}")]
    Overflow(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Ai(#[from] AiError),

    #[error(transparent)]
    Jwt(#[from] JwtError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        let mut field_errors = HashMap::new();
        field_errors.insert(field.to_string(), message.clone());
        ServiceError::Validation { message, field_errors }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        ServiceError::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ServiceError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ServiceError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ServiceError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ServiceError::Conflict { message: message.into(), details: None }
    }
}

/// Collects missing required fields before any write happens.
#[derive(Debug, Default)]
pub(crate) struct FieldErrors(HashMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn require(&mut self, field: &str, value: &str) {
        if value.trim().is_empty() {
            self.0.insert(field.to_string(), "This field is required".to_string());
        }
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.insert(field.to_string(), message.into());
    }

    pub fn finish(self) -> ServiceResult<()> {
        if self.0.is_empty() {
            return Ok(());
        }
        Err(ServiceError::Validation {
            message: "Missing or invalid fields".to_string(),
            field_errors: self.0,
        })
    }
}

/// Parses `YYYY-MM` into the first and last day of that month.
pub fn month_bounds(month: &str) -> ServiceResult<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::parse_from_str(&format!("{}-01", month.trim()), "%Y-%m-%d")
        .map_err(|_| ServiceError::validation("month", "Expected YYYY-MM"))?;
    let next = if first.month() == 12 {
        NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
    };
    let last = next
        .and_then(|d| d.pred_opt())
        .ok_or_else(|| ServiceError::validation("month", "Month out of range"))?;
    Ok((first, last))
}

/// Patch bodies must be objects; listed keys may not be changed.
pub(crate) fn reject_immutable(patch: &Value, immutable: &[&str]) -> ServiceResult<()> {
    let object = patch
        .as_object()
        .ok_or_else(|| ServiceError::bad_request("Request body must be a JSON object"))?;
    let mut errors = FieldErrors::new();
    for key in immutable {
        if object.contains_key(*key) {
            errors.add(key, "This field cannot be changed");
        }
    }
    errors.finish()
}

/// Applies a top-level patch to `current` and decodes the result. A field
/// with the wrong shape is reported against its key and nothing is written.
pub(crate) fn apply_patch<T>(current: &T, patch: &Map<String, Value>) -> ServiceResult<T>
where
    T: Serialize + DeserializeOwned,
{
    let base = match serde_json::to_value(current).map_err(StoreError::from)? {
        Value::Object(map) => map,
        _ => return Err(ServiceError::bad_request("Document is not a JSON object")),
    };
    let decode = |entries: &[(&String, &Value)]| {
        let mut doc = base.clone();
        for (key, value) in entries {
            doc.insert((*key).clone(), (*value).clone());
        }
        serde_json::from_value::<T>(Value::Object(doc))
    };

    let entries: Vec<(&String, &Value)> = patch.iter().collect();
    decode(&entries).map_err(|err| {
        let field = entries
            .iter()
            .find(|entry| decode(std::slice::from_ref(*entry)).is_err())
            .map(|(key, _)| key.as_str())
            .unwrap_or("body");
        ServiceError::validation(field, format!("Invalid value: {}", err))
    })
}
