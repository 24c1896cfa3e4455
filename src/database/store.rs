use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::database::paths::{CollectionPath, DocPath};

/// Errors from the tenant document store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid document path segment: {0}")]
    InvalidPath(String),

    #[error("Invalid field name: {0}")]
    InvalidField(String),

    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Document already exists: {0}")]
    AlreadyExists(String),

    #[error("Document body must be a JSON object: {0}")]
    NotAnObject(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Database(#[from] crate::database::manager::DatabaseError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// A stored document with its path and server timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub path: DocPath,
    pub data: Map<String, Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    pub fn id(&self) -> &str {
        self.path.id()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

/// Filters and ordering for a collection listing.
///
/// Equality filters compare top-level fields. The id range is inclusive on
/// both ends, which is how date-keyed sub-collections are scanned.
#[derive(Debug, Clone, Default)]
pub struct Query {
    pub filters: Vec<(String, Value)>,
    pub id_from: Option<String>,
    pub id_to: Option<String>,
    pub order_by: Option<(String, Direction)>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn where_eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.filters.push((field.to_string(), value.into()));
        self
    }

    pub fn id_range(mut self, from: Option<String>, to: Option<String>) -> Self {
        self.id_from = from;
        self.id_to = to;
        self
    }

    pub fn order_by(mut self, field: &str, direction: Direction) -> Self {
        self.order_by = Some((field.to_string(), direction));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Field names end up inside SQL for the postgres backend.
    pub fn validate(&self) -> Result<(), StoreError> {
        let fields = self
            .filters
            .iter()
            .map(|(f, _)| f.as_str())
            .chain(self.order_by.iter().map(|(f, _)| f.as_str()));
        for field in fields {
            if !is_valid_field(field) {
                return Err(StoreError::InvalidField(field.to_string()));
            }
        }
        Ok(())
    }

    /// In-process evaluation, shared by backends that cannot push filters down.
    pub fn matches(&self, id: &str, data: &Map<String, Value>) -> bool {
        if let Some(from) = &self.id_from {
            if id < from.as_str() {
                return false;
            }
        }
        if let Some(to) = &self.id_to {
            if id > to.as_str() {
                return false;
            }
        }
        self.filters
            .iter()
            .all(|(field, expected)| data.get(field) == Some(expected))
    }
}

pub fn is_valid_field(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 64
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !name.starts_with(|c: char| c.is_ascii_digit())
}

pub(crate) fn into_object(path: &DocPath, data: Value) -> Result<Map<String, Value>, StoreError> {
    match data {
        Value::Object(map) => Ok(map),
        _ => Err(StoreError::NotAnObject(path.to_string())),
    }
}

/// Hierarchical document namespace. Every call touches exactly one document
/// (or lists one collection); there are no multi-document transactions.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, path: &DocPath) -> Result<Option<Document>, StoreError>;

    /// Create or overwrite.
    async fn set(&self, path: &DocPath, data: Value) -> Result<Document, StoreError>;

    /// Create; fails with `AlreadyExists` when the document is present.
    async fn create(&self, path: &DocPath, data: Value) -> Result<Document, StoreError>;

    /// Shallow merge of top-level keys into an existing document.
    async fn merge(&self, path: &DocPath, patch: Value) -> Result<Document, StoreError>;

    async fn delete(&self, path: &DocPath) -> Result<bool, StoreError>;

    async fn list(&self, collection: &CollectionPath, query: &Query) -> Result<Vec<Document>, StoreError>;

    /// Connectivity probe used by `/health`.
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
