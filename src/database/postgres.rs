use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use sqlx::{postgres::PgRow, PgPool, Row};

use crate::database::manager::DatabaseManager;
use crate::database::paths::{CollectionPath, DocPath};
use crate::database::store::{into_object, Direction, Document, DocumentStore, Query, StoreError};

/// Document store over a single JSONB table (see migrations/0001_documents.sql)
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect through the shared pool manager
    pub async fn connect() -> Result<Self, StoreError> {
        Ok(Self::new(DatabaseManager::pool().await?))
    }

    fn row_to_document(path: DocPath, row: &PgRow) -> Result<Document, StoreError> {
        let data: Value = row.try_get("data")?;
        let created_at: DateTime<Utc> = row.try_get("created_at")?;
        let updated_at: DateTime<Utc> = row.try_get("updated_at")?;
        Ok(Document {
            data: into_object(&path, data)?,
            path,
            created_at,
            updated_at,
        })
    }

    /// Builds the listing statement. Field names were validated by
    /// `Query::validate`, values always travel as bind parameters.
    /// Ids compare byte-wise, whatever the database collation.
    fn list_sql(query: &Query) -> String {
        let mut sql = String::from(
            "SELECT id, data, created_at, updated_at FROM documents WHERE collection = $1",
        );
        let mut param = 1;
        if !query.filters.is_empty() {
            param += 1;
            sql.push_str(&format!(" AND data @> ${}", param));
        }
        if query.id_from.is_some() {
            param += 1;
            sql.push_str(&format!(" AND id COLLATE \"C\" >= ${}", param));
        }
        if query.id_to.is_some() {
            param += 1;
            sql.push_str(&format!(" AND id COLLATE \"C\" <= ${}", param));
        }
        match &query.order_by {
            Some((field, Direction::Asc)) => sql.push_str(&format!(" ORDER BY data->'{}' ASC, id COLLATE \"C\" ASC", field)),
            Some((field, Direction::Desc)) => sql.push_str(&format!(" ORDER BY data->'{}' DESC, id COLLATE \"C\" DESC", field)),
            None => sql.push_str(" ORDER BY id COLLATE \"C\" ASC"),
        }
        if let Some(limit) = query.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }
        sql
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn get(&self, path: &DocPath) -> Result<Option<Document>, StoreError> {
        let row = sqlx::query(
            "SELECT data, created_at, updated_at FROM documents WHERE collection = $1 AND id = $2",
        )
        .bind(path.collection().to_string())
        .bind(path.id())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| Self::row_to_document(path.clone(), &r)).transpose()
    }

    async fn set(&self, path: &DocPath, data: Value) -> Result<Document, StoreError> {
        let data = Value::Object(into_object(path, data)?);
        let row = sqlx::query(
            r#"
            INSERT INTO documents (collection, id, data)
            VALUES ($1, $2, $3)
            ON CONFLICT (collection, id)
            DO UPDATE SET data = EXCLUDED.data, updated_at = now()
            RETURNING data, created_at, updated_at
            "#,
        )
        .bind(path.collection().to_string())
        .bind(path.id())
        .bind(&data)
        .fetch_one(&self.pool)
        .await?;

        Self::row_to_document(path.clone(), &row)
    }

    async fn create(&self, path: &DocPath, data: Value) -> Result<Document, StoreError> {
        let data = Value::Object(into_object(path, data)?);
        let row = sqlx::query(
            r#"
            INSERT INTO documents (collection, id, data)
            VALUES ($1, $2, $3)
            ON CONFLICT (collection, id) DO NOTHING
            RETURNING data, created_at, updated_at
            "#,
        )
        .bind(path.collection().to_string())
        .bind(path.id())
        .bind(&data)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(r) => Self::row_to_document(path.clone(), &r),
            None => Err(StoreError::AlreadyExists(path.to_string())),
        }
    }

    async fn merge(&self, path: &DocPath, patch: Value) -> Result<Document, StoreError> {
        let patch: Map<String, Value> = into_object(path, patch)?;
        let row = sqlx::query(
            r#"
            UPDATE documents SET data = data || $3, updated_at = now()
            WHERE collection = $1 AND id = $2
            RETURNING data, created_at, updated_at
            "#,
        )
        .bind(path.collection().to_string())
        .bind(path.id())
        .bind(Value::Object(patch))
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(r) => Self::row_to_document(path.clone(), &r),
            None => Err(StoreError::NotFound(path.to_string())),
        }
    }

    async fn delete(&self, path: &DocPath) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(path.collection().to_string())
            .bind(path.id())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }

        // Nested sub-collections are removed in a separate statement; a
        // failure here leaves orphans under a deleted parent.
        sqlx::query("DELETE FROM documents WHERE starts_with(collection, $1)")
            .bind(format!("{}/", path))
            .execute(&self.pool)
            .await?;

        Ok(true)
    }

    async fn list(&self, collection: &CollectionPath, query: &Query) -> Result<Vec<Document>, StoreError> {
        query.validate()?;
        let sql = Self::list_sql(query);

        let mut q = sqlx::query(&sql).bind(collection.to_string());
        if !query.filters.is_empty() {
            let containment: Map<String, Value> = query.filters.iter().cloned().collect();
            q = q.bind(Value::Object(containment));
        }
        if let Some(from) = &query.id_from {
            q = q.bind(from.clone());
        }
        if let Some(to) = &query.id_to {
            q = q.bind(to.clone());
        }

        let rows = q.fetch_all(&self.pool).await?;
        rows.iter()
            .map(|row| {
                let id: String = row.try_get("id")?;
                Self::row_to_document(collection.doc(&id)?, row)
            })
            .collect()
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_sql_numbers_parameters_in_order() {
        let query = Query::new()
            .where_eq("threadId", "t1")
            .id_range(Some("2025-01-01".into()), Some("2025-01-31".into()))
            .order_by("createdAt", Direction::Asc)
            .limit(10);
        let sql = PgDocumentStore::list_sql(&query);
        assert!(sql.contains("data @> $2"));
        assert!(sql.contains(r#"id COLLATE "C" >= $3"#));
        assert!(sql.contains(r#"id COLLATE "C" <= $4"#));
        assert!(sql.contains("ORDER BY data->'createdAt' ASC"));
        assert!(sql.ends_with("LIMIT 10"));
    }

    #[test]
    fn list_sql_without_filters_orders_by_id() {
        let sql = PgDocumentStore::list_sql(&Query::new().id_range(None, Some("2025-12-31".into())));
        assert!(sql.contains(r#"id COLLATE "C" <= $2"#));
        assert!(sql.ends_with(r#"ORDER BY id COLLATE "C" ASC"#));
    }
}
