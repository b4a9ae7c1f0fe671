use anyhow::{Context, Result};
use shared::domain::TaskDocument;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};
use uuid::Uuid;

/// SQLite-backed keyed document collections.
#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

/// A document as persisted. Columns are nullable so that partially written
/// documents survive a round trip; readers decide on defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredDocument {
    pub id: String,
    pub title: Option<String>,
    pub body: Option<String>,
    pub created_at: Option<String>,
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        // Every connection to `sqlite::memory:` opens a distinct database.
        let max_connections = if is_memory_url(database_url) { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(connect_options)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    /// Inserts a document and returns the identity assigned to it.
    pub async fn add_document(&self, collection: &str, document: &TaskDocument) -> Result<String> {
        let id = Uuid::new_v4().simple().to_string();
        sqlx::query(
            "INSERT INTO documents (collection, id, title, body, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(collection)
        .bind(&id)
        .bind(&document.title)
        .bind(&document.body)
        .bind(&document.created_at)
        .execute(&self.pool)
        .await
        .with_context(|| format!("failed to insert document into '{collection}'"))?;
        Ok(id)
    }

    /// Lists every document of a collection in insertion order.
    pub async fn list_documents(&self, collection: &str) -> Result<Vec<StoredDocument>> {
        let rows = sqlx::query(
            "SELECT id, title, body, created_at FROM documents WHERE collection = ?1 ORDER BY seq ASC",
        )
        .bind(collection)
        .fetch_all(&self.pool)
        .await
        .with_context(|| format!("failed to list documents of '{collection}'"))?;

        Ok(rows
            .into_iter()
            .map(|row| StoredDocument {
                id: row.get("id"),
                title: row.get("title"),
                body: row.get("body"),
                created_at: row.get("created_at"),
            })
            .collect())
    }

    pub async fn load_document(&self, collection: &str, id: &str) -> Result<Option<StoredDocument>> {
        let row = sqlx::query(
            "SELECT id, title, body, created_at FROM documents WHERE collection = ?1 AND id = ?2",
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| StoredDocument {
            id: row.get("id"),
            title: row.get("title"),
            body: row.get("body"),
            created_at: row.get("created_at"),
        }))
    }

    /// Returns `true` when a document was removed.
    pub async fn delete_document(&self, collection: &str, id: &str) -> Result<bool> {
        let deleted = sqlx::query("DELETE FROM documents WHERE collection = ?1 AND id = ?2")
            .bind(collection)
            .bind(id)
            .execute(&self.pool)
            .await
            .with_context(|| format!("failed to delete document '{id}' from '{collection}'"))?
            .rows_affected();
        Ok(deleted > 0)
    }

    /// Patches `title` and/or `body`. `None` leaves the column as is.
    /// Returns `false` when no such document exists.
    pub async fn update_fields(
        &self,
        collection: &str,
        id: &str,
        title: Option<&str>,
        body: Option<&str>,
    ) -> Result<bool> {
        let updated = sqlx::query(
            r#"
            UPDATE documents
            SET title = COALESCE(?3, title),
                body = COALESCE(?4, body)
            WHERE collection = ?1 AND id = ?2
            "#,
        )
        .bind(collection)
        .bind(id)
        .bind(title)
        .bind(body)
        .execute(&self.pool)
        .await
        .with_context(|| format!("failed to update document '{id}' in '{collection}'"))?
        .rows_affected();
        Ok(updated > 0)
    }
}

fn is_memory_url(database_url: &str) -> bool {
    database_url.starts_with("sqlite::memory:") || database_url.contains("mode=memory")
}

/// Creates the directory holding a file-backed database. Memory and
/// non-SQLite URLs are left alone.
fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    match sqlite_path(database_url).as_deref().and_then(Path::parent) {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent)
            .with_context(|| {
                format!(
                    "cannot create directory '{}' for database '{database_url}'",
                    parent.display()
                )
            }),
        _ => Ok(()),
    }
}

/// Filesystem path of a `sqlite:` URL, without query parameters.
fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if is_memory_url(database_url) {
        return None;
    }
    let rest = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))?;
    let path = rest.split_once('?').map_or(rest, |(path, _)| path);
    (!path.is_empty()).then(|| PathBuf::from(path))
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
