use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Sqlite};
use std::env;
use std::sync::LazyLock;

use super::errors::AccountError;
use super::link_store::LinkStore;
use super::types::IdentityLink;
use crate::oauth2::Provider;

static DB_TABLE_IDENTITY_LINKS: LazyLock<String> = LazyLock::new(|| {
    env::var("SOCIAL_DB_TABLE_IDENTITY_LINKS")
        .ok()
        .unwrap_or("identity_links".to_string())
});

/// SQLite-backed [`LinkStore`].
pub struct SqliteLinkStore {
    pool: Pool<Sqlite>,
}

impl SqliteLinkStore {
    /// Connect to `url` and ensure the links table exists.
    pub async fn connect(url: &str) -> Result<Self, AccountError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(url)
            .await
            .map_err(|e| AccountError::Storage(e.to_string()))?;
        let store = Self { pool };
        store.create_tables().await?;
        Ok(store)
    }

    pub async fn from_pool(pool: Pool<Sqlite>) -> Result<Self, AccountError> {
        let store = Self { pool };
        store.create_tables().await?;
        Ok(store)
    }

    async fn create_tables(&self) -> Result<(), AccountError> {
        let table = DB_TABLE_IDENTITY_LINKS.as_str();

        sqlx::query(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {table} (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                social_id TEXT NOT NULL,
                customer_id TEXT NOT NULL,
                type TEXT NOT NULL,
                website_id INTEGER NOT NULL,
                created_at TIMESTAMP NOT NULL,
                UNIQUE(social_id, type, website_id)
            )
            "#
        ))
        .execute(&self.pool)
        .await
        .map_err(|e| AccountError::Storage(e.to_string()))?;

        // Index for the login-time lookup by customer
        sqlx::query(&format!(
            "CREATE INDEX IF NOT EXISTS idx_{table}_customer_id ON {table}(customer_id)"
        ))
        .execute(&self.pool)
        .await
        .map_err(|e| AccountError::Storage(e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl LinkStore for SqliteLinkStore {
    async fn find(
        &self,
        provider: Provider,
        external_id: &str,
        website_id: i64,
    ) -> Result<Option<IdentityLink>, AccountError> {
        let table = DB_TABLE_IDENTITY_LINKS.as_str();

        sqlx::query_as::<_, IdentityLink>(&format!(
            r#"
            SELECT * FROM {table}
            WHERE social_id = ? AND type = ? AND website_id = ?
            "#
        ))
        .bind(external_id)
        .bind(provider.as_str())
        .bind(website_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AccountError::Storage(e.to_string()))
    }

    async fn insert(&self, mut link: IdentityLink) -> Result<IdentityLink, AccountError> {
        let table = DB_TABLE_IDENTITY_LINKS.as_str();

        let result = sqlx::query(&format!(
            r#"
            INSERT INTO {table} (social_id, customer_id, type, website_id, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#
        ))
        .bind(&link.social_id)
        .bind(&link.customer_id)
        .bind(&link.link_type)
        .bind(link.website_id)
        .bind(link.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if e.as_database_error()
                .is_some_and(|db| db.is_unique_violation())
            {
                AccountError::AlreadyExists(format!("{}:{}", link.link_type, link.social_id))
            } else {
                AccountError::Storage(e.to_string())
            }
        })?;

        link.id = Some(result.last_insert_rowid());
        Ok(link)
    }
}
