//! PostgreSQL 계정 저장소.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use identity_core::{Account, AccountId, NewAccount, UniqueField};
use sqlx::PgPool;

use super::{AccountStore, StoreError, StoreResult};

const ACCOUNT_COLUMNS: &str =
    "id, username, password_hash, email, phone, created_at, updated_at, deleted";

/// `users` 테이블 행.
#[derive(Debug, Clone, sqlx::FromRow)]
struct AccountRecord {
    id: i64,
    username: String,
    password_hash: String,
    email: Option<String>,
    phone: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted: bool,
}

impl From<AccountRecord> for Account {
    fn from(r: AccountRecord) -> Self {
        Account {
            id: AccountId(r.id),
            username: r.username,
            password_hash: r.password_hash,
            email: r.email,
            phone: r.phone,
            created_at: r.created_at,
            updated_at: r.updated_at,
            deleted: r.deleted,
        }
    }
}

/// 고유 인덱스 이름으로 충돌 필드를 판별합니다.
fn unique_field_of(constraint: Option<&str>) -> UniqueField {
    match constraint {
        Some(name) if name.contains("email") => UniqueField::Email,
        Some(name) if name.contains("phone") => UniqueField::Phone,
        _ => UniqueField::Username,
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return StoreError::UniqueViolation(unique_field_of(db_err.constraint()));
            }
        }
        StoreError::Database(err.to_string())
    }
}

/// `sqlx::PgPool` 기반 저장소.
#[derive(Debug, Clone)]
pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// 내장 마이그레이션을 적용합니다.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }

    async fn exists_where(&self, column: &str, value: &str) -> StoreResult<bool> {
        let exists: bool = sqlx::query_scalar(&format!(
            "SELECT EXISTS(SELECT 1 FROM users WHERE {} = $1 AND NOT deleted)",
            column
        ))
        .bind(value)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn exists_by_username(&self, username: &str) -> StoreResult<bool> {
        self.exists_where("username", username).await
    }

    async fn exists_by_email(&self, email: &str) -> StoreResult<bool> {
        self.exists_where("email", email).await
    }

    async fn exists_by_phone(&self, phone: &str) -> StoreResult<bool> {
        self.exists_where("phone", phone).await
    }

    async fn find_by_id(&self, id: AccountId) -> StoreResult<Option<Account>> {
        let record = sqlx::query_as::<_, AccountRecord>(&format!(
            "SELECT {} FROM users WHERE id = $1 AND NOT deleted",
            ACCOUNT_COLUMNS
        ))
        .bind(id.value())
        .fetch_optional(&self.pool)
        .await?;

        Ok(record.map(Account::from))
    }

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<Account>> {
        let record = sqlx::query_as::<_, AccountRecord>(&format!(
            "SELECT {} FROM users WHERE username = $1 AND NOT deleted",
            ACCOUNT_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record.map(Account::from))
    }

    async fn insert(&self, account: NewAccount) -> StoreResult<Account> {
        let record = sqlx::query_as::<_, AccountRecord>(&format!(
            r#"
            INSERT INTO users (username, password_hash, email, phone)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            ACCOUNT_COLUMNS
        ))
        .bind(&account.username)
        .bind(&account.password_hash)
        .bind(&account.email)
        .bind(&account.phone)
        .fetch_one(&self.pool)
        .await?;

        Ok(record.into())
    }

    async fn update(&self, account: &Account) -> StoreResult<Account> {
        let record = sqlx::query_as::<_, AccountRecord>(&format!(
            r#"
            UPDATE users
            SET email = $2, phone = $3, password_hash = $4, updated_at = NOW()
            WHERE id = $1 AND NOT deleted
            RETURNING {}
            "#,
            ACCOUNT_COLUMNS
        ))
        .bind(account.id.value())
        .bind(&account.email)
        .bind(&account.phone)
        .bind(&account.password_hash)
        .fetch_one(&self.pool)
        .await?;

        Ok(record.into())
    }

    async fn delete(&self, id: AccountId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.value())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_page(&self, offset: i64, limit: i64) -> StoreResult<(Vec<Account>, u64)> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE NOT deleted")
            .fetch_one(&self.pool)
            .await?;

        let records = sqlx::query_as::<_, AccountRecord>(&format!(
            r#"
            SELECT {}
            FROM users
            WHERE NOT deleted
            ORDER BY created_at DESC, id DESC
            LIMIT $1 OFFSET $2
            "#,
            ACCOUNT_COLUMNS
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok((
            records.into_iter().map(Account::from).collect(),
            u64::try_from(total).unwrap_or(0),
        ))
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}
