//! 메모리 계정 저장소.
//!
//! 데이터베이스 URL이 없을 때와 테스트에서 사용합니다.
//! 고유 제약은 삭제되지 않은 계정 사이에서만 검사합니다.

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use identity_core::{Account, AccountId, NewAccount, UniqueField};
use tokio::sync::RwLock;

use super::{AccountStore, StoreError, StoreResult};

#[derive(Debug)]
pub struct InMemoryAccountStore {
    accounts: RwLock<Vec<Account>>,
    next_id: AtomicI64,
}

impl Default for InMemoryAccountStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self {
            accounts: RwLock::new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }

    /// 삭제 여부와 무관한 전체 행 수.
    pub async fn len(&self) -> usize {
        self.accounts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.accounts.read().await.is_empty()
    }

    /// 동일 값을 가진 다른 활성 계정이 있으면 충돌 필드를 반환합니다.
    fn conflicting_field(
        accounts: &[Account],
        exclude: Option<AccountId>,
        username: &str,
        email: Option<&str>,
        phone: Option<&str>,
    ) -> Option<UniqueField> {
        let others = || {
            accounts
                .iter()
                .filter(move |a| a.is_active() && Some(a.id) != exclude)
        };

        if others().any(|a| a.username == username) {
            return Some(UniqueField::Username);
        }
        if let Some(email) = email {
            if others().any(|a| a.email.as_deref() == Some(email)) {
                return Some(UniqueField::Email);
            }
        }
        if let Some(phone) = phone {
            if others().any(|a| a.phone.as_deref() == Some(phone)) {
                return Some(UniqueField::Phone);
            }
        }
        None
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn exists_by_username(&self, username: &str) -> StoreResult<bool> {
        let accounts = self.accounts.read().await;
        Ok(accounts.iter().any(|a| a.is_active() && a.username == username))
    }

    async fn exists_by_email(&self, email: &str) -> StoreResult<bool> {
        let accounts = self.accounts.read().await;
        Ok(accounts
            .iter()
            .any(|a| a.is_active() && a.email.as_deref() == Some(email)))
    }

    async fn exists_by_phone(&self, phone: &str) -> StoreResult<bool> {
        let accounts = self.accounts.read().await;
        Ok(accounts
            .iter()
            .any(|a| a.is_active() && a.phone.as_deref() == Some(phone)))
    }

    async fn find_by_id(&self, id: AccountId) -> StoreResult<Option<Account>> {
        let accounts = self.accounts.read().await;
        Ok(accounts.iter().find(|a| a.is_active() && a.id == id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<Account>> {
        let accounts = self.accounts.read().await;
        Ok(accounts
            .iter()
            .find(|a| a.is_active() && a.username == username)
            .cloned())
    }

    async fn insert(&self, account: NewAccount) -> StoreResult<Account> {
        let mut accounts = self.accounts.write().await;
        if let Some(field) = Self::conflicting_field(
            &accounts,
            None,
            &account.username,
            account.email.as_deref(),
            account.phone.as_deref(),
        ) {
            return Err(StoreError::UniqueViolation(field));
        }

        let id = AccountId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let account = account.into_account(id);
        accounts.push(account.clone());
        Ok(account)
    }

    async fn update(&self, account: &Account) -> StoreResult<Account> {
        let mut accounts = self.accounts.write().await;
        if let Some(field) = Self::conflicting_field(
            &accounts,
            Some(account.id),
            &account.username,
            account.email.as_deref(),
            account.phone.as_deref(),
        ) {
            return Err(StoreError::UniqueViolation(field));
        }

        let stored = accounts
            .iter_mut()
            .find(|a| a.is_active() && a.id == account.id)
            .ok_or_else(|| StoreError::Database(format!("account {} not found", account.id)))?;

        stored.email = account.email.clone();
        stored.phone = account.phone.clone();
        stored.password_hash = account.password_hash.clone();
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn delete(&self, id: AccountId) -> StoreResult<bool> {
        let mut accounts = self.accounts.write().await;
        let before = accounts.len();
        accounts.retain(|a| a.id != id);
        Ok(accounts.len() < before)
    }

    async fn list_page(&self, offset: i64, limit: i64) -> StoreResult<(Vec<Account>, u64)> {
        let accounts = self.accounts.read().await;
        let mut active: Vec<&Account> = accounts.iter().filter(|a| a.is_active()).collect();
        // 같은 시각이면 나중에 생성된 ID가 먼저
        active.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total = active.len() as u64;
        let content = active
            .into_iter()
            .skip(usize::try_from(offset.max(0)).unwrap_or(usize::MAX))
            .take(usize::try_from(limit.max(0)).unwrap_or(0))
            .cloned()
            .collect();

        Ok((content, total))
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
