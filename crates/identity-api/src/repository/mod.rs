//! 계정 저장소.
//!
//! 핸들러와 서비스는 [`AccountStore`] trait만 사용합니다.
//! 운영 환경은 PostgreSQL, 로컬 개발과 테스트는 메모리 구현을 사용합니다.

pub mod memory;
pub mod postgres;

pub use memory::InMemoryAccountStore;
pub use postgres::PgAccountStore;

use async_trait::async_trait;
use identity_core::{Account, AccountId, NewAccount, ServiceError, UniqueField};

/// 저장소 에러.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// 고유 제약 위반 (동시 가입 경합의 최종 판정)
    #[error("고유 제약 위반: {0}")]
    UniqueViolation(UniqueField),

    #[error("데이터베이스 에러: {0}")]
    Database(String),
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation(field) => ServiceError::Conflict(field),
            StoreError::Database(msg) => ServiceError::Internal(msg),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// 계정 영속화 계약.
///
/// 조회 계열은 삭제되지 않은 계정만 대상으로 합니다.
/// 물리 삭제(`delete`)는 가입 보상 처리에서만 호출됩니다.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn exists_by_username(&self, username: &str) -> StoreResult<bool>;

    async fn exists_by_email(&self, email: &str) -> StoreResult<bool>;

    async fn exists_by_phone(&self, phone: &str) -> StoreResult<bool>;

    async fn find_by_id(&self, id: AccountId) -> StoreResult<Option<Account>>;

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<Account>>;

    /// 새 계정을 저장하고 할당된 식별자로 완성된 계정을 반환합니다.
    async fn insert(&self, account: NewAccount) -> StoreResult<Account>;

    /// 이메일, 전화번호, 비밀번호 해시를 갱신합니다. 수정 시각은 저장소가 설정합니다.
    async fn update(&self, account: &Account) -> StoreResult<Account>;

    /// 계정을 물리적으로 삭제합니다. 삭제된 행이 있으면 true.
    async fn delete(&self, id: AccountId) -> StoreResult<bool>;

    /// 생성 시각 내림차순 페이지와 전체 개수.
    async fn list_page(&self, offset: i64, limit: i64) -> StoreResult<(Vec<Account>, u64)>;

    /// 저장소 연결 확인.
    async fn ping(&self) -> StoreResult<()>;

    fn name(&self) -> &'static str;
}
