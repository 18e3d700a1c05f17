//! 모든 핸들러에서 공유되는 애플리케이션 상태.
//!
//! 시작 시 한 번 구성된 뒤 읽기 전용으로 공유됩니다.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use identity_notification::LogDispatcher;
use identity_permission::PermissionAuthority;

use crate::auth::TokenAuthority;
use crate::repository::AccountStore;
use crate::services::{AccountService, PermissionResolver, RegistrationCoordinator, RegistrationMode};

/// 애플리케이션 공유 상태.
#[derive(Clone)]
pub struct AppState {
    /// 계정 저장소 (PostgreSQL 또는 메모리)
    pub store: Arc<dyn AccountStore>,

    /// JWT 발급/검증기
    pub tokens: Arc<TokenAuthority>,

    /// 권한 해석기
    pub resolver: PermissionResolver,

    /// 가입 코디네이터
    pub registration: RegistrationCoordinator,

    /// 로그인/조회/수정 서비스
    pub accounts: AccountService,

    /// 작업 로그 디스패처
    pub dispatcher: LogDispatcher,

    /// 서버 시작 시간
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// 협력 객체들로 상태를 구성합니다.
    pub fn new(
        store: Arc<dyn AccountStore>,
        authority: Arc<dyn PermissionAuthority>,
        tokens: Arc<TokenAuthority>,
        dispatcher: LogDispatcher,
        mode: RegistrationMode,
    ) -> Self {
        let resolver = PermissionResolver::new(authority.clone());
        let registration =
            RegistrationCoordinator::new(store.clone(), authority, dispatcher.clone(), mode);
        let accounts = AccountService::new(
            store.clone(),
            resolver.clone(),
            tokens.clone(),
            dispatcher.clone(),
        );

        Self {
            store,
            tokens,
            resolver,
            registration,
            accounts,
            dispatcher,
            started_at: Utc::now(),
        }
    }

    pub fn mode(&self) -> RegistrationMode {
        self.registration.mode()
    }

    /// 서버 가동 시간 (초).
    pub fn uptime_secs(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }

    /// 저장소 연결 상태 확인.
    pub async fn is_store_healthy(&self) -> bool {
        match self.store.ping().await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(store = self.store.name(), error = %e, "Store health check failed");
                false
            }
        }
    }
}

/// 테스트용 AppState 생성.
///
/// 메모리 저장소, 단독 권한 제공자, 메모리 로그 싱크를 사용합니다.
#[cfg(any(test, feature = "test-utils"))]
pub fn create_test_state() -> AppState {
    use identity_notification::MemoryLogSink;
    use identity_permission::StandaloneAuthority;
    use secrecy::SecretString;

    use crate::repository::InMemoryAccountStore;

    let tokens = TokenAuthority::new(
        &SecretString::new("test-secret-key-for-identity-api".to_string().into_boxed_str()),
        std::time::Duration::from_secs(86_400),
    )
    .expect("test token authority");

    AppState::new(
        Arc::new(InMemoryAccountStore::new()),
        Arc::new(StandaloneAuthority::new()),
        Arc::new(tokens),
        LogDispatcher::new().with_sink(Arc::new(MemoryLogSink::new())),
        RegistrationMode::Standalone,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_state_defaults() {
        let state = create_test_state();
        assert_eq!(state.mode(), RegistrationMode::Standalone);
        assert!(state.uptime_secs() >= 0);
        assert!(state.is_store_healthy().await);
        assert!(!state.resolver.is_configured());
    }
}
