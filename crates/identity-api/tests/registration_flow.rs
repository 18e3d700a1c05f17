//! 가입, 로그인, 권한 판단 흐름 통합 테스트.
//!
//! 메모리 저장소와 스크립트 권한 제공자로 서비스 계층 전체를 연결합니다.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use identity_api::repository::{AccountStore, InMemoryAccountStore};
use identity_api::services::{Registration, RegistrationError, RegistrationMode};
use identity_api::{AppState, TokenAuthority};
use identity_core::{
    AccessOperation, AccountId, AuthFailure, PageRequest, ProfileSource, ServiceError,
    UniqueField, DEGRADED_ROLE_NAME,
};
use identity_notification::{LogDispatcher, MemoryLogSink, OperationKind};
use identity_permission::{
    BindScript, PermissionAuthority, ScriptedAuthority, StandaloneAuthority,
};
use secrecy::SecretString;

struct Harness {
    state: AppState,
    store: Arc<InMemoryAccountStore>,
    logs: Arc<MemoryLogSink>,
}

fn harness(authority: Arc<dyn PermissionAuthority>, mode: RegistrationMode) -> Harness {
    let store = Arc::new(InMemoryAccountStore::new());
    let logs = Arc::new(MemoryLogSink::new());
    let tokens = TokenAuthority::new(
        &SecretString::new("integration-secret".to_string().into_boxed_str()),
        Duration::from_secs(86_400),
    )
    .unwrap();

    let state = AppState::new(
        store.clone(),
        authority,
        Arc::new(tokens),
        LogDispatcher::new().with_sink(logs.clone()),
        mode,
    );

    Harness { state, store, logs }
}

#[tokio::test]
async fn test_standalone_register_then_login_issues_day_long_token() {
    let h = harness(Arc::new(StandaloneAuthority::new()), RegistrationMode::Standalone);

    let account = h
        .state
        .registration
        .register(Registration::new("alice", "secret1"), Some("10.0.0.1".into()))
        .await
        .unwrap();
    assert_eq!(account.username, "alice");
    assert!(account.email.is_none());
    assert_ne!(account.password_hash, "secret1");

    let before = Utc::now();
    let outcome = h
        .state
        .accounts
        .login("alice", "secret1", None)
        .await
        .unwrap();

    let claims = h.state.tokens.extract_claims(&outcome.token.token).unwrap();
    assert_eq!(claims.sub, "alice");
    assert_eq!(claims.account_id(), account.id);

    let lifetime = outcome.token.expires_at - before;
    assert!(lifetime.num_seconds() >= 86_399 && lifetime.num_seconds() <= 86_401);

    let logs = h.logs.wait_for(2).await;
    assert!(logs.iter().any(|l| l.operation == OperationKind::UserRegister));
    assert!(logs.iter().any(|l| l.operation == OperationKind::UserLogin));
}

#[tokio::test]
async fn test_wrong_password_is_unauthenticated_without_token() {
    let h = harness(Arc::new(StandaloneAuthority::new()), RegistrationMode::Standalone);
    h.state
        .registration
        .register(Registration::new("alice", "secret1"), None)
        .await
        .unwrap();

    let wrong = h.state.accounts.login("alice", "wrongpass", None).await;
    assert!(matches!(
        wrong,
        Err(ServiceError::Unauthenticated(AuthFailure::BadCredentials))
    ));

    // 존재하지 않는 사용자도 같은 실패로 보입니다
    let unknown = h.state.accounts.login("nobody", "secret1", None).await;
    assert!(matches!(
        unknown,
        Err(ServiceError::Unauthenticated(AuthFailure::BadCredentials))
    ));

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(h.logs.count(OperationKind::UserLogin), 0);
}

#[tokio::test]
async fn test_self_service_role_cannot_read_other_account() {
    let authority = Arc::new(ScriptedAuthority::new().with_role("USER"));
    let h = harness(authority.clone(), RegistrationMode::Distributed);

    for i in 1..=6 {
        h.state
            .registration
            .register(Registration::new(format!("user{}", i), "secret1"), None)
            .await
            .unwrap();
    }
    assert_eq!(authority.bind_calls(), 6);

    let other = h.state.accounts.get_account(AccountId(5), AccountId(6), None).await;
    assert!(matches!(other, Err(ServiceError::Forbidden)));

    let own = h
        .state
        .accounts
        .get_account(AccountId(5), AccountId(5), None)
        .await
        .unwrap();
    assert_eq!(own.username, "user5");

    // 없는 계정이어도 권한 거부가 먼저입니다
    let missing = h.state.accounts.get_account(AccountId(5), AccountId(99), None).await;
    assert!(matches!(missing, Err(ServiceError::Forbidden)));
}

#[tokio::test]
async fn test_admin_lists_all_accounts() {
    let h = harness(
        Arc::new(ScriptedAuthority::new().with_role("ADMIN")),
        RegistrationMode::Distributed,
    );
    for name in ["alice", "bob", "carol"] {
        h.state
            .registration
            .register(Registration::new(name, "secret1"), None)
            .await
            .unwrap();
    }

    let page = h
        .state
        .accounts
        .list_accounts(AccountId(1), PageRequest::new(0, 2), None)
        .await
        .unwrap();
    assert_eq!(page.total_elements, 3);
    assert_eq!(page.content.len(), 2);
    assert_eq!(page.total_pages, 2);
}

#[tokio::test]
async fn test_rejected_role_binding_leaves_no_account() {
    let authority = Arc::new(
        ScriptedAuthority::new().with_bind(BindScript::Reject("quota exceeded".into())),
    );
    let h = harness(authority.clone(), RegistrationMode::Distributed);

    let result = h
        .state
        .registration
        .register(Registration::new("bob", "secret1"), None)
        .await;

    assert!(matches!(result, Err(RegistrationError::PartialFailure { .. })));
    assert!(h.store.find_by_username("bob").await.unwrap().is_none());
    assert!(h.store.is_empty().await);
    assert_eq!(authority.bind_calls(), 1);

    let err: ServiceError = result.unwrap_err().into();
    assert_eq!(err.code(), 500);

    // 보상 후 같은 이름으로 다시 가입할 수 있습니다
    let retry = harness(Arc::new(ScriptedAuthority::new()), RegistrationMode::Distributed);
    let retry_store = retry.store.clone();
    retry
        .state
        .registration
        .register(Registration::new("bob", "secret1"), None)
        .await
        .unwrap();
    assert_eq!(retry_store.len().await, 1);
}

#[tokio::test]
async fn test_unreachable_authority_compensates_and_degrades() {
    let authority = Arc::new(ScriptedAuthority::new().unreachable());
    let h = harness(authority.clone(), RegistrationMode::Distributed);

    let result = h
        .state
        .registration
        .register(Registration::new("bob", "secret1"), None)
        .await;
    assert!(matches!(result, Err(RegistrationError::PartialFailure { .. })));
    assert!(h.store.is_empty().await);

    let profile = h
        .state
        .resolver
        .resolve(AccountId(7), AccessOperation::Read)
        .await;
    assert_eq!(profile.source, ProfileSource::Degraded);
    assert_eq!(profile.role_code, "USER");
    assert_eq!(profile.role_name, DEGRADED_ROLE_NAME);
    assert_eq!(profile.permissions, vec!["READ_SELF".to_string()]);
    assert_eq!(authority.profile_calls(), 1);
}

#[tokio::test]
async fn test_duplicate_username_skips_remote_binding() {
    let authority = Arc::new(ScriptedAuthority::new());
    let h = harness(authority.clone(), RegistrationMode::Distributed);

    h.state
        .registration
        .register(Registration::new("alice", "secret1"), None)
        .await
        .unwrap();
    let duplicate = h
        .state
        .registration
        .register(Registration::new("alice", "other12"), None)
        .await;

    assert!(matches!(
        duplicate,
        Err(RegistrationError::Conflict(UniqueField::Username))
    ));
    assert_eq!(authority.bind_calls(), 1);
    assert_eq!(h.store.len().await, 1);
}

#[tokio::test]
async fn test_password_reset_requires_old_password() {
    let h = harness(Arc::new(StandaloneAuthority::new()), RegistrationMode::Standalone);
    let alice = h
        .state
        .registration
        .register(Registration::new("alice", "secret1"), None)
        .await
        .unwrap();

    let wrong = h
        .state
        .accounts
        .reset_password(alice.id, "nope123", "newpass1", None)
        .await;
    assert!(matches!(wrong, Err(ServiceError::Validation(_))));

    h.state
        .accounts
        .reset_password(alice.id, "secret1", "newpass1", None)
        .await
        .unwrap();

    assert!(h.state.accounts.login("alice", "secret1", None).await.is_err());
    assert!(h.state.accounts.login("alice", "newpass1", None).await.is_ok());
}
