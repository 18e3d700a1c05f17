//! 미리 정한 응답을 돌려주는 테스트용 권한 제공자.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use identity_core::AccountId;

use crate::{
    BindRoleResponse, PermissionAuthority, PermissionCheckResponse, PermissionError,
    PermissionResult, UserPermissionResponse,
};

/// 역할 바인딩 응답 시나리오.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindScript {
    /// `success=true`
    Succeed,
    /// `success=false`와 메시지
    Reject(String),
    /// 전송 계층 장애
    Unreachable,
    /// 제한 시간 초과
    TimedOut,
}

/// 역할 조회 응답 시나리오.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileScript {
    Role {
        code: String,
        name: String,
        permissions: Vec<String>,
    },
    /// 역할 코드가 빈 응답
    EmptyRole,
    Unreachable,
    /// 2xx가 아닌 응답
    ServerError(u16),
}

/// 구성된 원격 권한 서비스처럼 동작하는 스크립트 제공자.
#[derive(Debug)]
pub struct ScriptedAuthority {
    bind: BindScript,
    profile: ProfileScript,
    bind_calls: AtomicUsize,
    profile_calls: AtomicUsize,
    bound: Mutex<Vec<AccountId>>,
}

impl Default for ScriptedAuthority {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedAuthority {
    /// 바인딩 성공, `USER` 역할을 돌려주는 제공자.
    pub fn new() -> Self {
        Self {
            bind: BindScript::Succeed,
            profile: ProfileScript::Role {
                code: "USER".to_string(),
                name: "일반 사용자".to_string(),
                permissions: vec!["READ_SELF".to_string(), "UPDATE_SELF".to_string()],
            },
            bind_calls: AtomicUsize::new(0),
            profile_calls: AtomicUsize::new(0),
            bound: Mutex::new(Vec::new()),
        }
    }

    pub fn with_bind(mut self, bind: BindScript) -> Self {
        self.bind = bind;
        self
    }

    pub fn with_profile(mut self, profile: ProfileScript) -> Self {
        self.profile = profile;
        self
    }

    /// 주어진 역할 코드를 돌려주도록 설정합니다.
    pub fn with_role(self, code: &str) -> Self {
        self.with_profile(ProfileScript::Role {
            code: code.to_string(),
            name: code.to_string(),
            permissions: Vec::new(),
        })
    }

    /// 모든 호출이 전송 장애로 실패하도록 설정합니다.
    pub fn unreachable(self) -> Self {
        self.with_bind(BindScript::Unreachable)
            .with_profile(ProfileScript::Unreachable)
    }

    pub fn bind_calls(&self) -> usize {
        self.bind_calls.load(Ordering::SeqCst)
    }

    pub fn profile_calls(&self) -> usize {
        self.profile_calls.load(Ordering::SeqCst)
    }

    /// 바인딩에 성공한 계정 목록.
    pub fn bound_accounts(&self) -> Vec<AccountId> {
        self.bound.lock().map(|b| b.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl PermissionAuthority for ScriptedAuthority {
    fn name(&self) -> &str {
        "scripted"
    }

    fn is_configured(&self) -> bool {
        true
    }

    async fn bind_default_role(&self, account_id: AccountId) -> PermissionResult<BindRoleResponse> {
        self.bind_calls.fetch_add(1, Ordering::SeqCst);

        match &self.bind {
            BindScript::Succeed => {
                if let Ok(mut bound) = self.bound.lock() {
                    bound.push(account_id);
                }
                Ok(BindRoleResponse {
                    success: Some(true),
                    message: None,
                    role_code: Some("USER".to_string()),
                })
            }
            BindScript::Reject(message) => Ok(BindRoleResponse {
                success: Some(false),
                message: Some(message.clone()),
                role_code: None,
            }),
            BindScript::Unreachable => Err(PermissionError::Network("connection refused".into())),
            BindScript::TimedOut => Err(PermissionError::Timeout("deadline exceeded".into())),
        }
    }

    async fn get_profile(&self, account_id: AccountId) -> PermissionResult<UserPermissionResponse> {
        self.profile_calls.fetch_add(1, Ordering::SeqCst);

        match &self.profile {
            ProfileScript::Role {
                code,
                name,
                permissions,
            } => Ok(UserPermissionResponse {
                user_id: Some(account_id.value()),
                role_code: Some(code.clone()),
                role_name: Some(name.clone()),
                permissions: Some(permissions.clone()),
            }),
            ProfileScript::EmptyRole => Ok(UserPermissionResponse {
                user_id: Some(account_id.value()),
                role_code: Some(String::new()),
                role_name: None,
                permissions: None,
            }),
            ProfileScript::Unreachable => Err(PermissionError::Network("connection refused".into())),
            ProfileScript::ServerError(status) => Err(PermissionError::Remote {
                status: *status,
                message: "scripted failure".into(),
            }),
        }
    }

    async fn check_permission(
        &self,
        account_id: AccountId,
        permission: &str,
    ) -> PermissionResult<PermissionCheckResponse> {
        let profile = self.get_profile(account_id).await?;
        let granted = profile
            .permissions
            .unwrap_or_default()
            .iter()
            .any(|p| p == permission);

        Ok(PermissionCheckResponse {
            has_permission: Some(granted),
            message: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripts_are_followed() {
        let authority = ScriptedAuthority::new().with_bind(BindScript::Reject("quota".into()));
        let bind = authority.bind_default_role(AccountId(3)).await.unwrap();
        assert!(!bind.is_success());
        assert_eq!(authority.bind_calls(), 1);
        assert!(authority.bound_accounts().is_empty());

        let profile = authority.get_profile(AccountId(3)).await.unwrap();
        assert_eq!(profile.role_code(), Some("USER"));

        let check = authority
            .check_permission(AccountId(3), "READ_SELF")
            .await
            .unwrap();
        assert!(check.is_granted());
        assert_eq!(authority.profile_calls(), 2);
    }

    #[tokio::test]
    async fn test_unreachable_is_transient() {
        let authority = ScriptedAuthority::new().unreachable();
        let err = authority.get_profile(AccountId(1)).await.unwrap_err();
        assert!(err.is_transient());
    }
}
