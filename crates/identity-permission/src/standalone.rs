//! 단독 배포용 권한 제공자.

use async_trait::async_trait;
use identity_core::AccountId;
use tracing::debug;

use crate::{
    BindRoleResponse, PermissionAuthority, PermissionCheckResponse, PermissionError,
    PermissionResult, UserPermissionResponse,
};

/// 원격 권한 서비스가 없는 배포에서 사용하는 정적 제공자.
///
/// 역할 조회와 바인딩은 항상 `NotConfigured`를 반환하고,
/// 개별 권한 확인은 항상 거부합니다.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandaloneAuthority;

impl StandaloneAuthority {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PermissionAuthority for StandaloneAuthority {
    fn name(&self) -> &str {
        "standalone"
    }

    fn is_configured(&self) -> bool {
        false
    }

    async fn bind_default_role(&self, account_id: AccountId) -> PermissionResult<BindRoleResponse> {
        debug!(account_id = %account_id, "Role binding skipped: no permission authority");
        Err(PermissionError::NotConfigured)
    }

    async fn get_profile(&self, _account_id: AccountId) -> PermissionResult<UserPermissionResponse> {
        Err(PermissionError::NotConfigured)
    }

    async fn check_permission(
        &self,
        _account_id: AccountId,
        _permission: &str,
    ) -> PermissionResult<PermissionCheckResponse> {
        Ok(PermissionCheckResponse {
            has_permission: Some(false),
            message: Some("권한 서비스가 구성되지 않았습니다".to_string()),
        })
    }
}
