//! 권한 서비스 trait 정의.

use async_trait::async_trait;
use identity_core::AccountId;

use crate::{BindRoleResponse, PermissionCheckResponse, PermissionError, UserPermissionResponse};

/// 권한 서비스 작업을 위한 Result 타입.
pub type PermissionResult<T> = Result<T, PermissionError>;

/// 원격 권한 서비스 RPC 계약.
///
/// 구현체는 시작 시점에 한 번 선택됩니다 (HTTP 클라이언트 또는 단독 제공자).
#[async_trait]
pub trait PermissionAuthority: Send + Sync {
    /// 구현체 이름 반환.
    fn name(&self) -> &str;

    /// 원격 권한 서비스가 구성되어 있는지 여부.
    ///
    /// false면 호출자는 원격 호출 없이 바로 강등 기본값을 사용합니다.
    fn is_configured(&self) -> bool;

    /// 새 계정에 기본 역할을 바인딩합니다.
    async fn bind_default_role(&self, account_id: AccountId) -> PermissionResult<BindRoleResponse>;

    /// 계정의 역할과 권한 집합을 조회합니다.
    async fn get_profile(&self, account_id: AccountId) -> PermissionResult<UserPermissionResponse>;

    /// 계정이 특정 권한 코드를 가졌는지 확인합니다.
    async fn check_permission(
        &self,
        account_id: AccountId,
        permission: &str,
    ) -> PermissionResult<PermissionCheckResponse>;
}
