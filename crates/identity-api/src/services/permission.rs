//! 권한 해석기.
//!
//! 특권 작업마다 원격 권한 서비스에 역할을 묻고, 응답을 받을 수 없으면
//! 본인 한정 기본 프로필로 강등합니다. 해석은 실패하지 않습니다.

use std::sync::Arc;

use identity_core::{AccessOperation, AccountId, PermissionProfile, DEGRADED_ROLE_NAME};
use identity_permission::PermissionAuthority;
use tracing::{debug, warn};

use crate::metrics::record_permission_degraded;

/// 원격 권한 서비스 앞단의 해석기.
#[derive(Clone)]
pub struct PermissionResolver {
    authority: Arc<dyn PermissionAuthority>,
}

impl PermissionResolver {
    pub fn new(authority: Arc<dyn PermissionAuthority>) -> Self {
        Self { authority }
    }

    pub fn authority(&self) -> &Arc<dyn PermissionAuthority> {
        &self.authority
    }

    pub fn is_configured(&self) -> bool {
        self.authority.is_configured()
    }

    /// 계정의 권한 프로필을 해석합니다.
    ///
    /// 미구성 제공자는 호출 없이 강등 프로필을 반환하고,
    /// 호출 실패나 빈 역할 코드는 경고 로그와 카운터를 남긴 뒤 강등합니다.
    pub async fn resolve(&self, account_id: AccountId, operation: AccessOperation) -> PermissionProfile {
        if !self.authority.is_configured() {
            debug!(
                account_id = %account_id,
                operation = %operation,
                "Permission authority not configured, using self-service profile"
            );
            return PermissionProfile::degraded(account_id, operation);
        }

        match self.authority.get_profile(account_id).await {
            Ok(response) => match response.role_code() {
                Some(code) => {
                    let role_name = response
                        .role_name
                        .as_deref()
                        .filter(|n| !n.trim().is_empty())
                        .unwrap_or(DEGRADED_ROLE_NAME)
                        .to_string();
                    let code = code.to_string();

                    PermissionProfile::authoritative(
                        account_id,
                        code,
                        role_name,
                        response.permissions.unwrap_or_default(),
                    )
                }
                None => {
                    warn!(
                        account_id = %account_id,
                        authority = self.authority.name(),
                        "Permission authority returned no role code, degrading"
                    );
                    record_permission_degraded("empty_role");
                    PermissionProfile::degraded(account_id, operation)
                }
            },
            Err(e) => {
                warn!(
                    account_id = %account_id,
                    authority = self.authority.name(),
                    reason = e.reason(),
                    error = %e,
                    "Permission lookup failed, degrading"
                );
                record_permission_degraded(e.reason());
                PermissionProfile::degraded(account_id, operation)
            }
        }
    }
}
