//! 권한 프로필과 역할 등급.
//!
//! 역할 코드와 권한 집합의 원본은 원격 권한 서비스입니다.
//! 이 서비스는 조회 결과를 요청 단위로만 보관하며 저장하지 않습니다.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::AccountId;

/// 일반 사용자 역할 코드.
pub const ROLE_USER: &str = "USER";
/// 관리자 역할 코드.
pub const ROLE_ADMIN: &str = "ADMIN";
/// 최고 관리자 역할 코드.
pub const ROLE_SUPER_ADMIN: &str = "SUPER_ADMIN";

/// 강등 프로필의 역할 이름.
pub const DEGRADED_ROLE_NAME: &str = "일반 사용자";

/// 본인 정보 조회 권한.
pub const PERMISSION_READ_SELF: &str = "READ_SELF";
/// 본인 정보 수정 권한.
pub const PERMISSION_UPDATE_SELF: &str = "UPDATE_SELF";

/// 권한 판단이 필요한 작업 종류.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessOperation {
    /// 조회 (목록 포함)
    Read,
    /// 수정
    Update,
}

impl AccessOperation {
    /// 강등 시 부여되는 본인 한정 권한.
    pub fn self_service_permission(&self) -> &'static str {
        match self {
            Self::Read => PERMISSION_READ_SELF,
            Self::Update => PERMISSION_UPDATE_SELF,
        }
    }
}

impl fmt::Display for AccessOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => write!(f, "read"),
            Self::Update => write!(f, "update"),
        }
    }
}

/// 접근 제어에 쓰이는 역할 등급.
///
/// 역할 코드 비교는 대소문자를 구분합니다. `ADMIN`, `SUPER_ADMIN` 외의
/// 모든 코드(알 수 없는 코드 포함)는 본인 한정 등급입니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum RoleTier {
    SelfService,
    Elevated,
}

impl RoleTier {
    pub fn of(role_code: &str) -> Self {
        match role_code {
            ROLE_ADMIN | ROLE_SUPER_ADMIN => Self::Elevated,
            _ => Self::SelfService,
        }
    }

    pub fn is_elevated(&self) -> bool {
        matches!(self, Self::Elevated)
    }
}

/// 프로필의 출처.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum ProfileSource {
    /// 원격 권한 서비스에서 조회됨
    Authoritative,
    /// 권한 서비스를 사용할 수 없어 로컬에서 생성됨
    Degraded,
}

/// 한 계정의 역할과 권한 집합.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionProfile {
    pub account_id: AccountId,
    pub role_code: String,
    pub role_name: String,
    /// 중복 없는 권한 코드 (원격 응답 순서 유지)
    pub permissions: Vec<String>,
    pub source: ProfileSource,
}

impl PermissionProfile {
    /// 원격 권한 서비스 응답으로 프로필을 생성합니다.
    pub fn authoritative(
        account_id: AccountId,
        role_code: impl Into<String>,
        role_name: impl Into<String>,
        permissions: impl IntoIterator<Item = String>,
    ) -> Self {
        let mut unique: Vec<String> = Vec::new();
        for permission in permissions {
            if !unique.contains(&permission) {
                unique.push(permission);
            }
        }

        Self {
            account_id,
            role_code: role_code.into(),
            role_name: role_name.into(),
            permissions: unique,
            source: ProfileSource::Authoritative,
        }
    }

    /// 작업 종류에 맞는 본인 한정 강등 프로필을 생성합니다.
    pub fn degraded(account_id: AccountId, operation: AccessOperation) -> Self {
        Self {
            account_id,
            role_code: ROLE_USER.to_string(),
            role_name: DEGRADED_ROLE_NAME.to_string(),
            permissions: vec![operation.self_service_permission().to_string()],
            source: ProfileSource::Degraded,
        }
    }

    pub fn tier(&self) -> RoleTier {
        RoleTier::of(&self.role_code)
    }

    pub fn is_degraded(&self) -> bool {
        self.source == ProfileSource::Degraded
    }

    pub fn has_permission(&self, code: &str) -> bool {
        self.permissions.iter().any(|p| p == code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_role_tier_is_case_sensitive() {
        assert_eq!(RoleTier::of("ADMIN"), RoleTier::Elevated);
        assert_eq!(RoleTier::of("SUPER_ADMIN"), RoleTier::Elevated);
        assert_eq!(RoleTier::of("USER"), RoleTier::SelfService);
        assert_eq!(RoleTier::of("admin"), RoleTier::SelfService);
        assert_eq!(RoleTier::of(""), RoleTier::SelfService);
    }

    #[test]
    fn test_degraded_profile_per_operation() {
        let read = PermissionProfile::degraded(AccountId(3), AccessOperation::Read);
        assert_eq!(read.role_code, ROLE_USER);
        assert_eq!(read.role_name, DEGRADED_ROLE_NAME);
        assert_eq!(read.permissions, vec![PERMISSION_READ_SELF.to_string()]);
        assert!(read.is_degraded());
        assert_eq!(read.tier(), RoleTier::SelfService);

        let update = PermissionProfile::degraded(AccountId(3), AccessOperation::Update);
        assert!(update.has_permission(PERMISSION_UPDATE_SELF));
        assert!(!update.has_permission(PERMISSION_READ_SELF));
    }

    #[test]
    fn test_authoritative_deduplicates_in_order() {
        let profile = PermissionProfile::authoritative(
            AccountId(1),
            ROLE_ADMIN,
            "관리자",
            vec![
                "USER:READ:ALL".to_string(),
                "USER:UPDATE:ALL".to_string(),
                "USER:READ:ALL".to_string(),
            ],
        );
        assert_eq!(profile.permissions, vec!["USER:READ:ALL", "USER:UPDATE:ALL"]);
        assert!(!profile.is_degraded());
        assert!(profile.tier().is_elevated());
    }

    proptest! {
        #[test]
        fn prop_only_admin_codes_are_elevated(code in "[A-Za-z_]{0,16}") {
            let elevated = code == ROLE_ADMIN || code == ROLE_SUPER_ADMIN;
            prop_assert_eq!(RoleTier::of(&code).is_elevated(), elevated);
        }
    }
}
