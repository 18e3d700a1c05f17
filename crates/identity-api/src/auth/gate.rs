//! 접근 게이트.
//!
//! 역할 등급과 대상 계정으로 허용/거부를 결정합니다.
//! `ADMIN`/`SUPER_ADMIN`은 항상 허용, 그 외 역할은 본인 계정만 허용합니다.

use identity_core::{AccessOperation, AccountId, PermissionProfile, RoleTier};

/// 접근 판단 결과.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Allow,
    Deny,
}

impl AccessDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, AccessDecision::Allow)
    }
}

/// 목록 조회 범위.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingScope {
    /// 전체 계정 (생성 시각 내림차순 페이지)
    All,
    /// 요청자 본인만
    SelfOnly,
}

/// 단일 계정 작업의 허용 여부를 판단합니다.
///
/// 작업 종류는 판단에 영향을 주지 않지만 감사 로그용으로 받습니다.
pub fn authorize(
    requester: AccountId,
    profile: &PermissionProfile,
    target: AccountId,
    operation: AccessOperation,
) -> AccessDecision {
    let decision = match profile.tier() {
        RoleTier::Elevated => AccessDecision::Allow,
        RoleTier::SelfService if requester == target => AccessDecision::Allow,
        RoleTier::SelfService => AccessDecision::Deny,
    };

    tracing::debug!(
        requester = %requester,
        target = %target,
        role = %profile.role_code,
        degraded = profile.is_degraded(),
        operation = %operation,
        ?decision,
        "Access decision"
    );

    decision
}

/// 목록 조회 범위를 결정합니다.
pub fn listing_scope(profile: &PermissionProfile) -> ListingScope {
    match profile.tier() {
        RoleTier::Elevated => ListingScope::All,
        RoleTier::SelfService => ListingScope::SelfOnly,
    }
}
