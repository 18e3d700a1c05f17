//! 계정 서비스.
//!
//! 로그인, 목록/단건 조회, 프로필 수정, 비밀번호 변경을 담당합니다.
//! 특권 작업은 모두 권한 해석 → 접근 게이트 순서로 판단합니다.

use std::sync::Arc;

use identity_core::{
    AccessOperation, Account, AccountId, AuthFailure, Page, PageRequest, ServiceError,
    ServiceResult, UniqueField,
};
use identity_notification::{LogDispatcher, OperationKind, OperationLog};
use tracing::{info, warn};

use crate::auth::{
    authorize, hash_password, listing_scope, password_matches, validate_password_length,
    IssuedToken, ListingScope, TokenAuthority,
};
use crate::metrics::record_login;
use crate::repository::AccountStore;
use crate::services::PermissionResolver;

/// 로그인 결과.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub account: Account,
    pub token: IssuedToken,
}

/// 프로필 수정 요청. `None` 필드는 변경하지 않습니다.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountChanges {
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn AccountStore>,
    resolver: PermissionResolver,
    tokens: Arc<TokenAuthority>,
    dispatcher: LogDispatcher,
}

impl AccountService {
    pub fn new(
        store: Arc<dyn AccountStore>,
        resolver: PermissionResolver,
        tokens: Arc<TokenAuthority>,
        dispatcher: LogDispatcher,
    ) -> Self {
        Self {
            store,
            resolver,
            tokens,
            dispatcher,
        }
    }

    /// 사용자명/비밀번호로 로그인하고 토큰을 발급합니다.
    ///
    /// 없는 사용자와 틀린 비밀번호는 같은 에러로 응답합니다.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        client_ip: Option<String>,
    ) -> ServiceResult<LoginOutcome> {
        let account = match self.store.find_by_username(username).await? {
            Some(account) if password_matches(password, &account.password_hash) => account,
            found => {
                warn!(
                    username = %username,
                    known_user = found.is_some(),
                    "Login rejected"
                );
                record_login("rejected");
                return Err(ServiceError::Unauthenticated(AuthFailure::BadCredentials));
            }
        };

        let token = self
            .tokens
            .issue(account.id, &account.username)
            .map_err(|e| ServiceError::internal(format!("token issuance failed: {}", e)))?;

        info!(account_id = %account.id, username = %account.username, "Login succeeded");
        record_login("success");

        self.dispatcher.notify(
            OperationLog::new(OperationKind::UserLogin, "로그인")
                .with_user(account.id, account.username.clone())
                .with_ip(client_ip),
        );

        Ok(LoginOutcome { account, token })
    }

    /// 계정 목록을 조회합니다.
    ///
    /// 관리자는 전체 페이지, 그 외 역할은 본인 계정만 담긴 페이지를 받습니다.
    pub async fn list_accounts(
        &self,
        requester: AccountId,
        request: PageRequest,
        client_ip: Option<String>,
    ) -> ServiceResult<Page<Account>> {
        let profile = self.resolver.resolve(requester, AccessOperation::Read).await;
        let scope = listing_scope(&profile);

        let scope_label = match scope {
            ListingScope::All => "all",
            ListingScope::SelfOnly => "self",
        };

        let page = match scope {
            ListingScope::All => {
                let (content, total) = self
                    .store
                    .list_page(request.offset(), request.limit())
                    .await?;
                Page::new(content, request, total)
            }
            ListingScope::SelfOnly => match self.store.find_by_id(requester).await? {
                Some(own) => Page::single(own, request),
                None => Page::empty(request),
            },
        };

        self.dispatcher.notify(
            OperationLog::new(OperationKind::UserQuery, "사용자 목록 조회")
                .with_user_id(requester)
                .with_ip(client_ip)
                .with_extra(serde_json::json!({
                    "page": request.page,
                    "size": request.size,
                    "scope": scope_label,
                })),
        );

        Ok(page)
    }

    /// 단일 계정을 조회합니다. 권한 거부가 존재 여부보다 먼저 판단됩니다.
    pub async fn get_account(
        &self,
        requester: AccountId,
        target: AccountId,
        client_ip: Option<String>,
    ) -> ServiceResult<Account> {
        let profile = self.resolver.resolve(requester, AccessOperation::Read).await;
        if !authorize(requester, &profile, target, AccessOperation::Read).is_allowed() {
            return Err(ServiceError::Forbidden);
        }

        let account = self
            .store
            .find_by_id(target)
            .await?
            .ok_or(ServiceError::NotFound)?;

        self.dispatcher.notify(
            OperationLog::new(OperationKind::UserQuery, "사용자 정보 조회")
                .with_user_id(requester)
                .with_ip(client_ip)
                .with_extra(serde_json::json!({ "targetUserId": target })),
        );

        Ok(account)
    }

    /// 이메일/전화번호를 수정합니다.
    ///
    /// 값이 실제로 바뀐 필드만 중복 확인 후 반영하며,
    /// 바뀐 것이 없으면 저장하지 않습니다.
    pub async fn update_account(
        &self,
        requester: AccountId,
        target: AccountId,
        changes: AccountChanges,
        client_ip: Option<String>,
    ) -> ServiceResult<Account> {
        let profile = self
            .resolver
            .resolve(requester, AccessOperation::Update)
            .await;
        if !authorize(requester, &profile, target, AccessOperation::Update).is_allowed() {
            return Err(ServiceError::Forbidden);
        }

        let mut account = self
            .store
            .find_by_id(target)
            .await?
            .ok_or(ServiceError::NotFound)?;

        let mut changed: Vec<&'static str> = Vec::new();

        if let Some(email) = changes.email {
            if account.email.as_deref() != Some(email.as_str()) {
                if self.store.exists_by_email(&email).await? {
                    return Err(ServiceError::Conflict(UniqueField::Email));
                }
                account.email = Some(email);
                changed.push(UniqueField::Email.as_str());
            }
        }

        if let Some(phone) = changes.phone {
            if account.phone.as_deref() != Some(phone.as_str()) {
                if self.store.exists_by_phone(&phone).await? {
                    return Err(ServiceError::Conflict(UniqueField::Phone));
                }
                account.phone = Some(phone);
                changed.push(UniqueField::Phone.as_str());
            }
        }

        // 변경 사항이 없으면 저장도 로그도 남기지 않음
        if changed.is_empty() {
            return Ok(account);
        }

        account = self.store.update(&account).await?;
        info!(
            requester = %requester,
            target = %target,
            fields = ?changed,
            "Account updated"
        );

        self.dispatcher.notify(
            OperationLog::new(OperationKind::UserUpdate, "사용자 정보 수정")
                .with_user(account.id, account.username.clone())
                .with_ip(client_ip)
                .with_extra(serde_json::json!({
                    "operatorId": requester,
                    "changedFields": changed,
                })),
        );

        Ok(account)
    }

    /// 요청자 본인의 비밀번호를 변경합니다.
    pub async fn reset_password(
        &self,
        requester: AccountId,
        old_password: &str,
        new_password: &str,
        client_ip: Option<String>,
    ) -> ServiceResult<()> {
        let mut account = self
            .store
            .find_by_id(requester)
            .await?
            .ok_or(ServiceError::NotFound)?;

        if !password_matches(old_password, &account.password_hash) {
            warn!(account_id = %requester, "Password reset rejected: old password mismatch");
            return Err(ServiceError::validation("기존 비밀번호가 올바르지 않습니다"));
        }

        validate_password_length(new_password).map_err(ServiceError::validation)?;
        account.password_hash = hash_password(new_password)
            .map_err(|e| ServiceError::internal(format!("password hashing failed: {}", e)))?;
        let account = self.store.update(&account).await?;

        info!(account_id = %account.id, "Password changed");

        self.dispatcher.notify(
            OperationLog::new(OperationKind::PasswordReset, "비밀번호 변경")
                .with_user(account.id, account.username.clone())
                .with_ip(client_ip),
        );

        Ok(())
    }
}
