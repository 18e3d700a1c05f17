//! 가입 코디네이터.
//!
//! 로컬 계정 생성과 원격 역할 바인딩을 하나의 작업 단위로 처리합니다.
//! 원격 단계가 실패하면 방금 만든 계정을 삭제하는 보상 처리를 수행합니다.
//!
//! # 처리 순서 (분산 모드)
//!
//! 1. 사용자명 → 이메일 → 전화번호 순으로 중복 확인 (부작용 없음)
//! 2. 비밀번호 해싱 후 계정 저장
//! 3. 기본 역할 바인딩 요청
//! 4. 바인딩 거절/전송 실패/시간 초과 → 계정 삭제 후 `PartialFailure`

use std::fmt;
use std::sync::Arc;

use identity_core::{Account, AccountId, DeploymentMode, NewAccount, ServiceError, UniqueField};
use identity_notification::{LogDispatcher, OperationKind, OperationLog};
use identity_permission::PermissionAuthority;
use tracing::{error, info, warn};

use crate::auth::{hash_password, validate_password_length};
use crate::metrics::{record_registration, record_registration_compensation};
use crate::repository::{AccountStore, StoreError};

/// 가입 처리 방식.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationMode {
    /// 계정 저장 후 원격 역할 바인딩까지 수행
    Distributed,
    /// 로컬 계정만 생성
    Standalone,
}

impl RegistrationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Distributed => "distributed",
            Self::Standalone => "standalone",
        }
    }
}

impl fmt::Display for RegistrationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<DeploymentMode> for RegistrationMode {
    fn from(mode: DeploymentMode) -> Self {
        match mode {
            DeploymentMode::Distributed => Self::Distributed,
            DeploymentMode::Standalone => Self::Standalone,
        }
    }
}

/// 가입 요청.
#[derive(Clone)]
pub struct Registration {
    pub username: String,
    pub password: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("phone", &self.phone)
            .finish_non_exhaustive()
    }
}

impl Registration {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            email: None,
            phone: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }
}

/// 가입 실패.
#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    /// 입력 정책 위반
    #[error("{0}")]
    Invalid(&'static str),

    #[error("중복된 {0}")]
    Conflict(UniqueField),

    /// 원격 단계 실패 후 보상 처리됨
    #[error("계정 {account_id} 역할 바인딩 실패: {reason}")]
    PartialFailure { account_id: AccountId, reason: String },

    #[error("비밀번호 해싱 실패")]
    Hashing,

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for RegistrationError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation(field) => Self::Conflict(field),
            other => Self::Store(other),
        }
    }
}

impl From<RegistrationError> for ServiceError {
    fn from(err: RegistrationError) -> Self {
        match err {
            RegistrationError::Invalid(msg) => ServiceError::validation(msg),
            RegistrationError::Conflict(field) => ServiceError::Conflict(field),
            RegistrationError::PartialFailure { reason, .. } => {
                ServiceError::PartialFailure { reason }
            }
            RegistrationError::Hashing => ServiceError::internal("password hashing failed"),
            RegistrationError::Store(e) => e.into(),
        }
    }
}

impl RegistrationError {
    fn metric_label(&self) -> &'static str {
        match self {
            Self::Invalid(_) => "invalid",
            Self::Conflict(_) => "conflict",
            Self::PartialFailure { .. } => "partial_failure",
            Self::Hashing | Self::Store(_) => "error",
        }
    }
}

/// 가입 코디네이터.
#[derive(Clone)]
pub struct RegistrationCoordinator {
    store: Arc<dyn AccountStore>,
    authority: Arc<dyn PermissionAuthority>,
    dispatcher: LogDispatcher,
    mode: RegistrationMode,
}

impl RegistrationCoordinator {
    pub fn new(
        store: Arc<dyn AccountStore>,
        authority: Arc<dyn PermissionAuthority>,
        dispatcher: LogDispatcher,
        mode: RegistrationMode,
    ) -> Self {
        Self {
            store,
            authority,
            dispatcher,
            mode,
        }
    }

    pub fn mode(&self) -> RegistrationMode {
        self.mode
    }

    /// 계정을 생성합니다.
    pub async fn register(
        &self,
        registration: Registration,
        client_ip: Option<String>,
    ) -> Result<Account, RegistrationError> {
        let result = self.register_inner(registration, client_ip).await;
        match &result {
            Ok(_) => record_registration(self.mode.as_str(), "success"),
            Err(e) => record_registration(self.mode.as_str(), e.metric_label()),
        }
        result
    }

    async fn register_inner(
        &self,
        registration: Registration,
        client_ip: Option<String>,
    ) -> Result<Account, RegistrationError> {
        validate_password_length(&registration.password).map_err(RegistrationError::Invalid)?;
        self.ensure_unique(&registration).await?;

        let password_hash =
            hash_password(&registration.password).map_err(|_| RegistrationError::Hashing)?;

        let account = self
            .store
            .insert(NewAccount {
                username: registration.username,
                password_hash,
                email: registration.email,
                phone: registration.phone,
            })
            .await?;

        if self.mode == RegistrationMode::Distributed {
            self.bind_role_or_compensate(&account).await?;
        }

        info!(
            account_id = %account.id,
            username = %account.username,
            mode = %self.mode,
            "Account registered"
        );

        self.dispatcher.notify(
            OperationLog::new(OperationKind::UserRegister, "회원가입")
                .with_user(account.id, account.username.clone())
                .with_ip(client_ip)
                .with_extra(serde_json::json!({ "mode": self.mode.as_str() })),
        );

        Ok(account)
    }

    /// 사용자명, 이메일, 전화번호 순으로 중복을 확인합니다.
    async fn ensure_unique(&self, registration: &Registration) -> Result<(), RegistrationError> {
        if self.store.exists_by_username(&registration.username).await? {
            return Err(RegistrationError::Conflict(UniqueField::Username));
        }
        if let Some(email) = registration.email.as_deref() {
            if self.store.exists_by_email(email).await? {
                return Err(RegistrationError::Conflict(UniqueField::Email));
            }
        }
        if let Some(phone) = registration.phone.as_deref() {
            if self.store.exists_by_phone(phone).await? {
                return Err(RegistrationError::Conflict(UniqueField::Phone));
            }
        }
        Ok(())
    }

    async fn bind_role_or_compensate(&self, account: &Account) -> Result<(), RegistrationError> {
        let reason = match self.authority.bind_default_role(account.id).await {
            Ok(response) if response.is_success() => return Ok(()),
            Ok(response) => response
                .message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| "role binding rejected".to_string()),
            Err(e) => e.to_string(),
        };

        warn!(
            account_id = %account.id,
            username = %account.username,
            reason = %reason,
            "Role binding failed, compensating"
        );
        self.compensate(account.id).await;

        Err(RegistrationError::PartialFailure {
            account_id: account.id,
            reason,
        })
    }

    /// 방금 생성한 계정을 삭제합니다. 실패해도 호출자에게는 `PartialFailure`가 그대로 전달됩니다.
    async fn compensate(&self, account_id: AccountId) {
        match self.store.delete(account_id).await {
            Ok(true) => record_registration_compensation("deleted"),
            Ok(false) => {
                warn!(account_id = %account_id, "Compensation found no account to delete");
                record_registration_compensation("missing");
            }
            Err(e) => {
                error!(
                    account_id = %account_id,
                    error = %e,
                    "Compensation failed, account left without role binding"
                );
                record_registration_compensation("failed");
            }
        }
    }
}
