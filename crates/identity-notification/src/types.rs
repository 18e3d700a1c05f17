//! 작업 로그 타입 및 trait 정의.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use identity_core::AccountId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 작업 종류.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationKind {
    /// 회원가입
    UserRegister,
    /// 로그인
    UserLogin,
    /// 정보 수정
    UserUpdate,
    /// 비밀번호 재설정
    PasswordReset,
    /// 조회
    UserQuery,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UserRegister => "USER_REGISTER",
            Self::UserLogin => "USER_LOGIN",
            Self::UserUpdate => "USER_UPDATE",
            Self::PasswordReset => "PASSWORD_RESET",
            Self::UserQuery => "USER_QUERY",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 로그 싱크로 전송되는 작업 이벤트.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationLog {
    pub user_id: Option<AccountId>,
    pub username: Option<String>,
    pub operation: OperationKind,
    pub description: String,
    pub ip_address: Option<String>,
    /// ISO-8601 (RFC 3339) 타임스탬프
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_data: Option<serde_json::Value>,
}

impl OperationLog {
    /// 새 작업 로그를 생성합니다.
    pub fn new(operation: OperationKind, description: impl Into<String>) -> Self {
        Self {
            user_id: None,
            username: None,
            operation,
            description: description.into(),
            ip_address: None,
            timestamp: Utc::now(),
            extra_data: None,
        }
    }

    /// 작업 주체를 설정합니다.
    pub fn with_user(mut self, user_id: AccountId, username: impl Into<String>) -> Self {
        self.user_id = Some(user_id);
        self.username = Some(username.into());
        self
    }

    pub fn with_user_id(mut self, user_id: AccountId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn with_ip(mut self, ip_address: Option<String>) -> Self {
        self.ip_address = ip_address;
        self
    }

    pub fn with_extra(mut self, extra: serde_json::Value) -> Self {
        self.extra_data = Some(extra);
        self
    }
}

/// 싱크 작업용 Result 타입.
pub type SinkResult<T> = Result<T, SinkError>;

/// 싱크 에러.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("로그 전송 실패: {0}")]
    SendFailed(String),

    #[error("잘못된 설정: {0}")]
    InvalidConfig(String),

    #[error("네트워크 에러: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("직렬화 에러: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// 작업 로그 싱크 trait.
#[async_trait]
pub trait LogSink: Send + Sync {
    /// 작업 로그를 전송합니다.
    async fn emit(&self, log: &OperationLog) -> SinkResult<()>;

    /// 싱크가 활성화되어 있는지 확인합니다.
    fn is_enabled(&self) -> bool {
        true
    }

    /// 싱크 이름을 반환합니다.
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_format_is_camel_case() {
        let log = OperationLog::new(OperationKind::UserRegister, "회원가입")
            .with_user(AccountId(9), "alice")
            .with_ip(Some("10.0.0.1".to_string()));

        let json = serde_json::to_value(&log).unwrap();
        assert_eq!(json["userId"], 9);
        assert_eq!(json["username"], "alice");
        assert_eq!(json["operation"], "USER_REGISTER");
        assert_eq!(json["ipAddress"], "10.0.0.1");
        assert!(json["timestamp"].as_str().unwrap().contains('T'));
        assert!(json.get("extraData").is_none());
    }

    #[test]
    fn test_operation_kind_display_matches_serde() {
        for kind in [
            OperationKind::UserRegister,
            OperationKind::UserLogin,
            OperationKind::UserUpdate,
            OperationKind::PasswordReset,
            OperationKind::UserQuery,
        ] {
            let json = serde_json::to_value(kind).unwrap();
            assert_eq!(json, kind.as_str());
        }
    }
}
