//! 계정 서비스의 에러 분류 체계.
//!
//! 모든 결과는 고정된 숫자 코드와 클라이언트용 메시지로 매핑됩니다.
//! 내부 에러 본문은 로그에만 남기고 응답에는 포함하지 않습니다.

use thiserror::Error;

use crate::domain::UniqueField;

/// 인증 실패 사유.
///
/// 호출자 입장에서는 모두 "인증되지 않음"이며, 로그 구분용으로만 나뉩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    /// Authorization 헤더 없음
    MissingToken,
    /// 서명 불일치 또는 형식 오류
    InvalidToken,
    /// 만료된 토큰
    ExpiredToken,
    /// 사용자명 또는 비밀번호 불일치
    BadCredentials,
}

impl AuthFailure {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingToken => "missing_token",
            Self::InvalidToken => "invalid_token",
            Self::ExpiredToken => "expired_token",
            Self::BadCredentials => "bad_credentials",
        }
    }
}

/// 서비스 에러.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// 입력 검증 실패
    #[error("입력 검증 실패: {0}")]
    Validation(String),

    /// 고유 필드 충돌
    #[error("고유 필드 충돌: {0}")]
    Conflict(UniqueField),

    /// 인증 실패
    #[error("인증 실패: {}", .0.as_str())]
    Unauthenticated(AuthFailure),

    /// 권한 없음
    #[error("권한 없음")]
    Forbidden,

    /// 계정 없음
    #[error("계정을 찾을 수 없음")]
    NotFound,

    /// 원격 단계 실패 후 보상 처리됨
    #[error("부분 실패: {reason}")]
    PartialFailure { reason: String },

    /// 내부 에러
    #[error("내부 에러: {0}")]
    Internal(String),
}

/// 서비스 작업을 위한 Result 타입.
pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    /// 응답 봉투와 HTTP 상태에 쓰이는 숫자 코드.
    pub fn code(&self) -> u16 {
        match self {
            Self::Validation(_) | Self::Conflict(_) => 400,
            Self::Unauthenticated(_) => 401,
            Self::Forbidden => 403,
            Self::NotFound => 404,
            Self::PartialFailure { .. } | Self::Internal(_) => 500,
        }
    }

    /// 로그/메트릭용 분류 문자열.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Conflict(_) => "CONFLICT",
            Self::Unauthenticated(_) => "UNAUTHENTICATED",
            Self::Forbidden => "FORBIDDEN",
            Self::NotFound => "NOT_FOUND",
            Self::PartialFailure { .. } => "PARTIAL_FAILURE",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// 클라이언트에 노출해도 안전한 메시지.
    pub fn message(&self) -> String {
        match self {
            Self::Validation(msg) => msg.clone(),
            Self::Conflict(field) => field.conflict_message().to_string(),
            Self::Unauthenticated(AuthFailure::BadCredentials) => {
                "사용자명 또는 비밀번호가 올바르지 않습니다".to_string()
            }
            Self::Unauthenticated(AuthFailure::MissingToken) => {
                "인증 토큰이 필요합니다".to_string()
            }
            Self::Unauthenticated(_) => "유효하지 않거나 만료된 토큰입니다".to_string(),
            Self::Forbidden => "접근 권한이 없습니다".to_string(),
            Self::NotFound => "사용자를 찾을 수 없습니다".to_string(),
            Self::PartialFailure { .. } => {
                "회원가입을 완료하지 못했습니다. 잠시 후 다시 시도하세요".to_string()
            }
            Self::Internal(_) => "서버 내부 오류가 발생했습니다".to_string(),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// 서버 측 원인으로 발생한 에러인지 확인합니다.
    pub fn is_server_error(&self) -> bool {
        self.code() >= 500
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        ServiceError::Internal(format!("직렬화 에러: {}", err))
    }
}
