//! 권한 서비스 에러 타입.

use thiserror::Error;

/// 권한 서비스 호출 에러.
#[derive(Debug, Error)]
pub enum PermissionError {
    /// 이 배포에는 원격 권한 서비스가 없음
    #[error("Permission authority not configured")]
    NotConfigured,

    /// 네트워크/연결 에러
    #[error("Network error: {0}")]
    Network(String),

    /// 제한 시간 초과
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// 2xx가 아닌 응답
    #[error("Remote error {status}: {message}")]
    Remote { status: u16, message: String },

    /// 응답 본문 파싱 실패
    #[error("Parse error: {0}")]
    Parse(String),
}

impl PermissionError {
    /// 일시적인 장애인지 확인.
    pub fn is_transient(&self) -> bool {
        match self {
            PermissionError::Network(_) | PermissionError::Timeout(_) => true,
            PermissionError::Remote { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// 메트릭 라벨용 사유 문자열.
    pub fn reason(&self) -> &'static str {
        match self {
            PermissionError::NotConfigured => "not_configured",
            PermissionError::Network(_) => "network",
            PermissionError::Timeout(_) => "timeout",
            PermissionError::Remote { .. } => "remote",
            PermissionError::Parse(_) => "parse",
        }
    }
}

impl From<reqwest::Error> for PermissionError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            PermissionError::Timeout(err.to_string())
        } else if err.is_decode() {
            PermissionError::Parse(err.to_string())
        } else {
            PermissionError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for PermissionError {
    fn from(err: serde_json::Error) -> Self {
        PermissionError::Parse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(PermissionError::Timeout("3s".into()).is_transient());
        assert!(PermissionError::Remote {
            status: 503,
            message: String::new()
        }
        .is_transient());
        assert!(!PermissionError::Remote {
            status: 404,
            message: String::new()
        }
        .is_transient());
        assert!(!PermissionError::NotConfigured.is_transient());
    }
}
