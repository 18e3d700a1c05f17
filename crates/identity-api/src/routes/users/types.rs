//! 사용자 API 요청/응답 타입.

use chrono::{DateTime, Utc};
use identity_core::{Account, PageRequest};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use crate::services::{AccountChanges, LoginOutcome, Registration};

/// 휴대전화 번호 검증 (1 + [3-9] + 9자리).
fn validate_phone(value: &str) -> Result<(), ValidationError> {
    let bytes = value.as_bytes();
    let valid = bytes.len() == 11
        && bytes.iter().all(u8::is_ascii_digit)
        && bytes[0] == b'1'
        && (b'3'..=b'9').contains(&bytes[1]);

    if !valid {
        return Err(ValidationError::new("invalid_phone")
            .with_message("전화번호 형식이 올바르지 않습니다".into()));
    }
    Ok(())
}

/// 회원가입 요청.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// 사용자명 (3-50자)
    #[validate(length(min = 3, max = 50, message = "사용자명은 3-50자여야 합니다"))]
    pub username: String,
    /// 비밀번호 (6-20자)
    #[validate(length(min = 6, max = 20, message = "비밀번호는 6-20자여야 합니다"))]
    pub password: String,
    /// 이메일 (선택)
    #[serde(default)]
    #[validate(email(message = "이메일 형식이 올바르지 않습니다"))]
    pub email: Option<String>,
    /// 휴대전화 번호 (선택)
    #[serde(default)]
    #[validate(custom(function = "validate_phone"))]
    pub phone: Option<String>,
}

impl From<RegisterRequest> for Registration {
    fn from(req: RegisterRequest) -> Self {
        Registration {
            username: req.username,
            password: req.password,
            email: req.email,
            phone: req.phone,
        }
    }
}

/// 로그인 요청.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "사용자명을 입력하세요"))]
    pub username: String,
    #[validate(length(min = 1, message = "비밀번호를 입력하세요"))]
    pub password: String,
}

/// 사용자 정보 수정 요청. 생략한 필드는 변경하지 않습니다.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[serde(default)]
    #[validate(email(message = "이메일 형식이 올바르지 않습니다"))]
    pub email: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "validate_phone"))]
    pub phone: Option<String>,
}

impl From<UpdateUserRequest> for AccountChanges {
    fn from(req: UpdateUserRequest) -> Self {
        AccountChanges {
            email: req.email,
            phone: req.phone,
        }
    }
}

/// 비밀번호 변경 요청.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[validate(length(min = 1, message = "기존 비밀번호를 입력하세요"))]
    pub old_password: String,
    #[validate(length(min = 6, max = 20, message = "새 비밀번호는 6-20자여야 합니다"))]
    pub new_password: String,
}

/// 목록 조회 쿼리.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// 페이지 번호 (0부터, 기본 0)
    pub page: Option<u32>,
    /// 페이지 크기 (기본 10, 최대 100)
    pub size: Option<u32>,
}

impl PageQuery {
    pub fn to_request(&self) -> PageRequest {
        PageRequest::new(
            self.page.unwrap_or(0),
            self.size.unwrap_or(PageRequest::DEFAULT_SIZE),
        )
    }
}

/// 사용자 정보 응답.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserInfoResponse {
    pub user_id: i64,
    pub username: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// 생성 시각
    pub gmt_create: DateTime<Utc>,
    /// 최종 수정 시각
    pub gmt_modified: DateTime<Utc>,
}

impl From<Account> for UserInfoResponse {
    fn from(account: Account) -> Self {
        Self {
            user_id: account.id.value(),
            username: account.username,
            email: account.email,
            phone: account.phone,
            gmt_create: account.created_at,
            gmt_modified: account.updated_at,
        }
    }
}

/// 로그인 응답.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user_id: i64,
    pub username: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// Bearer 토큰
    pub token: String,
    /// 토큰 만료 시각 (epoch 밀리초)
    pub expiration: i64,
}

impl From<LoginOutcome> for LoginResponse {
    fn from(outcome: LoginOutcome) -> Self {
        let expiration = outcome.token.expires_at_millis();
        Self {
            user_id: outcome.account.id.value(),
            username: outcome.account.username,
            email: outcome.account.email,
            phone: outcome.account.phone,
            token: outcome.token.token,
            expiration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_format() {
        assert!(validate_phone("13800138000").is_ok());
        assert!(validate_phone("19912345678").is_ok());
        assert!(validate_phone("12800138000").is_err());
        assert!(validate_phone("23800138000").is_err());
        assert!(validate_phone("1380013800").is_err());
        assert!(validate_phone("1380013800a").is_err());
    }

    #[test]
    fn test_register_request_rules() {
        let ok: RegisterRequest = serde_json::from_value(serde_json::json!({
            "username": "alice",
            "password": "secret1",
            "email": "alice@example.com",
            "phone": "13800138000"
        }))
        .unwrap();
        assert!(ok.validate().is_ok());

        let short = RegisterRequest {
            username: "al".into(),
            ..ok.clone()
        };
        assert!(short.validate().is_err());

        let bad_email = RegisterRequest {
            email: Some("not-an-email".into()),
            ..ok.clone()
        };
        assert!(bad_email.validate().is_err());

        let long_password = RegisterRequest {
            password: "a".repeat(21),
            ..ok
        };
        assert!(long_password.validate().is_err());
    }

    #[test]
    fn test_optional_fields_may_be_omitted() {
        let req: RegisterRequest =
            serde_json::from_str(r#"{"username":"alice","password":"secret1"}"#).unwrap();
        assert!(req.validate().is_ok());
        assert!(req.email.is_none());

        let update: UpdateUserRequest = serde_json::from_str("{}").unwrap();
        assert!(update.validate().is_ok());
    }

    #[test]
    fn test_page_query_defaults() {
        let request = PageQuery::default().to_request();
        assert_eq!(request.page, 0);
        assert_eq!(request.size, 10);

        let clamped = PageQuery {
            page: Some(2),
            size: Some(500),
        }
        .to_request();
        assert_eq!(clamped.size, PageRequest::MAX_SIZE);
    }

    #[test]
    fn test_reset_password_uses_camel_case() {
        let req: ResetPasswordRequest =
            serde_json::from_str(r#"{"oldPassword":"secret1","newPassword":"newpass1"}"#)
                .unwrap();
        assert!(req.validate().is_ok());
        assert_eq!(req.old_password, "secret1");
    }
}
