//! 권한 서비스 와이어 타입.
//!
//! 필드명은 원격 서비스의 camelCase JSON을 그대로 따릅니다.
//! 원격 측이 null을 보낼 수 있는 필드는 모두 `Option`입니다.

use serde::{Deserialize, Serialize};

/// `POST /permission/bind-default-role` 응답.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BindRoleResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub role_code: Option<String>,
}

impl BindRoleResponse {
    /// `success`가 명시적으로 true일 때만 성공입니다.
    pub fn is_success(&self) -> bool {
        self.success == Some(true)
    }
}

/// `GET /permission/user/{userId}` 응답.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPermissionResponse {
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub role_code: Option<String>,
    #[serde(default)]
    pub role_name: Option<String>,
    #[serde(default)]
    pub permissions: Option<Vec<String>>,
}

impl UserPermissionResponse {
    /// 비어 있지 않은 역할 코드.
    pub fn role_code(&self) -> Option<&str> {
        self.role_code
            .as_deref()
            .map(str::trim)
            .filter(|code| !code.is_empty())
    }
}

/// `GET /permission/check` 응답.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionCheckResponse {
    #[serde(default)]
    pub has_permission: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
}

impl PermissionCheckResponse {
    pub fn is_granted(&self) -> bool {
        self.has_permission == Some(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_response_null_success_is_failure() {
        let resp: BindRoleResponse =
            serde_json::from_str(r#"{"success":null,"message":"x"}"#).unwrap();
        assert!(!resp.is_success());

        let resp: BindRoleResponse =
            serde_json::from_str(r#"{"success":true,"roleCode":"USER"}"#).unwrap();
        assert!(resp.is_success());
        assert_eq!(resp.role_code.as_deref(), Some("USER"));
    }

    #[test]
    fn test_blank_role_code_is_absent() {
        let resp: UserPermissionResponse =
            serde_json::from_str(r#"{"userId":1,"roleCode":"  ","permissions":[]}"#).unwrap();
        assert_eq!(resp.role_code(), None);

        let resp: UserPermissionResponse =
            serde_json::from_str(r#"{"userId":1,"roleCode":"ADMIN"}"#).unwrap();
        assert_eq!(resp.role_code(), Some("ADMIN"));
        assert!(resp.permissions.is_none());
    }
}
