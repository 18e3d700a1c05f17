//! 원격 권한 서비스 HTTP 클라이언트.

use std::time::Duration;

use async_trait::async_trait;
use identity_core::{AccountId, PermissionServiceConfig};
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::{
    BindRoleResponse, PermissionAuthority, PermissionCheckResponse, PermissionError,
    PermissionResult, UserPermissionResponse,
};

// ============================================================================
// 설정
// ============================================================================

/// HTTP 클라이언트 설정.
#[derive(Debug, Clone)]
pub struct PermissionClientConfig {
    /// 기본 URL (끝의 `/`는 제거됨)
    pub base_url: String,
    /// 요청 타임아웃
    pub timeout: Duration,
}

impl PermissionClientConfig {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, timeout }
    }

    /// 애플리케이션 설정에서 생성합니다. `base_url`이 없으면 `None`.
    pub fn from_settings(settings: &PermissionServiceConfig) -> Option<Self> {
        settings
            .base_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .map(|url| Self::new(url, settings.timeout()))
    }
}

// ============================================================================
// 클라이언트
// ============================================================================

/// reqwest 기반 권한 서비스 클라이언트.
///
/// 모든 요청은 설정된 타임아웃으로 제한됩니다.
#[derive(Debug, Clone)]
pub struct HttpPermissionClient {
    config: PermissionClientConfig,
    client: Client,
}

impl HttpPermissionClient {
    /// 새 클라이언트 생성.
    ///
    /// # Errors
    /// HTTP 클라이언트 생성에 실패하면 `PermissionError::Network`를 반환합니다.
    pub fn new(config: PermissionClientConfig) -> Result<Self, PermissionError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PermissionError::Network(format!("HTTP 클라이언트 생성 실패: {}", e)))?;

        Ok(Self { config, client })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    /// 응답 처리: 2xx가 아니면 `Remote`, 본문 파싱 실패는 `Parse`.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> PermissionResult<T> {
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            serde_json::from_str(&body).map_err(|e| {
                warn!(error = %e, body = %body, "Failed to parse permission service response");
                PermissionError::Parse(e.to_string())
            })
        } else {
            Err(PermissionError::Remote {
                status: status.as_u16(),
                message: body,
            })
        }
    }
}

#[async_trait]
impl PermissionAuthority for HttpPermissionClient {
    fn name(&self) -> &str {
        "http"
    }

    fn is_configured(&self) -> bool {
        true
    }

    async fn bind_default_role(&self, account_id: AccountId) -> PermissionResult<BindRoleResponse> {
        let url = self.url("/permission/bind-default-role");
        debug!(account_id = %account_id, "POST {}", url);

        let response = self
            .client
            .post(&url)
            .query(&[("userId", account_id.value())])
            .send()
            .await?;

        self.handle_response(response).await
    }

    async fn get_profile(&self, account_id: AccountId) -> PermissionResult<UserPermissionResponse> {
        let url = self.url(&format!("/permission/user/{}", account_id));
        debug!(account_id = %account_id, "GET {}", url);

        let response = self.client.get(&url).send().await?;
        self.handle_response(response).await
    }

    async fn check_permission(
        &self,
        account_id: AccountId,
        permission: &str,
    ) -> PermissionResult<PermissionCheckResponse> {
        let url = self.url("/permission/check");
        debug!(account_id = %account_id, permission, "GET {}", url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("userId", account_id.to_string()),
                ("permission", permission.to_string()),
            ])
            .send()
            .await?;

        self.handle_response(response).await
    }
}
