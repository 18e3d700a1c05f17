//! HTTP 수집기 싱크.

use std::time::Duration;

use async_trait::async_trait;
use identity_core::LogSinkConfig;
use tracing::{debug, warn};

use crate::{LogSink, OperationLog, SinkError, SinkResult};

/// HTTP 수집기 설정.
#[derive(Debug, Clone)]
pub struct HttpSinkConfig {
    /// 로그를 POST할 엔드포인트 URL
    pub endpoint: String,
    /// 전송 타임아웃
    pub timeout: Duration,
}

impl HttpSinkConfig {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout,
        }
    }

    /// 애플리케이션 설정에서 생성합니다. 엔드포인트가 없으면 `None`.
    pub fn from_settings(settings: &LogSinkConfig) -> Option<Self> {
        settings
            .endpoint
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .map(|url| Self::new(url, settings.timeout()))
    }
}

/// 작업 로그를 JSON으로 POST하는 싱크.
pub struct HttpLogSink {
    config: HttpSinkConfig,
    client: reqwest::Client,
}

impl HttpLogSink {
    /// 새 HTTP 싱크를 생성합니다.
    pub fn new(config: HttpSinkConfig) -> SinkResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SinkError::InvalidConfig(format!("HTTP 클라이언트 생성 실패: {}", e)))?;

        Ok(Self { config, client })
    }

    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }
}

#[async_trait]
impl LogSink for HttpLogSink {
    async fn emit(&self, log: &OperationLog) -> SinkResult<()> {
        debug!(
            operation = %log.operation,
            "Posting operation log to {}",
            self.config.endpoint
        );

        let response = self
            .client
            .post(&self.config.endpoint)
            .json(log)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!("Log collector rejected operation log: {} - {}", status, body);
            Err(SinkError::SendFailed(format!("HTTP {}: {}", status, body)))
        }
    }

    fn is_enabled(&self) -> bool {
        !self.config.endpoint.is_empty()
    }

    fn name(&self) -> &str {
        "http"
    }
}
