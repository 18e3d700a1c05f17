//! tracing 출력 싱크.

use async_trait::async_trait;
use tracing::info;

use crate::{LogSink, OperationLog, SinkResult};

/// 작업 로그를 구조화된 tracing 이벤트로 기록하는 싱크.
///
/// 수집기가 구성되지 않은 배포의 기본 싱크입니다.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogSink;

impl TracingLogSink {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl LogSink for TracingLogSink {
    async fn emit(&self, log: &OperationLog) -> SinkResult<()> {
        info!(
            target: "identity::operation",
            operation = %log.operation,
            user_id = ?log.user_id.map(|id| id.value()),
            username = ?log.username,
            ip = ?log.ip_address,
            timestamp = %log.timestamp.to_rfc3339(),
            "{}",
            log.description
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "tracing"
    }
}
