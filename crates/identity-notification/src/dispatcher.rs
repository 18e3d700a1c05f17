//! fire-and-forget 로그 디스패처.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::{LogSink, OperationLog};

/// 작업 로그를 등록된 싱크들로 비동기 전송합니다.
///
/// `notify`는 즉시 반환되며 응답 경로를 막지 않습니다.
/// 싱크 실패는 경고 로그로만 남습니다.
#[derive(Clone, Default)]
pub struct LogDispatcher {
    sinks: Vec<Arc<dyn LogSink>>,
}

impl LogDispatcher {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    /// 싱크를 추가합니다.
    pub fn with_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn sink_names(&self) -> Vec<&str> {
        self.sinks.iter().map(|s| s.name()).collect()
    }

    /// 작업 로그를 백그라운드로 전송합니다.
    pub fn notify(&self, log: OperationLog) {
        let sinks: Vec<Arc<dyn LogSink>> = self
            .sinks
            .iter()
            .filter(|s| s.is_enabled())
            .cloned()
            .collect();

        if sinks.is_empty() {
            return;
        }

        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!(operation = %log.operation, "No async runtime, operation log dropped");
            return;
        };

        handle.spawn(async move {
            deliver(&sinks, &log).await;
        });
    }
}

async fn deliver(sinks: &[Arc<dyn LogSink>], log: &OperationLog) {
    for sink in sinks {
        match sink.emit(log).await {
            Ok(()) => debug!(sink = sink.name(), operation = %log.operation, "Operation log sent"),
            Err(e) => warn!(
                sink = sink.name(),
                operation = %log.operation,
                error = %e,
                "Failed to send operation log"
            ),
        }
    }
}

impl std::fmt::Debug for LogDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogDispatcher")
            .field("sinks", &self.sink_names())
            .finish()
    }
}

// ==================== 테스트 지원 ====================

#[cfg(any(test, feature = "test-utils"))]
pub use memory::MemoryLogSink;

#[cfg(any(test, feature = "test-utils"))]
mod memory {
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::{LogSink, OperationKind, OperationLog, SinkResult};

    /// 전송된 로그를 메모리에 보관하는 테스트용 싱크.
    #[derive(Debug, Default)]
    pub struct MemoryLogSink {
        logs: Mutex<Vec<OperationLog>>,
    }

    impl MemoryLogSink {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn logs(&self) -> Vec<OperationLog> {
            self.logs.lock().map(|l| l.clone()).unwrap_or_default()
        }

        pub fn count(&self, kind: OperationKind) -> usize {
            self.logs().iter().filter(|l| l.operation == kind).count()
        }

        /// 백그라운드 전송이 최소 `expected`개 도착할 때까지 대기합니다.
        pub async fn wait_for(&self, expected: usize) -> Vec<OperationLog> {
            for _ in 0..100 {
                let logs = self.logs();
                if logs.len() >= expected {
                    return logs;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
            self.logs()
        }
    }

    #[async_trait]
    impl LogSink for MemoryLogSink {
        async fn emit(&self, log: &OperationLog) -> SinkResult<()> {
            if let Ok(mut logs) = self.logs.lock() {
                logs.push(log.clone());
            }
            Ok(())
        }

        fn name(&self) -> &str {
            "memory"
        }
    }
}
