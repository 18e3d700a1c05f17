//! # Identity Notification
//!
//! 계정 작업 로그 전송.
//!
//! 지원 싱크:
//! - tracing 출력 (기본)
//! - HTTP 수집기 (JSON POST)
//!
//! 전송은 항상 fire-and-forget이며, 실패는 로컬 로그로만 남습니다.

pub mod dispatcher;
pub mod http_sink;
pub mod tracing_sink;
pub mod types;

pub use dispatcher::*;
pub use http_sink::*;
pub use tracing_sink::*;
pub use types::*;
