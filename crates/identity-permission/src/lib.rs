//! 원격 권한 서비스 연동.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - PermissionAuthority trait: 권한 서비스 RPC 계약
//! - HTTP 클라이언트 (타임아웃 제한)
//! - 단독 배포용 정적 제공자
//! - 와이어 응답 타입
//! - 테스트용 스크립트 제공자 (`test-utils` feature)

pub mod client;
pub mod error;
#[cfg(any(test, feature = "test-utils"))]
pub mod scripted;
pub mod standalone;
pub mod traits;
pub mod types;

pub use client::{HttpPermissionClient, PermissionClientConfig};
pub use error::*;
#[cfg(any(test, feature = "test-utils"))]
pub use scripted::{BindScript, ProfileScript, ScriptedAuthority};
pub use standalone::StandaloneAuthority;
pub use traits::*;
pub use types::*;
