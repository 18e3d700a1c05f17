//! 계정 서비스 REST API 서버.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - Axum 기반 REST API
//! - JWT 발급/검증 및 Bearer 인증 미들웨어
//! - 원격 역할 바인딩과 보상 처리를 포함한 회원가입
//! - 권한 서비스 장애 시 강등되는 권한 해석
//! - 헬스 체크, Prometheus 메트릭, OpenAPI 문서
//!
//! # 모듈 구성
//!
//! - [`state`]: 애플리케이션 공유 상태 (AppState)
//! - [`routes`]: REST API 엔드포인트
//! - [`auth`]: JWT, 비밀번호 해싱, 접근 게이트, 인증 미들웨어
//! - [`services`]: 가입 코디네이터, 권한 해석기, 계정 서비스
//! - [`repository`]: 계정 저장소 (PostgreSQL, 메모리)
//! - [`metrics`]: Prometheus 메트릭 수집
//! - [`middleware`]: HTTP 미들웨어
//! - [`openapi`]: OpenAPI 문서 및 Swagger UI

pub mod auth;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod openapi;
pub mod repository;
pub mod routes;
pub mod services;
pub mod state;

pub use auth::{hash_password, verify_password, Claims, TokenAuthority, TokenError};
pub use error::{ApiError, ApiResponse, ApiResult};
pub use metrics::setup_metrics_recorder;
pub use middleware::metrics_layer;
pub use routes::*;
pub use state::AppState;

#[cfg(any(test, feature = "test-utils"))]
pub use state::create_test_state;

use std::sync::Arc;

use axum::Router;

/// 인증 미들웨어가 적용된 애플리케이션 라우터.
///
/// 허용 목록(`/user/register`, `/user/login`, `/health*`, 문서 경로)을 제외한
/// 모든 요청은 핸들러 실행 전에 Bearer 토큰 검증을 거칩니다.
pub fn create_app_router(state: Arc<AppState>) -> Router {
    routes::create_api_router()
        .merge(openapi::swagger_ui_router())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth::require_auth,
        ))
        .with_state(state)
}
