//! Prometheus 메트릭 설정 및 유틸리티.
//!
//! HTTP 요청 메트릭과 계정 서비스 메트릭을 수집하고 `/metrics` 엔드포인트로 노출합니다.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};

/// 권한 서비스 장애로 기본 프로필을 사용한 횟수.
pub const PERMISSION_DEGRADED_TOTAL: &str = "permission_degraded_total";
/// 가입 보상(계정 삭제) 실행 횟수.
pub const REGISTRATION_COMPENSATIONS_TOTAL: &str = "registration_compensations_total";

/// Prometheus 메트릭 레코더를 설정하고 핸들을 반환합니다.
///
/// # Errors
///
/// 레코더가 이미 설치되어 있으면 에러를 반환합니다.
pub fn setup_metrics_recorder() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new()
        // HTTP 요청 지속 시간 히스토그램 버킷 설정
        .set_buckets_for_metric(
            Matcher::Full("http_request_duration_seconds".to_string()),
            &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0],
        )?
        .install_recorder()
}

// ============================================================================
// HTTP 메트릭 헬퍼 함수
// ============================================================================

/// HTTP 요청 카운터 증가.
pub fn record_http_request(method: &str, path: &str) {
    counter!("http_requests_total", "method" => method.to_string(), "path" => path.to_string())
        .increment(1);
}

/// HTTP 응답 카운터 증가.
pub fn record_http_response(method: &str, path: &str, status: u16) {
    counter!(
        "http_responses_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// HTTP 요청 지속 시간 기록.
pub fn record_http_duration(method: &str, path: &str, duration_secs: f64) {
    histogram!(
        "http_request_duration_seconds",
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(duration_secs);
}

// ============================================================================
// 계정 서비스 메트릭 헬퍼 함수
// ============================================================================

/// 권한 조회 실패로 기본 프로필을 사용했음을 기록합니다.
pub fn record_permission_degraded(reason: &str) {
    counter!(PERMISSION_DEGRADED_TOTAL, "reason" => reason.to_string()).increment(1);
}

/// 가입 보상 실행을 기록합니다. `outcome`은 `deleted` 또는 `failed`.
pub fn record_registration_compensation(outcome: &str) {
    counter!(REGISTRATION_COMPENSATIONS_TOTAL, "outcome" => outcome.to_string()).increment(1);
}

/// 가입 결과 카운터 증가.
pub fn record_registration(mode: &str, result: &str) {
    counter!(
        "registrations_total",
        "mode" => mode.to_string(),
        "result" => result.to_string()
    )
    .increment(1);
}

/// 인증 토큰 거부(401) 카운터 증가.
pub fn record_auth_rejection(path: &str) {
    counter!("http_auth_rejections_total", "path" => path.to_string()).increment(1);
}

/// 로그인 결과 카운터 증가.
pub fn record_login(result: &str) {
    counter!("logins_total", "result" => result.to_string()).increment(1);
}

// ============================================================================
// 경로 정규화 유틸리티
// ============================================================================

/// 경로에서 동적 파라미터를 정규화합니다.
///
/// 예: `/user/info/42` → `/user/info/:id`
pub fn normalize_path(path: &str) -> String {
    path.split('/')
        .map(|segment| {
            let is_numeric = !segment.is_empty() && segment.chars().all(|c| c.is_ascii_digit());
            if is_numeric {
                ":id"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_numeric() {
        assert_eq!(normalize_path("/user/info/12345"), "/user/info/:id");
        assert_eq!(normalize_path("/user/7"), "/user/:id");
    }

    #[test]
    fn test_normalize_path_static() {
        assert_eq!(normalize_path("/user/users"), "/user/users");
        assert_eq!(normalize_path("/health/ready"), "/health/ready");
        assert_eq!(normalize_path("/"), "/");
    }

    #[test]
    fn test_helpers_without_recorder() {
        // 레코더가 없으면 no-op
        record_permission_degraded("timeout");
        record_registration_compensation("deleted");
        record_registration("standalone", "success");
        record_login("success");
        record_auth_rejection("/user/users");
    }
}
