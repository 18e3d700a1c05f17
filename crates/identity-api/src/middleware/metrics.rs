//! HTTP 요청 metrics middleware.
//!
//! 경로 라벨은 라우터가 매칭한 템플릿(`/user/info/{user_id}`)을 우선 사용하고,
//! 매칭되지 않은 요청은 하나의 라벨로 묶어 카디널리티를 제한합니다.

use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request},
    http::StatusCode,
    middleware::Next,
    response::Response,
};

use crate::metrics::{
    normalize_path, record_auth_rejection, record_http_duration, record_http_request,
    record_http_response,
};

/// 라우트에 매칭되지 않은 요청의 경로 라벨.
const UNMATCHED_PATH: &str = "unmatched";

/// 메트릭 라벨로 쓸 경로.
///
/// 매칭된 템플릿이 없는 404는 [`UNMATCHED_PATH`]로 묶고,
/// 그 외 (타임아웃 등 라우팅 전에 끝난 응답)는 숫자 세그먼트를 정규화합니다.
fn route_label(matched: Option<&str>, raw_path: &str, status: StatusCode) -> String {
    match matched {
        Some(template) => template.to_string(),
        None if status == StatusCode::NOT_FOUND => UNMATCHED_PATH.to_string(),
        None => normalize_path(raw_path),
    }
}

/// HTTP 메트릭을 수집하는 미들웨어 레이어.
///
/// - `http_requests_total`, `http_responses_total`, `http_request_duration_seconds`
/// - `http_auth_rejections_total`: 인증 미들웨어가 거부한 401 응답
pub async fn metrics_layer(request: Request, next: Next) -> Response {
    let start = Instant::now();

    let method = request.method().to_string();
    let raw_path = request.uri().path().to_string();
    let matched = request
        .extensions()
        .get::<MatchedPath>()
        .map(|m| m.as_str().to_string());

    let response = next.run(request).await;
    let status = response.status();
    let path = route_label(matched.as_deref(), &raw_path, status);

    record_http_request(&method, &path);
    record_http_response(&method, &path, status.as_u16());
    record_http_duration(&method, &path, start.elapsed().as_secs_f64());

    if status == StatusCode::UNAUTHORIZED {
        record_auth_rejection(&path);
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Method, middleware, routing::get, Router};
    use tower::ServiceExt;

    async fn ok_handler() -> &'static str {
        "OK"
    }

    async fn unauthorized_handler() -> StatusCode {
        StatusCode::UNAUTHORIZED
    }

    #[test]
    fn test_route_label_prefers_template() {
        assert_eq!(
            route_label(Some("/user/info/{user_id}"), "/user/info/42", StatusCode::OK),
            "/user/info/{user_id}"
        );
    }

    #[test]
    fn test_route_label_collapses_unmatched() {
        assert_eq!(
            route_label(None, "/wp-admin/123", StatusCode::NOT_FOUND),
            UNMATCHED_PATH
        );
        assert_eq!(
            route_label(None, "/user/7", StatusCode::REQUEST_TIMEOUT),
            "/user/:id"
        );
    }

    #[tokio::test]
    async fn test_metrics_layer_passes_through() {
        let app = Router::new()
            .route("/user/info/{user_id}", get(ok_handler))
            .route("/user/users", get(unauthorized_handler))
            .layer(middleware::from_fn(metrics_layer));

        let ok = app
            .clone()
            .oneshot(
                Request::builder()
                    .method(Method::GET)
                    .uri("/user/info/42")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(ok.status(), StatusCode::OK);

        let rejected = app
            .oneshot(
                Request::builder()
                    .uri("/user/users")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(rejected.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_metrics_layer_keeps_not_found() {
        let app = Router::new()
            .route("/health", get(ok_handler))
            .layer(middleware::from_fn(metrics_layer));

        let response = app
            .oneshot(Request::builder().uri("/missing").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
