//! 계정 서비스 API 서버.
//!
//! 설정을 로드하고 저장소, 권한 서비스, 로그 싱크를 연결한 뒤
//! Axum 서버를 시작합니다.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{
    http::{HeaderValue, StatusCode},
    middleware,
    routing::get,
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use identity_api::metrics::setup_metrics_recorder;
use identity_api::middleware::metrics_layer;
use identity_api::repository::{AccountStore, InMemoryAccountStore, PgAccountStore};
use identity_api::state::AppState;
use identity_api::{create_app_router, TokenAuthority};
use identity_core::{init_logging, AppConfig, DatabaseConfig, DeploymentMode, LogConfig};
use identity_notification::{HttpLogSink, HttpSinkConfig, LogDispatcher, TracingLogSink};
use identity_permission::{
    HttpPermissionClient, PermissionAuthority, PermissionClientConfig, StandaloneAuthority,
};

/// 계정 저장소 생성.
///
/// `database.url`이 있으면 PostgreSQL에 연결하고 마이그레이션을 적용합니다.
/// 없으면 메모리 저장소로 동작합니다 (재시작 시 데이터 유실).
async fn create_store(config: &DatabaseConfig) -> anyhow::Result<Arc<dyn AccountStore>> {
    let Some(url) = config.url.as_deref().filter(|u| !u.trim().is_empty()) else {
        warn!("database.url not set, using in-memory account store (data is not persisted)");
        return Ok(Arc::new(InMemoryAccountStore::new()));
    };

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect(url)
        .await
        .context("failed to connect to database")?;

    let store = PgAccountStore::new(pool);
    store
        .migrate()
        .await
        .context("failed to apply database migrations")?;
    info!("Connected to PostgreSQL and applied migrations");

    Ok(Arc::new(store))
}

/// 권한 서비스 연결 생성.
fn create_authority(config: &AppConfig) -> anyhow::Result<Arc<dyn PermissionAuthority>> {
    match config.deployment.mode {
        DeploymentMode::Distributed => {
            let client_config = PermissionClientConfig::from_settings(&config.permission)
                .context("distributed mode requires permission.base_url")?;
            info!(base_url = %client_config.base_url, "Using remote permission authority");
            let client = HttpPermissionClient::new(client_config)
                .context("failed to create permission client")?;
            Ok(Arc::new(client))
        }
        DeploymentMode::Standalone => {
            info!("Standalone mode, remote permission authority disabled");
            Ok(Arc::new(StandaloneAuthority::new()))
        }
    }
}

/// 작업 로그 디스패처 생성.
///
/// tracing 싱크는 항상 등록하고, `log_sink.endpoint`가 있으면 HTTP 싱크를 추가합니다.
fn create_dispatcher(config: &AppConfig) -> LogDispatcher {
    let dispatcher = LogDispatcher::new().with_sink(Arc::new(TracingLogSink::new()));

    match HttpSinkConfig::from_settings(&config.log_sink) {
        Some(sink_config) => match HttpLogSink::new(sink_config) {
            Ok(sink) => dispatcher.with_sink(Arc::new(sink)),
            Err(e) => {
                warn!(error = %e, "Failed to create HTTP log sink, continuing without it");
                dispatcher
            }
        },
        None => dispatcher,
    }
}

/// `CORS_ORIGINS` 값에서 유효한 origin 목록을 파싱합니다.
///
/// 값이 없거나 유효한 origin이 하나도 없으면 `None`.
fn parse_cors_origins(value: Option<&str>) -> Option<Vec<HeaderValue>> {
    let origins: Vec<HeaderValue> = value?
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse().ok())
        .collect();

    (!origins.is_empty()).then_some(origins)
}

/// CORS 미들웨어 구성.
///
/// 유효한 origin 목록이 있을 때만 해당 origin을 허용하고 자격 증명을 허용합니다.
/// 그 외에는 개발 모드로 간주하여 모든 origin을 허용하되 자격 증명은 허용하지 않습니다.
fn cors_layer(value: Option<&str>) -> CorsLayer {
    let (allow_origin, allow_credentials) = match parse_cors_origins(value) {
        Some(origins) => {
            info!("CORS configured with {} allowed origins", origins.len());
            (AllowOrigin::list(origins), true)
        }
        None if value.is_some_and(|v| !v.trim().is_empty()) => {
            warn!("CORS_ORIGINS is set but contains no valid origins, allowing any");
            (AllowOrigin::any(), false)
        }
        None => {
            warn!("CORS_ORIGINS not set, allowing any origin (development mode)");
            (AllowOrigin::any(), false)
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
            axum::http::Method::DELETE,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
            axum::http::header::ACCEPT,
        ])
        .allow_credentials(allow_credentials)
        .max_age(Duration::from_secs(3600))
}

/// /metrics 엔드포인트 핸들러.
async fn metrics_handler(
    axum::extract::State(handle): axum::extract::State<PrometheusHandle>,
) -> String {
    handle.render()
}

/// 전체 라우터 생성.
fn create_router(
    state: Arc<AppState>,
    metrics_handle: PrometheusHandle,
    request_timeout: Duration,
) -> Router {
    // 메트릭 라우터 (별도 상태, 인증 제외)
    let metrics_router = Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(metrics_handle);

    Router::new()
        .merge(metrics_router)
        .merge(create_app_router(state))
        .layer(middleware::from_fn(metrics_layer))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(cors_layer(std::env::var("CORS_ORIGINS").ok().as_deref()))
}

/// OpenAPI 스펙 내보내기 처리.
///
/// `--export-openapi` 플래그 또는 `EXPORT_OPENAPI` 환경변수가 설정된 경우
/// OpenAPI JSON 스펙을 stdout으로 출력하고 종료합니다.
fn handle_export_openapi() -> anyhow::Result<()> {
    use identity_api::openapi::ApiDoc;
    use utoipa::OpenApi as _;

    let export_flag = std::env::args().any(|arg| arg == "--export-openapi");
    let export_env = std::env::var("EXPORT_OPENAPI")
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);

    if export_flag || export_env {
        let json = serde_json::to_string_pretty(&ApiDoc::openapi())?;
        println!("{}", json);
        std::process::exit(0);
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env 파일 로드 (있는 경우)
    let _ = dotenvy::dotenv();

    // OpenAPI 내보내기 처리 (서버 시작 전)
    handle_export_openapi()?;

    let config = AppConfig::load_default().context("failed to load configuration")?;
    init_logging(LogConfig::from_settings(&config.logging))
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {}", e))?;

    info!(mode = ?config.deployment.mode, "Starting Identity API server...");

    let metrics_handle =
        setup_metrics_recorder().context("failed to install Prometheus recorder")?;
    info!("Prometheus metrics recorder initialized");

    let addr = format!("{}:{}", config.server.host, config.server.port)
        .parse::<SocketAddr>()
        .map_err(|e| {
            error!(
                host = %config.server.host,
                port = config.server.port,
                error = %e,
                "소켓 주소 설정이 유효하지 않습니다. server.host, server.port 설정을 확인하세요."
            );
            e
        })?;

    let store = create_store(&config.database).await?;
    let tokens = Arc::new(
        TokenAuthority::from_config(&config.jwt).context("failed to create token authority")?,
    );
    let authority = create_authority(&config)?;
    let dispatcher = create_dispatcher(&config);

    let state = Arc::new(AppState::new(
        store,
        authority,
        tokens,
        dispatcher,
        config.deployment.mode.into(),
    ));

    info!(
        store = state.store.name(),
        mode = %state.mode(),
        permission_configured = state.resolver.is_configured(),
        log_sinks = ?state.dispatcher.sink_names(),
        "Service connections status"
    );

    let app = create_router(
        state,
        metrics_handle,
        Duration::from_secs(config.server.request_timeout_secs),
    );

    info!(%addr, "API server listening");
    info!("Swagger UI available at http://{}/swagger-ui", addr);
    info!("Metrics available at http://{}/metrics", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    // ClientIp 추출을 위해 연결 정보를 함께 전달
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server stopped gracefully");

    Ok(())
}

/// Graceful shutdown 시그널 대기.
///
/// Ctrl+C 또는 SIGTERM 시그널을 수신하면 반환합니다.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            warn!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Method, Request};
    use tower::ServiceExt;

    async fn preflight(value: Option<&str>) -> axum::http::Response<Body> {
        let app = Router::new()
            .route("/health", get(|| async { "OK" }))
            .layer(cors_layer(value));

        app.oneshot(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/health")
                .header(header::ORIGIN, "https://app.example.com")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
    }

    #[test]
    fn test_parse_cors_origins() {
        assert!(parse_cors_origins(None).is_none());
        assert!(parse_cors_origins(Some("")).is_none());
        assert!(parse_cors_origins(Some(" , ,")).is_none());
        assert!(parse_cors_origins(Some("bad\norigin")).is_none());

        let origins =
            parse_cors_origins(Some("https://app.example.com, https://admin.example.com")).unwrap();
        assert_eq!(origins.len(), 2);
        assert_eq!(origins[1], "https://admin.example.com");
    }

    #[tokio::test]
    async fn test_credentials_only_with_origin_list() {
        let listed = preflight(Some("https://app.example.com")).await;
        assert_eq!(
            listed.headers()[header::ACCESS_CONTROL_ALLOW_CREDENTIALS],
            "true"
        );
        assert_eq!(
            listed.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "https://app.example.com"
        );

        for value in [None, Some(""), Some(" , ")] {
            let open = preflight(value).await;
            assert!(open
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS)
                .is_none());
            assert_eq!(open.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        }
    }
}
