//! 설정 관리.
//!
//! 이 모듈은 애플리케이션 설정을 정의하고 관리합니다.
//! 로딩 순서는 내장 기본값 → TOML 파일(선택) → `IDENTITY__*` 환경 변수입니다.

use std::path::Path;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize};

/// 기본 설정 파일 경로.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// 환경 변수 접두사.
pub const ENV_PREFIX: &str = "IDENTITY";

/// 애플리케이션 설정.
///
/// JWT 비밀키를 `SecretString`으로 보관하므로 `Clone`을 구현하지 않습니다.
/// 여러 곳에서 공유할 때는 `Arc<AppConfig>`를 사용하세요.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// 서버 설정
    pub server: ServerConfig,
    /// 데이터베이스 설정
    pub database: DatabaseConfig,
    /// JWT 설정
    pub jwt: JwtConfig,
    /// 배포 모드 설정
    pub deployment: DeploymentConfig,
    /// 원격 권한 서비스 설정
    pub permission: PermissionServiceConfig,
    /// 작업 로그 수집기 설정
    pub log_sink: LogSinkConfig,
    /// 로깅 설정
    pub logging: LoggingConfig,
}

/// 서버 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 바인딩할 호스트
    pub host: String,
    /// 리스닝할 포트
    pub port: u16,
    /// 요청 타임아웃 (초)
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8081,
            request_timeout_secs: 30,
        }
    }
}

/// 데이터베이스 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// PostgreSQL 연결 URL. 없으면 메모리 저장소를 사용합니다.
    pub url: Option<String>,
    /// 최대 연결 수
    pub max_connections: u32,
    /// 연결 획득 타임아웃 (초)
    pub acquire_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 10,
            acquire_timeout_secs: 5,
        }
    }
}

/// JWT 설정.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct JwtConfig {
    /// HS256 서명 키
    #[serde(deserialize_with = "deserialize_secret")]
    pub secret: SecretString,
    /// 토큰 유효 기간 (초)
    pub expiration_secs: u64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: SecretString::new(String::new().into_boxed_str()),
            expiration_secs: 86_400,
        }
    }
}

impl JwtConfig {
    /// 유효 기간을 `Duration`으로 반환합니다.
    pub fn expiration(&self) -> Duration {
        Duration::from_secs(self.expiration_secs)
    }
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(SecretString::new(raw.into_boxed_str()))
}

/// 가입 및 권한 조회 동작을 결정하는 배포 모드.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentMode {
    /// 원격 권한 서비스와 연동
    Distributed,
    /// 로컬 상태만 사용
    #[default]
    Standalone,
}

impl std::fmt::Display for DeploymentMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Distributed => write!(f, "distributed"),
            Self::Standalone => write!(f, "standalone"),
        }
    }
}

impl std::str::FromStr for DeploymentMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "distributed" => Ok(Self::Distributed),
            "standalone" | "simple" => Ok(Self::Standalone),
            _ => Err(format!("Unknown deployment mode: {}", s)),
        }
    }
}

/// 배포 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct DeploymentConfig {
    pub mode: DeploymentMode,
}

/// 원격 권한 서비스 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PermissionServiceConfig {
    /// 권한 서비스 기본 URL (예: `http://permission-service:8082`)
    pub base_url: Option<String>,
    /// 요청 타임아웃 (밀리초)
    pub timeout_ms: u64,
}

impl Default for PermissionServiceConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_ms: 3_000,
        }
    }
}

impl PermissionServiceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// 작업 로그 수집기 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LogSinkConfig {
    /// 수집기 엔드포인트. 없으면 tracing 출력만 사용합니다.
    pub endpoint: Option<String>,
    /// 전송 타임아웃 (밀리초)
    pub timeout_ms: u64,
}

impl Default for LogSinkConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_ms: 2_000,
        }
    }
}

impl LogSinkConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// 파일이 없어도 에러가 아닙니다. 로드 후 [`AppConfig::validate`]를 통과해야 합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            // 파일에서 로드
            .add_source(config::File::from(path.as_ref()).required(false))
            // 환경 변수로 오버라이드
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            );

        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// 기본 경로에서 설정을 로드합니다.
    ///
    /// `IDENTITY_CONFIG` 환경 변수가 있으면 해당 경로를 사용합니다.
    pub fn load_default() -> Result<Self, config::ConfigError> {
        let path =
            std::env::var("IDENTITY_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load(path)
    }

    /// 시작 시점에 치명적인 설정 오류를 검사합니다.
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.jwt.secret.expose_secret().trim().is_empty() {
            return Err(config::ConfigError::Message(
                "jwt.secret이 비어 있습니다".to_string(),
            ));
        }

        if self.jwt.expiration_secs == 0 {
            return Err(config::ConfigError::Message(
                "jwt.expiration_secs는 0보다 커야 합니다".to_string(),
            ));
        }

        if self.deployment.mode == DeploymentMode::Distributed
            && self
                .permission
                .base_url
                .as_deref()
                .map_or(true, |url| url.trim().is_empty())
        {
            return Err(config::ConfigError::Message(
                "distributed 모드에는 permission.base_url이 필요합니다".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_secret(secret: &str) -> AppConfig {
        AppConfig {
            jwt: JwtConfig {
                secret: SecretString::new(secret.to_string().into_boxed_str()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.jwt.expiration_secs, 86_400);
        assert_eq!(config.permission.timeout_ms, 3_000);
        assert_eq!(config.deployment.mode, DeploymentMode::Standalone);
        assert!(config.database.url.is_none());
    }

    #[test]
    fn test_empty_secret_is_rejected() {
        assert!(AppConfig::default().validate().is_err());
        assert!(config_with_secret("   ").validate().is_err());
        assert!(config_with_secret("s3cret").validate().is_ok());
    }

    #[test]
    fn test_distributed_requires_base_url() {
        let mut config = config_with_secret("s3cret");
        config.deployment.mode = DeploymentMode::Distributed;
        assert!(config.validate().is_err());

        config.permission.base_url = Some("http://localhost:8082".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_deployment_mode_from_str() {
        assert_eq!(
            "distributed".parse::<DeploymentMode>().unwrap(),
            DeploymentMode::Distributed
        );
        assert_eq!(
            "STANDALONE".parse::<DeploymentMode>().unwrap(),
            DeploymentMode::Standalone
        );
        assert_eq!(
            "simple".parse::<DeploymentMode>().unwrap(),
            DeploymentMode::Standalone
        );
        assert!("cluster".parse::<DeploymentMode>().is_err());
    }

    #[test]
    fn test_deserialize_from_toml_source() {
        let raw = r#"
            [jwt]
            secret = "from-file"
            expiration_secs = 60

            [deployment]
            mode = "distributed"

            [permission]
            base_url = "http://permission:8082"
        "#;

        let config: AppConfig = config::Config::builder()
            .add_source(config::File::from_str(raw, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.jwt.secret.expose_secret(), "from-file");
        assert_eq!(config.jwt.expiration_secs, 60);
        assert_eq!(config.deployment.mode, DeploymentMode::Distributed);
        assert_eq!(config.server.port, 8081);
        assert!(config.validate().is_ok());
    }
}
