//! 통합 API 응답 봉투 및 에러 변환.
//!
//! 모든 엔드포인트는 성공/실패와 무관하게 동일한 형식으로 응답합니다.
//!
//! ```json
//! {
//!   "code": 403,
//!   "message": "접근 권한이 없습니다",
//!   "data": null,
//!   "timestamp": 1738300800000
//! }
//! ```
//!
//! HTTP 상태 코드는 봉투의 `code`와 같습니다.

use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use identity_core::ServiceError;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// 성공 응답 기본 메시지.
pub const SUCCESS_MESSAGE: &str = "성공";

/// 통합 응답 봉투.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// 결과 코드 (200, 400, 401, 403, 404, 500)
    pub code: u16,
    /// 사람이 읽을 수 있는 메시지
    pub message: String,
    /// 응답 데이터 (실패 시 null)
    pub data: Option<T>,
    /// 응답 생성 시각 (epoch 밀리초)
    pub timestamp: i64,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self::success_with(SUCCESS_MESSAGE, data)
    }

    pub fn success_with(message: impl Into<String>, data: T) -> Self {
        Self {
            code: StatusCode::OK.as_u16(),
            message: message.into(),
            data: Some(data),
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    pub fn error(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == StatusCode::OK.as_u16()
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

/// 핸들러 에러.
///
/// `ServiceError`를 응답 봉투로 바꿉니다. 서버 측 에러의 상세 내용은
/// 로그에만 남기고 클라이언트에는 고정 메시지만 보냅니다.
#[derive(Debug)]
pub struct ApiError(pub ServiceError);

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        Self(err)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        if err.is_server_error() {
            tracing::error!(kind = err.kind(), error = %err, "Request failed");
        } else {
            tracing::debug!(kind = err.kind(), error = %err, "Request rejected");
        }

        ApiResponse::<()>::error(err.code(), err.message()).into_response()
    }
}

/// 핸들러 반환 타입.
pub type ApiResult<T> = Result<ApiResponse<T>, ApiError>;

/// 검증 에러 목록에서 첫 메시지를 꺼냅니다.
pub fn first_validation_message(errors: &validator::ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{}: 유효하지 않은 값", field))
            })
        })
        .next()
        .unwrap_or_else(|| "입력값이 올바르지 않습니다".to_string())
}

/// JSON 본문을 역직렬화한 뒤 `validator` 규칙을 적용하는 extractor.
///
/// 파싱 실패와 규칙 위반 모두 400 `Validation`으로 응답합니다.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection: JsonRejection| {
                tracing::debug!(error = %rejection.body_text(), "Malformed request body");
                ServiceError::validation("요청 본문 형식이 올바르지 않습니다")
            })?;

        if let Err(errors) = value.validate() {
            return Err(ServiceError::Validation(first_validation_message(&errors)).into());
        }

        Ok(ValidatedJson(value))
    }
}
