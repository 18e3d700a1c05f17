//! Axum용 Bearer 토큰 인증 미들웨어.
//!
//! 허용 목록을 제외한 모든 경로는 핸들러 실행 전에 토큰 검증을 통과해야 합니다.
//! 검증된 주체는 요청 extension에 [`CurrentUser`]로 저장됩니다.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, Method},
    middleware::Next,
    response::{IntoResponse, Response},
};
use identity_core::{AccountId, AuthFailure, ServiceError};
use tracing::{debug, warn};

use super::jwt::TokenError;
use crate::error::ApiError;
use crate::state::AppState;

/// 토큰 없이 접근 가능한 경로 접두사.
const PUBLIC_PREFIXES: &[&str] = &["/health", "/swagger-ui", "/api-docs"];

/// 인증 없이 접근 가능한 요청인지 확인합니다.
pub fn is_public(method: &Method, path: &str) -> bool {
    if *method == Method::OPTIONS {
        return true;
    }

    let exact = match path {
        "/user/register" | "/user/login" => *method == Method::POST,
        "/metrics" => *method == Method::GET,
        _ => false,
    };

    exact
        || PUBLIC_PREFIXES
            .iter()
            .any(|prefix| path == *prefix || path.starts_with(&format!("{}/", prefix)))
}

/// 인증된 요청자.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub account_id: AccountId,
    pub username: String,
}

/// `Authorization: Bearer <token>` 헤더에서 토큰을 꺼냅니다.
fn bearer_token(headers: &axum::http::HeaderMap) -> Result<&str, AuthFailure> {
    let header = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AuthFailure::MissingToken)?;

    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AuthFailure::InvalidToken)
}

/// Bearer 토큰 인증 미들웨어.
///
/// `middleware::from_fn_with_state`로 등록합니다.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    if is_public(request.method(), &path) {
        return next.run(request).await;
    }

    let token = match bearer_token(request.headers()) {
        Ok(token) => token.to_string(),
        Err(failure) => {
            debug!(path = %path, reason = failure.as_str(), "Rejected request without usable token");
            return ApiError::from(ServiceError::Unauthenticated(failure)).into_response();
        }
    };

    match state.tokens.validate(&token) {
        Ok(identity) => {
            request.extensions_mut().insert(CurrentUser {
                account_id: identity.account_id,
                username: identity.username,
            });
            next.run(request).await
        }
        Err(TokenError::Expired) => {
            // 만료된 토큰도 서명이 맞으면 주체를 기록한다
            let subject = state.tokens.extract_claims(&token).ok().map(|c| c.sub);
            warn!(path = %path, subject = ?subject, "Rejected expired token");
            ApiError::from(ServiceError::Unauthenticated(AuthFailure::ExpiredToken)).into_response()
        }
        Err(e) => {
            warn!(path = %path, error = %e, "Rejected invalid token");
            ApiError::from(ServiceError::Unauthenticated(AuthFailure::InvalidToken)).into_response()
        }
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(|| ServiceError::Unauthenticated(AuthFailure::MissingToken).into())
    }
}

/// 요청자 IP 주소.
///
/// `X-Forwarded-For`의 첫 값, `X-Real-IP`, 소켓 주소 순으로 찾습니다.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientIp(pub Option<String>);

impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header_value = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.split(',').next())
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let ip = header_value("x-forwarded-for")
            .or_else(|| header_value("x-real-ip"))
            .or_else(|| {
                parts
                    .extensions
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|ConnectInfo(addr)| addr.ip().to_string())
            });

        Ok(ClientIp(ip))
    }
}
