//! 사용자 API endpoint.
//!
//! # 엔드포인트
//!
//! - `POST /user/register` - 회원가입 (인증 불필요)
//! - `POST /user/login` - 로그인 (인증 불필요)
//! - `GET /user/users` - 사용자 목록 조회
//! - `GET /user/info/{user_id}` - 사용자 정보 조회
//! - `PUT /user/{user_id}` - 사용자 정보 수정
//! - `POST /user/reset-password` - 비밀번호 변경

pub mod types;

pub use types::*;

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    routing::{get, post, put},
    Router,
};
use identity_core::{AccountId, Page, ServiceError};

use crate::auth::{ClientIp, CurrentUser};
use crate::error::{ApiResponse, ApiResult, ValidatedJson};
use crate::state::AppState;

fn path_account_id(path: Result<Path<i64>, PathRejection>) -> Result<AccountId, ServiceError> {
    path.map(|Path(id)| AccountId(id))
        .map_err(|_| ServiceError::validation("사용자 ID가 올바르지 않습니다"))
}

/// 회원가입.
///
/// POST /user/register
#[utoipa::path(
    post,
    path = "/user/register",
    tag = "users",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "가입 성공", body = ApiResponse<UserInfoResponse>),
        (status = 400, description = "입력 오류 또는 중복된 사용자명/이메일/전화번호"),
        (status = 500, description = "역할 바인딩 실패 (가입 취소됨)")
    )
)]
pub async fn register(
    State(state): State<Arc<AppState>>,
    ClientIp(ip): ClientIp,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> ApiResult<UserInfoResponse> {
    let account = state
        .registration
        .register(request.into(), ip)
        .await
        .map_err(ServiceError::from)?;
    Ok(ApiResponse::success_with("회원가입 성공", account.into()))
}

/// 로그인.
///
/// POST /user/login
#[utoipa::path(
    post,
    path = "/user/login",
    tag = "users",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "로그인 성공", body = ApiResponse<LoginResponse>),
        (status = 401, description = "사용자명 또는 비밀번호 불일치")
    )
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    ClientIp(ip): ClientIp,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let outcome = state
        .accounts
        .login(&request.username, &request.password, ip)
        .await?;
    Ok(ApiResponse::success_with("로그인 성공", outcome.into()))
}

/// 사용자 목록 조회.
///
/// 관리자는 전체 목록, 일반 사용자는 본인만 조회됩니다.
///
/// GET /user/users?page=0&size=10
#[utoipa::path(
    get,
    path = "/user/users",
    tag = "users",
    params(PageQuery),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "조회 성공", body = ApiResponse<Page<UserInfoResponse>>),
        (status = 401, description = "인증 필요")
    )
)]
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    ClientIp(ip): ClientIp,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResult<Page<UserInfoResponse>> {
    let Query(query) =
        query.map_err(|_| ServiceError::validation("페이지 파라미터가 올바르지 않습니다"))?;

    let page = state
        .accounts
        .list_accounts(user.account_id, query.to_request(), ip)
        .await?;
    Ok(ApiResponse::success(page.map(UserInfoResponse::from)))
}

/// 사용자 정보 조회.
///
/// GET /user/info/{user_id}
#[utoipa::path(
    get,
    path = "/user/info/{user_id}",
    tag = "users",
    params(("user_id" = i64, Path, description = "사용자 ID")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "조회 성공", body = ApiResponse<UserInfoResponse>),
        (status = 401, description = "인증 필요"),
        (status = 403, description = "다른 사용자 조회 권한 없음"),
        (status = 404, description = "사용자 없음")
    )
)]
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    ClientIp(ip): ClientIp,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<UserInfoResponse> {
    let target = path_account_id(path)?;
    let account = state
        .accounts
        .get_account(user.account_id, target, ip)
        .await?;
    Ok(ApiResponse::success(account.into()))
}

/// 사용자 정보 수정.
///
/// PUT /user/{user_id}
#[utoipa::path(
    put,
    path = "/user/{user_id}",
    tag = "users",
    params(("user_id" = i64, Path, description = "사용자 ID")),
    request_body = UpdateUserRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "수정 성공", body = ApiResponse<UserInfoResponse>),
        (status = 400, description = "입력 오류 또는 중복된 이메일/전화번호"),
        (status = 401, description = "인증 필요"),
        (status = 403, description = "다른 사용자 수정 권한 없음"),
        (status = 404, description = "사용자 없음")
    )
)]
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    ClientIp(ip): ClientIp,
    path: Result<Path<i64>, PathRejection>,
    ValidatedJson(request): ValidatedJson<UpdateUserRequest>,
) -> ApiResult<UserInfoResponse> {
    let target = path_account_id(path)?;
    let account = state
        .accounts
        .update_account(user.account_id, target, request.into(), ip)
        .await?;
    Ok(ApiResponse::success_with("수정 성공", account.into()))
}

/// 비밀번호 변경.
///
/// POST /user/reset-password
#[utoipa::path(
    post,
    path = "/user/reset-password",
    tag = "users",
    request_body = ResetPasswordRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "변경 성공"),
        (status = 400, description = "기존 비밀번호 불일치 또는 입력 오류"),
        (status = 401, description = "인증 필요"),
        (status = 404, description = "사용자 없음")
    )
)]
pub async fn reset_password(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    ClientIp(ip): ClientIp,
    ValidatedJson(request): ValidatedJson<ResetPasswordRequest>,
) -> ApiResult<()> {
    state
        .accounts
        .reset_password(
            user.account_id,
            &request.old_password,
            &request.new_password,
            ip,
        )
        .await?;
    Ok(ApiResponse::success_with("비밀번호 변경 성공", ()))
}

/// 사용자 라우터 생성.
pub fn users_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/users", get(list_users))
        .route("/info/{user_id}", get(get_user))
        .route("/reset-password", post(reset_password))
        .route("/{user_id}", put(update_user))
}
