//! 인증 및 권한 부여.
//!
//! # 구성 요소
//!
//! - [`TokenAuthority`]: HS256 JWT 발급/검증
//! - [`hash_password`] / [`verify_password`]: Argon2 비밀번호 해싱
//! - [`require_auth`]: Bearer 토큰 미들웨어와 [`CurrentUser`] 추출기
//! - [`authorize`] / [`listing_scope`]: 역할 기반 접근 게이트
//!
//! ```rust,ignore
//! async fn handler(user: CurrentUser) -> impl IntoResponse {
//!     format!("Hello, {}!", user.username)
//! }
//! ```

mod gate;
mod jwt;
mod middleware;
mod password;

pub use gate::{authorize, listing_scope, AccessDecision, ListingScope};
pub use jwt::{Claims, IssuedToken, TokenAuthority, TokenError, TokenIdentity};
pub use middleware::{is_public, require_auth, ClientIp, CurrentUser};
pub use password::{
    hash_password, password_matches, validate_password_length, verify_password, PasswordError,
    PASSWORD_MAX_LEN, PASSWORD_MIN_LEN,
};
