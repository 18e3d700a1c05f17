//! JWT 토큰 발급 및 검증.
//!
//! HS256 서명 토큰의 전체 수명 주기(발급, 클레임 추출, 만료, 검증)를 담당합니다.
//! 서버 측 폐기는 지원하지 않으며 만료 시각만이 유효성을 제한합니다.

use std::time::Duration;

use chrono::{DateTime, Utc};
use identity_core::{AccountId, JwtConfig};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// JWT 페이로드.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - 사용자명
    pub sub: String,
    /// 계정 ID
    #[serde(rename = "userId")]
    pub user_id: i64,
    /// Issued At (Unix timestamp, 초)
    pub iat: i64,
    /// Expiration (Unix timestamp, 초)
    pub exp: i64,
}

impl Claims {
    pub fn account_id(&self) -> AccountId {
        AccountId(self.user_id)
    }

    /// `now >= exp`이면 만료입니다.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }
}

/// 발급된 토큰과 만료 시각.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl IssuedToken {
    /// 만료 시각 (epoch 밀리초).
    pub fn expires_at_millis(&self) -> i64 {
        self.expires_at.timestamp_millis()
    }
}

/// 검증을 통과한 토큰의 주체.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenIdentity {
    pub account_id: AccountId,
    pub username: String,
}

/// JWT 처리 에러.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("서명 키가 설정되지 않았습니다")]
    MissingKey,
    #[error("토큰 인코딩 실패: {0}")]
    Encoding(#[from] jsonwebtoken::errors::Error),
    #[error("유효하지 않은 토큰")]
    Invalid,
    #[error("토큰이 만료되었습니다")]
    Expired,
}

/// 토큰 발급/검증기.
///
/// 시작 시 로드한 키로만 동작하며 이후 상태를 갖지 않습니다.
#[derive(Clone)]
pub struct TokenAuthority {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: chrono::Duration,
}

impl TokenAuthority {
    /// 새 토큰 발급기를 생성합니다.
    ///
    /// # Errors
    /// 키가 비어 있으면 `TokenError::MissingKey`.
    pub fn new(secret: &SecretString, ttl: Duration) -> Result<Self, TokenError> {
        let raw = secret.expose_secret();
        if raw.trim().is_empty() {
            return Err(TokenError::MissingKey);
        }

        let ttl = chrono::Duration::from_std(ttl).map_err(|_| TokenError::MissingKey)?;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(raw.as_bytes()),
            decoding_key: DecodingKey::from_secret(raw.as_bytes()),
            ttl,
        })
    }

    pub fn from_config(config: &JwtConfig) -> Result<Self, TokenError> {
        Self::new(&config.secret, config.expiration())
    }

    /// 토큰 유효 기간.
    pub fn ttl(&self) -> chrono::Duration {
        self.ttl
    }

    /// 현재 시각 기준으로 토큰을 발급합니다.
    pub fn issue(&self, account_id: AccountId, username: &str) -> Result<IssuedToken, TokenError> {
        self.issue_at(account_id, username, Utc::now())
    }

    /// 주어진 시각 기준으로 토큰을 발급합니다.
    pub fn issue_at(
        &self,
        account_id: AccountId,
        username: &str,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, TokenError> {
        // 클레임은 초 단위이므로 반환 시각도 같은 정밀도로 맞춤
        let issued_at = whole_seconds(now);
        let expires_at = whole_seconds(issued_at + self.ttl);
        let claims = Claims {
            sub: username.to_string(),
            user_id: account_id.value(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;

        Ok(IssuedToken {
            token,
            issued_at,
            expires_at,
        })
    }

    /// 현재 시각 기준으로 토큰을 검증합니다.
    pub fn validate(&self, token: &str) -> Result<TokenIdentity, TokenError> {
        self.validate_at(token, Utc::now())
    }

    /// 주어진 시각 기준으로 토큰을 검증합니다.
    ///
    /// 서명 불일치나 형식 오류는 `Invalid`, `now >= exp`는 `Expired`.
    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<TokenIdentity, TokenError> {
        let claims = self.extract_claims(token)?;
        if claims.is_expired_at(now) {
            return Err(TokenError::Expired);
        }

        Ok(TokenIdentity {
            account_id: claims.account_id(),
            username: claims.sub,
        })
    }

    /// 만료 여부와 무관하게 클레임을 꺼냅니다.
    ///
    /// 서명은 검증합니다. 만료된 토큰의 주체를 로그에 남길 때 사용합니다.
    pub fn extract_claims(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|_| TokenError::Invalid)
    }
}

impl std::fmt::Debug for TokenAuthority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenAuthority")
            .field("ttl_secs", &self.ttl.num_seconds())
            .finish_non_exhaustive()
    }
}

/// 초 미만을 버린 시각.
fn whole_seconds(at: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp(at.timestamp(), 0).unwrap_or(at)
}
