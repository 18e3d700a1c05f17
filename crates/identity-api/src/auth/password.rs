//! 비밀번호 해싱.
//!
//! Argon2id 솔트 해시(PHC 문자열)로 저장하고 비교 검증만 지원합니다.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// 비밀번호 최소 길이 (문자 수).
pub const PASSWORD_MIN_LEN: usize = 6;
/// 비밀번호 최대 길이 (문자 수).
pub const PASSWORD_MAX_LEN: usize = 20;

/// 비밀번호 처리 에러.
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("비밀번호 해싱 실패")]
    HashingFailed,
    #[error("비밀번호 검증 실패")]
    VerificationFailed,
    #[error("잘못된 해시 형식")]
    InvalidHashFormat,
}

/// 솔트를 생성하여 비밀번호를 해싱합니다.
///
/// ```rust,ignore
/// let hash = hash_password("secret1").unwrap();
/// // "$argon2id$v=19$m=19456,t=2,p=1$..."
/// ```
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| PasswordError::HashingFailed)
}

/// 저장된 해시와 평문 비밀번호를 비교합니다.
pub fn verify_password(password: &str, hash: &str) -> Result<(), PasswordError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| PasswordError::InvalidHashFormat)?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| PasswordError::VerificationFailed)
}

/// 일치하면 true. 해시 형식 오류도 불일치로 취급합니다.
pub fn password_matches(password: &str, hash: &str) -> bool {
    verify_password(password, hash).is_ok()
}

/// 비밀번호 길이 정책 검사.
pub fn validate_password_length(password: &str) -> Result<(), &'static str> {
    let len = password.chars().count();
    if !(PASSWORD_MIN_LEN..=PASSWORD_MAX_LEN).contains(&len) {
        return Err("비밀번호는 6-20자여야 합니다");
    }
    Ok(())
}
