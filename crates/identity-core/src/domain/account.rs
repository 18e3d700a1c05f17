//! 계정 도메인 모델.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 계정 식별자.
///
/// 생성 시 저장소가 할당하며 이후 변경되지 않습니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub i64);

impl AccountId {
    pub fn value(self) -> i64 {
        self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for AccountId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl std::str::FromStr for AccountId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<i64>().map(Self)
    }
}

/// 삭제되지 않은 계정 사이에서 고유해야 하는 필드.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum UniqueField {
    Username,
    Email,
    Phone,
}

impl UniqueField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Username => "username",
            Self::Email => "email",
            Self::Phone => "phone",
        }
    }

    /// 클라이언트에 노출되는 충돌 메시지.
    pub fn conflict_message(&self) -> &'static str {
        match self {
            Self::Username => "이미 사용 중인 사용자명입니다",
            Self::Email => "이미 등록된 이메일입니다",
            Self::Phone => "이미 등록된 전화번호입니다",
        }
    }
}

impl fmt::Display for UniqueField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 저장된 사용자 계정.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub username: String,
    /// PHC 형식의 솔트 해시
    pub password_hash: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// 소프트 삭제 플래그
    pub deleted: bool,
}

// 해시는 로그에 남기지 않는다.
impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password_hash", &"<redacted>")
            .field("email", &self.email)
            .field("phone", &self.phone)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .field("deleted", &self.deleted)
            .finish()
    }
}

impl Account {
    /// 수정 시각을 갱신합니다.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// 검색 가능한(삭제되지 않은) 계정인지 확인합니다.
    pub fn is_active(&self) -> bool {
        !self.deleted
    }
}

/// 아직 저장되지 않은 계정.
#[derive(Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub username: String,
    pub password_hash: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl fmt::Debug for NewAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewAccount")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("phone", &self.phone)
            .finish_non_exhaustive()
    }
}

impl NewAccount {
    /// 저장소가 할당한 식별자로 계정을 완성합니다.
    pub fn into_account(self, id: AccountId) -> Account {
        let now = Utc::now();
        Account {
            id,
            username: self.username,
            password_hash: self.password_hash,
            email: self.email,
            phone: self.phone,
            created_at: now,
            updated_at: now,
            deleted: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_id_parse() {
        assert_eq!("42".parse::<AccountId>().unwrap(), AccountId(42));
        assert_eq!(" 7 ".parse::<AccountId>().unwrap(), AccountId(7));
        assert!("abc".parse::<AccountId>().is_err());
    }

    #[test]
    fn test_debug_redacts_hash() {
        let account = NewAccount {
            username: "alice".to_string(),
            password_hash: "$argon2id$v=19$secret".to_string(),
            email: None,
            phone: None,
        }
        .into_account(AccountId(1));

        let printed = format!("{:?}", account);
        assert!(printed.contains("alice"));
        assert!(!printed.contains("argon2id"));
        assert!(account.is_active());
        assert_eq!(account.created_at, account.updated_at);
    }
}
