//! 계정 서비스 계층.
//!
//! 가입 코디네이터, 권한 해석기, 계정 서비스를 제공합니다.

pub mod accounts;
pub mod permission;
pub mod registration;

pub use accounts::{AccountChanges, AccountService, LoginOutcome};
pub use permission::PermissionResolver;
pub use registration::{
    Registration, RegistrationCoordinator, RegistrationError, RegistrationMode,
};
