//! 도메인 모델.

mod account;
mod page;
mod permission;

pub use account::*;
pub use page::*;
pub use permission::*;
