//! 비즈니스 로직 계층
//!
//! - [`users`]: 가입, 로그인, 프로필 조회(cache-aside), 계정 활성화
//! - [`auth`]: JWT 발급/검증, Google 로그인
//! - [`cache`]: 관리자용 캐시 무효화
//! - [`mail`]: 활성화 코드 발송

pub mod users;
pub mod auth;
pub mod cache;
pub mod mail;
