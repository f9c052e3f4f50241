//! 요청 처리 중에만 존재하는 도메인 모델 (인증 주체, 토큰 클레임, Google 응답)

pub mod auth;
pub mod token;
pub mod oauth;

pub use auth::*;
pub use token::*;
pub use oauth::*;
