//! 인증 관련 서비스
//!
//! - [`token_service`]: JWT 액세스 토큰 발급/검증
//! - [`google_auth_service`]: Google 로그인

pub mod token_service;
pub mod google_auth_service;

pub use token_service::{JwtCodec, TokenService};
pub use google_auth_service::GoogleAuthService;
