//! # Authentication Configuration Module
//!
//! JWT 토큰, 계정 활성화 코드(OTP), Google OAuth 설정을 관리합니다.
//!
//! ## 환경 변수
//!
//! ```bash
//! export JWT_SECRET="your-super-secret-jwt-key-at-least-32-characters"
//! export JWT_EXPIRATION_MINUTES=5
//! export OTP_TTL_SECONDS=300
//! export GOOGLE_CLIENT_ID="123456789-abc.apps.googleusercontent.com"
//! export GOOGLE_CLIENT_SECRET="..."
//! export GOOGLE_REDIRECT_URL="http://localhost:8080/api/v1/user/google/callback"
//! ```

use std::env;
use std::time::Duration;

/// JWT 토큰 설정
pub struct JwtConfig;

impl JwtConfig {
    /// HS256 서명 비밀 키
    ///
    /// 설정되지 않으면 경고를 남기고 개발용 기본값을 사용합니다.
    pub fn secret() -> String {
        env::var("JWT_SECRET").unwrap_or_else(|_| {
            log::warn!("JWT_SECRET not set, using default (not secure for production!)");
            "your-secret-key".to_string()
        })
    }

    /// 액세스 토큰 만료 시간(분). 기본값: 5
    pub fn expiration_minutes() -> i64 {
        env::var("JWT_EXPIRATION_MINUTES")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .filter(|minutes: &i64| *minutes > 0)
            .unwrap_or(5)
    }
}

/// 계정 활성화 코드 설정
pub struct OtpConfig;

impl OtpConfig {
    /// 활성화 코드 자릿수
    pub const DIGITS: usize = 6;

    /// 활성화 코드 유효 시간. 기본값: 300초
    pub fn ttl() -> Duration {
        let seconds = env::var("OTP_TTL_SECONDS")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .filter(|seconds: &u64| *seconds > 0)
            .unwrap_or(300);
        Duration::from_secs(seconds)
    }
}

/// Google OAuth 2.0 설정
///
/// 필수 값이 없으면 `None`이며, Google 로그인 요청만 실패하고 서버는 정상 동작합니다.
pub struct GoogleOAuthConfig;

impl GoogleOAuthConfig {
    pub fn client_id() -> Option<String> {
        non_empty_var("GOOGLE_CLIENT_ID")
    }

    pub fn client_secret() -> Option<String> {
        non_empty_var("GOOGLE_CLIENT_SECRET")
    }

    /// 콜백 URL. `GOOGLE_REDIRECT_URI`도 받습니다.
    pub fn redirect_url() -> Option<String> {
        non_empty_var("GOOGLE_REDIRECT_URL").or_else(|| non_empty_var("GOOGLE_REDIRECT_URI"))
    }

    pub fn auth_uri() -> String {
        non_empty_var("GOOGLE_AUTH_URI")
            .unwrap_or_else(|| "https://accounts.google.com/o/oauth2/auth".to_string())
    }

    pub fn token_uri() -> String {
        non_empty_var("GOOGLE_TOKEN_URI")
            .unwrap_or_else(|| "https://oauth2.googleapis.com/token".to_string())
    }

    pub fn userinfo_uri() -> String {
        non_empty_var("GOOGLE_USERINFO_URI")
            .unwrap_or_else(|| "https://www.googleapis.com/oauth2/v2/userinfo".to_string())
    }

    /// 로그인 시작부터 콜백까지 허용하는 시간. 기본값: 10분
    pub fn state_ttl_seconds() -> i64 {
        env::var("GOOGLE_OAUTH_STATE_TTL_SECONDS")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .filter(|seconds: &i64| *seconds > 0)
            .unwrap_or(600)
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_env() {
        if env::var("JWT_EXPIRATION_MINUTES").is_err() {
            assert_eq!(JwtConfig::expiration_minutes(), 5);
        }

        if env::var("OTP_TTL_SECONDS").is_err() {
            assert_eq!(OtpConfig::ttl(), Duration::from_secs(300));
        }
    }

    #[test]
    fn test_google_endpoints_default_to_google() {
        if env::var("GOOGLE_TOKEN_URI").is_err() {
            assert_eq!(GoogleOAuthConfig::token_uri(), "https://oauth2.googleapis.com/token");
        }
        if env::var("GOOGLE_USERINFO_URI").is_err() {
            assert!(GoogleOAuthConfig::userinfo_uri().ends_with("/oauth2/v2/userinfo"));
        }
        if env::var("GOOGLE_OAUTH_STATE_TTL_SECONDS").is_err() {
            assert_eq!(GoogleOAuthConfig::state_ttl_seconds(), 600);
        }
    }
}
