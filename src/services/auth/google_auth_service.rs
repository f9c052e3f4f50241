//! Google 로그인 (OAuth 2.0 Authorization Code Grant)
//!
//! ```text
//! GET /google/login     ──▶ login_url + state (서명된 단기 토큰)
//! GET /google/callback  ──▶ state 검증 ──▶ code → access_token 교환
//!                       ──▶ userinfo 조회 ──▶ 이메일로 찾거나 생성 ──▶ JWT 발급
//! ```
//!
//! `state`는 `JWT_SECRET`으로 서명한 HS256 토큰이라 서버에 따로 저장하지 않습니다.

use std::sync::Arc;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use once_cell::sync::Lazy;
use rand::Rng;
use singleton_macro::service;
use crate::config::{GoogleOAuthConfig, JwtConfig};
use crate::domain::dto::users::OAuthLoginUrlResponse;
use crate::domain::entities::users::user::User;
use crate::domain::models::oauth::{GoogleTokenResponse, GoogleUserInfo, OAuthStateClaims};
use crate::errors::errors::AppError;
use crate::services::users::UserService;

const SCOPE: &str = "openid email profile";

static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(reqwest::Client::new);

#[service(name = "google_auth")]
pub struct GoogleAuthService {
    user_service: Arc<UserService>,
}

impl GoogleAuthService {
    /// Google 인증 페이지 URL과 `state`를 만듭니다.
    pub fn get_login_url(&self) -> Result<OAuthLoginUrlResponse, AppError> {
        let client_id = required(GoogleOAuthConfig::client_id(), "GOOGLE_CLIENT_ID")?;
        let redirect_url = required(GoogleOAuthConfig::redirect_url(), "GOOGLE_REDIRECT_URL")?;
        let state = issue_state(&JwtConfig::secret(), GoogleOAuthConfig::state_ttl_seconds())?;

        let login_url = build_login_url(&GoogleOAuthConfig::auth_uri(), &client_id, &redirect_url, &state);
        Ok(OAuthLoginUrlResponse { login_url, state })
    }

    /// 콜백의 `code`로 사용자를 확인하고 계정을 찾거나 만듭니다.
    pub async fn authenticate_with_code(&self, code: &str, state: &str) -> Result<User, AppError> {
        verify_state(&JwtConfig::secret(), state)?;

        let token = self.exchange_code_for_token(code).await?;
        let info = self.get_user_info(&token.access_token).await?;
        log::debug!("Google 사용자 정보 수신 - email: {:?}", info.email);

        self.user_service.find_or_create_by_email(&info).await
    }

    async fn exchange_code_for_token(&self, code: &str) -> Result<GoogleTokenResponse, AppError> {
        let client_id = required(GoogleOAuthConfig::client_id(), "GOOGLE_CLIENT_ID")?;
        let client_secret = required(GoogleOAuthConfig::client_secret(), "GOOGLE_CLIENT_SECRET")?;
        let redirect_url = required(GoogleOAuthConfig::redirect_url(), "GOOGLE_REDIRECT_URL")?;

        let params = [
            ("code", code),
            ("client_id", client_id.as_str()),
            ("client_secret", client_secret.as_str()),
            ("redirect_uri", redirect_url.as_str()),
            ("grant_type", "authorization_code"),
        ];

        let response = HTTP_CLIENT
            .post(GoogleOAuthConfig::token_uri())
            .form(&params)
            .send()
            .await
            .map_err(|e| AppError::ExternalServiceError(format!("Google 토큰 요청 실패: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            log::warn!("Google 토큰 교환 실패 - status: {}, body: {}", status, error_text);
            return Err(AppError::AuthenticationError("Google 인증 코드가 유효하지 않습니다".to_string()));
        }

        response
            .json::<GoogleTokenResponse>()
            .await
            .map_err(|e| AppError::ExternalServiceError(format!("Google 토큰 응답 파싱 실패: {}", e)))
    }

    async fn get_user_info(&self, access_token: &str) -> Result<GoogleUserInfo, AppError> {
        let response = HTTP_CLIENT
            .get(GoogleOAuthConfig::userinfo_uri())
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::ExternalServiceError(format!("Google 사용자 정보 요청 실패: {}", e)))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalServiceError(format!(
                "Google 사용자 정보 조회 실패: {}",
                error_text
            )));
        }

        response
            .json::<GoogleUserInfo>()
            .await
            .map_err(|e| AppError::ExternalServiceError(format!("Google 사용자 정보 파싱 실패: {}", e)))
    }
}

fn required(value: Option<String>, name: &str) -> Result<String, AppError> {
    value.ok_or_else(|| AppError::InternalError(format!("{}가 설정되지 않았습니다", name)))
}

/// 쿼리 값을 인코딩해 인증 페이지 URL을 만듭니다.
pub fn build_login_url(auth_uri: &str, client_id: &str, redirect_url: &str, state: &str) -> String {
    let params = [
        ("client_id", client_id),
        ("redirect_uri", redirect_url),
        ("scope", SCOPE),
        ("response_type", "code"),
        ("state", state),
    ];

    let query_string = params
        .iter()
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");

    format!("{}?{}", auth_uri, query_string)
}

/// `ttl_seconds` 동안 유효한 서명된 `state`
pub fn issue_state(secret: &str, ttl_seconds: i64) -> Result<String, AppError> {
    let now = Utc::now();
    let mut rng = rand::rng();
    let nonce: String = (0..16)
        .map(|_| char::from_digit(rng.random_range(0..16u32), 16).unwrap_or('0'))
        .collect();

    let claims = OAuthStateClaims {
        nonce,
        iat: now.timestamp(),
        exp: (now + Duration::seconds(ttl_seconds)).timestamp(),
    };

    encode(&Header::new(Algorithm::HS256), &claims, &EncodingKey::from_secret(secret.as_bytes()))
        .map_err(|e| AppError::InternalError(format!("OAuth state 생성 실패: {}", e)))
}

/// 서명과 만료를 확인합니다. 실패는 모두 401입니다.
pub fn verify_state(secret: &str, state: &str) -> Result<OAuthStateClaims, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;

    decode::<OAuthStateClaims>(state, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(|e| {
            log::debug!("OAuth state 검증 실패: {}", e);
            AppError::AuthenticationError("유효하지 않은 OAuth state입니다".to_string())
        })
}
