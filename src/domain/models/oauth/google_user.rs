//! Google OAuth 2.0 응답 모델

use serde::{Deserialize, Serialize};

/// 토큰 엔드포인트 응답 (`authorization_code` 교환)
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleTokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub scope: Option<String>,
}

/// `oauth2/v2/userinfo` 응답
///
/// Google은 동의 범위에 따라 필드를 생략하므로 모두 선택값입니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoogleUserInfo {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub verified_email: Option<bool>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub given_name: Option<String>,
    #[serde(default)]
    pub family_name: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
}

/// 로그인 URL의 `state`로 쓰이는 서명된 클레임
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OAuthStateClaims {
    pub nonce: String,
    pub iat: i64,
    pub exp: i64,
}
