//! JWT 액세스 토큰 발급/검증 서비스
//!
//! HS256 대칭 키로 서명하며 클레임은 `sub`(사용자 ID), `username`, `roles`,
//! `iat`, `exp`입니다. 리프레시 토큰은 발급하지 않습니다.
//!
//! [`TokenService`]는 설정(`JWT_SECRET`, `JWT_EXPIRATION_MINUTES`)을 읽어
//! [`JwtCodec`]을 만들어 쓰는 싱글톤이고, 키를 직접 주입해야 하는 곳(테스트,
//! 미들웨어)은 [`JwtCodec`]을 바로 사용합니다.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use jsonwebtoken::errors::ErrorKind;
use singleton_macro::service;
use crate::config::JwtConfig;
use crate::domain::entities::users::user::User;
use crate::domain::models::token::TokenClaims;
use crate::errors::errors::AppError;

#[service(name = "token")]
pub struct TokenService {
    // 외부 의존성 없음
}

impl TokenService {
    /// 현재 설정으로 만든 코덱
    pub fn codec(&self) -> JwtCodec {
        JwtCodec::new(&JwtConfig::secret(), JwtConfig::expiration_minutes())
    }

    pub fn expires_in(&self) -> i64 {
        JwtConfig::expiration_minutes() * 60
    }

    pub fn generate_access_token(&self, user: &User) -> Result<String, AppError> {
        self.codec().generate_access_token(user)
    }

    pub fn verify_token(&self, token: &str) -> Result<TokenClaims, AppError> {
        self.codec().verify_token(token)
    }
}

/// HS256 키 쌍과 만료 시간
pub struct JwtCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiration_minutes: i64,
}

impl JwtCodec {
    pub fn new(secret: &str, expiration_minutes: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expiration_minutes,
        }
    }

    /// 토큰 유효 기간(초)
    pub fn expires_in(&self) -> i64 {
        self.expiration_minutes * 60
    }

    /// 사용자에 대한 액세스 토큰을 발급합니다.
    pub fn generate_access_token(&self, user: &User) -> Result<String, AppError> {
        let now = Utc::now();
        let expiration = now + Duration::minutes(self.expiration_minutes);

        let claims = TokenClaims {
            sub: user.id_string().ok_or_else(|| {
                AppError::InternalError("사용자 ID가 없습니다".to_string())
            })?,
            username: user.username.clone(),
            roles: user.roles.clone(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::InternalError(format!("JWT 토큰 생성 실패: {}", e)))
    }

    /// 서명과 만료를 검증하고 클레임을 반환합니다. 실패는 모두 401입니다.
    pub fn verify_token(&self, token: &str) -> Result<TokenClaims, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        decode::<TokenClaims>(token, &self.decoding_key, &validation)
            .map(|token_data| token_data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => {
                    AppError::AuthenticationError("토큰이 만료되었습니다".to_string())
                }
                _ => {
                    log::debug!("토큰 검증 실패: {}", e);
                    AppError::AuthenticationError("유효하지 않은 토큰입니다".to_string())
                }
            })
    }

    /// `Authorization` 헤더 값에서 Bearer 토큰을 꺼냅니다.
    pub fn extract_bearer_token<'a>(&self, auth_header: &'a str) -> Result<&'a str, AppError> {
        auth_header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| AppError::AuthenticationError("유효하지 않은 인증 헤더 형식입니다".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::oid::ObjectId;

    fn user() -> User {
        let mut user = User::new_local(
            "alice@example.com".to_string(),
            "alice".to_string(),
            None,
            None,
            "hash".to_string(),
        );
        user.id = Some(ObjectId::new());
        user
    }

    #[test]
    fn test_issue_and_verify() {
        let service = JwtCodec::new("test-secret", 5);
        let user = user();

        let token = service.generate_access_token(&user).unwrap();
        let claims = service.verify_token(&token).unwrap();

        assert_eq!(claims.sub, user.id_string().unwrap());
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.roles, vec!["user".to_string()]);
        assert_eq!(claims.exp - claims.iat, 300);
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = JwtCodec::new("secret-a", 5).generate_access_token(&user()).unwrap();

        let result = JwtCodec::new("secret-b", 5).verify_token(&token);

        assert!(matches!(result, Err(AppError::AuthenticationError(_))));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let service = JwtCodec::new("test-secret", -1);
        let token = service.generate_access_token(&user()).unwrap();

        match service.verify_token(&token) {
            Err(AppError::AuthenticationError(msg)) => assert!(msg.contains("만료")),
            other => panic!("expected expiry error, got {:?}", other),
        }
    }

    #[test]
    fn test_user_without_id_cannot_get_token() {
        let mut user = user();
        user.id = None;

        let result = JwtCodec::new("test-secret", 5).generate_access_token(&user);

        assert!(matches!(result, Err(AppError::InternalError(_))));
    }

    #[test]
    fn test_extract_bearer_token() {
        let service = JwtCodec::new("test-secret", 5);

        assert_eq!(service.extract_bearer_token("Bearer abc.def").unwrap(), "abc.def");
        assert!(service.extract_bearer_token("Basic abc").is_err());
        assert!(service.extract_bearer_token("Bearer ").is_err());
    }

    #[test]
    fn test_configured_service_round_trips_its_own_tokens() {
        let service = TokenService::instance();
        let user = user();

        let token = service.generate_access_token(&user).unwrap();
        let claims = service.verify_token(&token).unwrap();

        assert_eq!(claims.sub, user.id_string().unwrap());
        assert_eq!(service.expires_in(), service.codec().expires_in());
    }
}
