//! # User HTTP Handlers
//!
//! | 메서드 | 경로 | 설명 | 상태 코드 |
//! |--------|------|------|-----------|
//! | `POST` | `/api/v1/user/register` | 비활성 계정 생성, 활성화 코드 발송 | 201 Created |
//! | `POST` | `/api/v1/user/login` | 아이디/비밀번호 로그인 | 200 OK |
//! | `POST` | `/api/v1/user/activate` | 활성화 코드 확인 | 200 OK |
//! | `GET` | `/api/v1/user/me` | 내 프로필 (캐시 경유) | 200 OK |
//!
//! 에러 응답은 모두 `{"error": "..."}` 형식이며 상태 코드는
//! [`AppError`]의 매핑을 따릅니다.

use actix_web::{web, HttpResponse, post};
use validator::Validate;
use crate::domain::dto::users::request::{ActivationRequest, LoginRequest, RegisterRequest};
use crate::domain::dto::users::response::{ActivationResponse, LoginResponse};
use crate::domain::models::auth::AuthenticatedUser;
use crate::errors::errors::AppError;
use crate::services::auth::TokenService;
use crate::services::users::user_service::UserService;

/// 회원가입
///
/// ```bash
/// curl -X POST http://localhost:8080/api/v1/user/register \
///   -H "Content-Type: application/json" \
///   -d '{"email":"alice@example.com","username":"alice","password":"secret1"}'
/// ```
#[post("/register")]
pub async fn register(
    payload: web::Json<RegisterRequest>,
) -> Result<HttpResponse, AppError> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let service = UserService::instance();
    let response = service.register(payload.into_inner()).await?;

    Ok(HttpResponse::Created().json(response))
}

/// 로그인 후 액세스 토큰을 발급합니다.
///
/// 비활성 계정은 401로 거절됩니다.
#[post("/login")]
pub async fn login(
    payload: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let user = UserService::instance()
        .authenticate(&payload.username, &payload.password)
        .await?;

    let tokens = TokenService::instance();
    let token = tokens.generate_access_token(&user)?;

    log::info!("로그인 성공: {}", user.username);
    Ok(HttpResponse::Ok().json(LoginResponse::bearer(token, tokens.expires_in())))
}

#[post("/activate")]
pub async fn activate(
    payload: web::Json<ActivationRequest>,
) -> Result<HttpResponse, AppError> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let user = UserService::instance()
        .activate(&payload.user_id, &payload.activation_code)
        .await?;

    Ok(HttpResponse::Ok().json(ActivationResponse {
        message: "계정이 활성화되었습니다".to_string(),
        user,
    }))
}

/// 토큰 주인의 프로필. `user:{username}` 캐시를 거칩니다.
///
/// 인증 미들웨어가 감싼 리소스에 `GET`으로 등록됩니다.
pub async fn me(user: AuthenticatedUser) -> Result<HttpResponse, AppError> {
    let profile = UserService::instance()
        .find_user_by_username(&user.username)
        .await?;

    Ok(HttpResponse::Ok().json(profile))
}
