//! Google 로그인 핸들러
//!
//! | 메서드 | 경로 | 설명 |
//! |--------|------|------|
//! | `GET` | `/api/v1/user/google/login` | 인증 페이지 URL과 `state` |
//! | `GET` | `/api/v1/user/google/callback?code=&state=` | 로그인 후 액세스 토큰 발급 |

use actix_web::{get, web, HttpResponse};
use crate::domain::dto::users::request::GoogleCallbackQuery;
use crate::domain::dto::users::response::LoginResponse;
use crate::errors::errors::AppError;
use crate::services::auth::{GoogleAuthService, TokenService};

#[get("/google/login")]
pub async fn google_login_url() -> Result<HttpResponse, AppError> {
    let url_response = GoogleAuthService::instance().get_login_url()?;

    Ok(HttpResponse::Ok().json(url_response))
}

/// Google이 돌려보낸 `code`로 로그인합니다.
///
/// 응답은 `/login`과 같은 [`LoginResponse`]입니다.
#[get("/google/callback")]
pub async fn google_callback(
    query: web::Query<GoogleCallbackQuery>,
) -> Result<HttpResponse, AppError> {
    let (code, state) = callback_params(&query)?;

    let user = GoogleAuthService::instance()
        .authenticate_with_code(code, state)
        .await?;

    let tokens = TokenService::instance();
    let token = tokens.generate_access_token(&user)?;

    log::info!("Google 로그인 성공: {}", user.username);
    Ok(HttpResponse::Ok().json(LoginResponse::bearer(token, tokens.expires_in())))
}

fn callback_params(query: &GoogleCallbackQuery) -> Result<(&str, &str), AppError> {
    if let Some(error) = query.error.as_deref() {
        return Err(AppError::AuthenticationError(format!("Google 로그인이 취소되었습니다: {}", error)));
    }

    let code = query
        .code
        .as_deref()
        .filter(|code| !code.is_empty())
        .ok_or_else(|| AppError::ValidationError("code가 필요합니다".to_string()))?;
    let state = query
        .state
        .as_deref()
        .filter(|state| !state.is_empty())
        .ok_or_else(|| AppError::ValidationError("state가 필요합니다".to_string()))?;

    Ok((code, state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App};
    use actix_web::http::StatusCode;

    fn query(code: Option<&str>, state: Option<&str>, error: Option<&str>) -> GoogleCallbackQuery {
        GoogleCallbackQuery {
            code: code.map(str::to_string),
            state: state.map(str::to_string),
            error: error.map(str::to_string),
        }
    }

    #[::core::prelude::v1::test]
    fn test_callback_params() {
        assert_eq!(callback_params(&query(Some("c"), Some("s"), None)).unwrap(), ("c", "s"));
        assert!(matches!(
            callback_params(&query(None, Some("s"), None)),
            Err(AppError::ValidationError(_))
        ));
        assert!(matches!(
            callback_params(&query(Some("c"), Some(""), None)),
            Err(AppError::ValidationError(_))
        ));
        assert!(matches!(
            callback_params(&query(Some("c"), Some("s"), Some("access_denied"))),
            Err(AppError::AuthenticationError(_))
        ));
    }

    #[actix_web::test]
    async fn test_denied_consent_is_unauthorized() {
        let app = test::init_service(App::new().service(google_callback)).await;

        let req = test::TestRequest::get()
            .uri("/google/callback?error=access_denied")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_callback_without_code_is_bad_request() {
        let app = test::init_service(App::new().service(google_callback)).await;

        let req = test::TestRequest::get().uri("/google/callback?state=abc").to_request();

        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }
}
