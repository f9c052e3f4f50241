//! 인증 없이 열려 있는 기본 엔드포인트와 인증 확인용 인사 엔드포인트

use actix_web::{get, HttpResponse};
use serde_json::json;
use crate::domain::models::auth::AuthenticatedUser;

#[get("/")]
pub async fn index() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body("Hello from cache_aside_auth!")
}

/// 로드밸런서 헬스체크
///
/// ```json
/// { "status": "healthy", "service": "cache_aside_auth", "version": "0.1.0", "timestamp": "..." }
/// ```
#[get("/health")]
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "healthy",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// 토큰이 유효한지 확인하는 용도의 인사 응답
pub async fn greet(user: AuthenticatedUser) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "message": "Hello, user!",
        "user_id": user.user_id,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, web, App, HttpMessage};
    use actix_web::http::StatusCode;

    #[actix_web::test]
    async fn test_index_and_health() {
        let app = test::init_service(App::new().service(index).service(health_check)).await;

        let body = test::call_and_read_body(&app, test::TestRequest::get().uri("/").to_request()).await;
        assert_eq!(body, "Hello from cache_aside_auth!");

        let health: serde_json::Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get().uri("/health").to_request(),
        )
        .await;
        assert_eq!(health["status"], "healthy");
    }

    #[actix_web::test]
    async fn test_greet_echoes_user_id() {
        let app = test::init_service(App::new().route("/api/v1", web::get().to(greet))).await;

        let req = test::TestRequest::get().uri("/api/v1").to_request();
        req.extensions_mut().insert(AuthenticatedUser {
            user_id: "64b7f0c2a1b2c3d4e5f60718".to_string(),
            username: "alice".to_string(),
            roles: vec!["user".to_string()],
        });
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Hello, user!");
        assert_eq!(body["user_id"], "64b7f0c2a1b2c3d4e5f60718");
    }
}
