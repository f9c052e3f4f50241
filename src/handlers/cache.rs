//! 관리자 전용 캐시 무효화 엔드포인트

use actix_web::{delete, web, HttpResponse};
use serde::Deserialize;
use crate::errors::errors::AppError;
use crate::services::cache::CacheService;

#[derive(Debug, Deserialize)]
pub struct InvalidateQuery {
    pub pattern: String,
}

/// 패턴과 일치하는 키를 일괄 삭제하고 결과 요약을 돌려줍니다.
///
/// ```bash
/// curl -X DELETE "http://localhost:8080/api/v1/cache?pattern=user:*" \
///   -H "Authorization: Bearer <admin token>"
/// ```
///
/// ```json
/// { "nodes": 3, "deleted": 42, "failures": 0 }
/// ```
#[delete("")]
pub async fn invalidate(
    query: web::Query<InvalidateQuery>,
) -> Result<HttpResponse, AppError> {
    let report = CacheService::instance().invalidate(&query.pattern).await?;

    if report.failures > 0 {
        log::warn!("캐시 무효화 부분 실패 - pattern: {}, {:?}", query.pattern, report);
    }

    Ok(HttpResponse::Ok().json(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App};
    use actix_web::http::StatusCode;

    #[actix_web::test]
    async fn test_missing_pattern_is_bad_request() {
        let app = test::init_service(App::new().service(web::scope("/cache").service(invalidate))).await;

        let resp = test::call_service(&app, test::TestRequest::delete().uri("/cache").to_request()).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
