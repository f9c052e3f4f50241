//! # HTTP Request Handlers
//!
//! 핸들러는 요청 검증과 응답 변환만 담당하고, 실제 처리는 서비스 싱글톤에
//! 맡깁니다.
//!
//! ```text
//! Handlers (이 모듈)   ← 요청 검증, 상태 코드
//!     │
//! Services            ← 비즈니스 로직, cache-aside 조회
//!     │
//! Repositories/Cache  ← MongoDB, Redis
//! ```
//!
//! - [`root`]: `/`, `/health`, `/api/v1`
//! - [`users`]: 회원가입, 로그인, 활성화, 내 프로필
//! - [`auth`]: Google 로그인
//! - [`cache`]: 패턴 기반 캐시 무효화 (관리자)
//!
//! ```rust,ignore
//! #[post("/register")]
//! pub async fn register(payload: web::Json<RegisterRequest>) -> Result<HttpResponse, AppError> {
//!     payload.validate().map_err(|e| AppError::ValidationError(e.to_string()))?;
//!     let response = UserService::instance().register(payload.into_inner()).await?;
//!     Ok(HttpResponse::Created().json(response))
//! }
//! ```

pub mod root;
pub mod users;
pub mod auth;
pub mod cache;
