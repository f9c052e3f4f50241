//! cache_aside_auth
//!
//! 사용자 등록/로그인/활성화 백엔드와, 그 아래에서 동작하는 cache-aside
//! 캐싱 계층입니다.
//!
//! # Features
//!
//! - **Cache-aside 조회**: 캐시 조회 → 미스 시 재계산 → 백그라운드 되쓰기
//! - **읽기 복제본 분리**: 조회는 복제본, 쓰기와 무효화는 기본 캐시
//! - **패턴 무효화**: 단일 Redis 및 클러스터 전체 마스터에서 SCAN 기반 삭제
//! - **계정 활성화**: 6자리 OTP를 Redis에 TTL과 함께 저장
//! - **JWT 인증**: HS256 액세스 토큰과 역할 기반 미들웨어
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │   HTTP Routes   │ ← REST API 엔드포인트
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │    Handlers     │ ← 요청/응답 처리
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │    Services     │ ← 비즈니스 로직, use_cache_with_ro
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌─────────────────┐
//! │  Repositories   │     │     Caching     │
//! └─────────────────┘     └─────────────────┘
//!          │                       │
//!          ▼                       ▼
//! ┌─────────────────┐     ┌─────────────────┐
//! │     MongoDB     │     │  Redis / Memory │
//! └─────────────────┘     └─────────────────┘
//! ```
//!
//! # Examples
//!
//! ```rust,ignore
//! use cache_aside_auth::services::users::UserService;
//!
//! let profile = UserService::instance().find_user_by_username("alice").await?;
//! ```

pub mod core;
pub mod config;
pub mod db;
pub mod caching;
pub mod domain;
pub mod repositories;
pub mod services;
pub mod utils;
pub mod routes;
pub mod handlers;
pub mod errors;
pub mod middlewares;
