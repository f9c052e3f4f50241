//! HTTP 미들웨어
//!
//! - [`AuthMiddleware`]: Bearer JWT 검증 후 [`AuthenticatedUser`](crate::domain::models::auth::AuthenticatedUser)를
//!   요청 확장에 저장

pub mod auth_middleware;
mod auth_inner;

pub use auth_middleware::AuthMiddleware;
