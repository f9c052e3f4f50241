//! # Domain Layer
//!
//! - [`entities`]: MongoDB에 저장되는 엔티티 (`User`)
//! - [`dto`]: HTTP 요청/응답 본문
//! - [`models`]: 인증 주체와 JWT 클레임

pub mod entities;
pub mod dto;
pub mod models;

pub use entities::users::User;
pub use dto::users::*;
pub use models::*;
